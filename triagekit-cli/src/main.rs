use clap::Parser;
use tracing_subscriber::EnvFilter;
use triagekit_cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = run(Cli::parse()).await?;
    println!("{}", serde_json::to_string_pretty(&output.document)?);
    if !output.success {
        std::process::exit(1);
    }
    Ok(())
}

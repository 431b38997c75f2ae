use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use triagekit::core::DEFAULT_TAB;
use triagekit::llm::DEFAULT_MODEL;

#[derive(Debug, Parser)]
#[command(name = "triagekit", version, about = "AI-assisted bug triage")]
pub struct Cli {
    #[command(flatten)]
    pub gemini: GeminiArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GeminiArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Override the Gemini endpoint (tests, proxies)
    #[arg(long, env = "GEMINI_BASE_URL")]
    pub gemini_base_url: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Draft a bug title and body from a report form
    Describe(DescribeArgs),
    /// Summarize bug report text; reads stdin when no text is given
    Summarize {
        texts: Vec<String>,
    },
    /// Mark the test cases a bug breaks in a Google Sheets test plan
    Classify(ClassifyArgs),
    /// Look up tracker hotlists
    Hotlists {
        /// JSON file replacing the built-in hotlist registry
        #[arg(long)]
        registry: Option<PathBuf>,

        #[command(subcommand)]
        command: HotlistCommand,
    },
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    #[arg(long)]
    pub component: String,
    #[arg(long)]
    pub priority: String,
    /// What the reporter observed, in their own words
    #[arg(long)]
    pub command: String,
    #[arg(long)]
    pub device_type: String,
    #[arg(long)]
    pub device_mode: String,
    #[arg(long)]
    pub bug_type: String,
    #[arg(long)]
    pub device_details: String,
    #[arg(long)]
    pub application_type: String,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Spreadsheet URL or id
    #[arg(long, env = "TRIAGEKIT_SHEET")]
    pub sheet: String,

    #[arg(long, default_value = DEFAULT_TAB)]
    pub tab: String,

    /// Issue id written into the reference column of failing rows
    #[arg(long)]
    pub reference_id: String,

    #[arg(long)]
    pub description: String,

    /// Re-run the whole cycle on rate limits and transient failures
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub attempts: u64,

    #[arg(long, env = "SHEETS_ACCESS_TOKEN", hide_env_values = true)]
    pub sheets_token: Option<String>,

    #[arg(long, env = "SHEETS_BASE_URL")]
    pub sheets_base_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum HotlistCommand {
    /// Hotlists applicable to a device type, component and app type
    Suggest {
        #[arg(long)]
        device_type: Option<String>,
        #[arg(long)]
        component_id: Option<String>,
        #[arg(long)]
        app_type: Option<String>,
    },
    /// Hotlist ids for the given names
    Resolve {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

use std::sync::Arc;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use triagekit::core::{TableRef, TriageError, Usage};
use triagekit::llm::GeminiClient;
use triagekit::pipeline::{
    BugReportForm, HotlistFilter, HotlistRegistry, Orchestrator, SummaryContent,
};
use triagekit::sheets::{MemoryTableStore, SheetsTableStore};

use crate::args::{ClassifyArgs, Cli, Command, DescribeArgs, GeminiArgs, HotlistCommand};

/// A JSON document for stdout, and whether the command achieved its goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub document: Value,
    pub success: bool,
}

impl Output {
    fn ok(document: Value) -> Self {
        Self {
            document,
            success: true,
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<Output> {
    match cli.command {
        Command::Describe(args) => describe(&cli.gemini, args).await,
        Command::Summarize { texts } => summarize(&cli.gemini, texts).await,
        Command::Classify(args) => classify(&cli.gemini, args).await,
        Command::Hotlists { registry, command } => {
            let registry = match registry {
                Some(path) => {
                    let json = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading hotlist registry {}", path.display()))?;
                    HotlistRegistry::from_json(&json)?
                }
                None => HotlistRegistry::builtin(),
            };
            Ok(Output::ok(hotlists(&registry, command)))
        }
    }
}

fn gemini(args: &GeminiArgs) -> anyhow::Result<GeminiClient> {
    let mut builder = GeminiClient::builder().model(args.model.as_str());
    if let Some(key) = &args.gemini_api_key {
        builder = builder.api_key(key.as_str());
    }
    if let Some(base_url) = &args.gemini_base_url {
        builder = builder.base_url(base_url.as_str());
    }
    Ok(builder.build()?)
}

/// An orchestrator with no table behind it, for the commands that never
/// touch a test plan.
fn offline(args: &GeminiArgs) -> anyhow::Result<Orchestrator> {
    Ok(Orchestrator::builder()
        .completion(Arc::new(gemini(args)?))
        .store(Arc::new(MemoryTableStore::new()))
        .build()?)
}

/// The error document for a command whose completion step failed. Usage
/// spent before the failure is still reported.
fn failure(err: TriageError, usage: Usage) -> Output {
    tracing::error!(error = %err, tokens_used = usage.total_tokens(), "command failed");
    Output {
        document: json!({
            "status": "Error",
            "message": err.to_string(),
            "tokensUsed": usage.total_tokens(),
            "costUSD": usage.cost_usd,
        }),
        success: false,
    }
}

async fn describe(gemini: &GeminiArgs, args: DescribeArgs) -> anyhow::Result<Output> {
    let form = BugReportForm {
        component: args.component,
        priority: args.priority,
        command: args.command,
        device_type: args.device_type,
        device_mode: args.device_mode,
        bug_type: args.bug_type,
        device_details: args.device_details,
        application_type: args.application_type,
    };
    let (record, usage) = offline(gemini)?.describe(&form).await.into_parts();
    let record = match record {
        Ok(record) => record,
        Err(err) => return Ok(failure(err, usage)),
    };
    Ok(Output::ok(json!({
        "status": "Success",
        "title": record.title,
        "body": record.body,
        "tokensUsed": usage.total_tokens(),
        "costUSD": usage.cost_usd,
    })))
}

async fn summarize(gemini: &GeminiArgs, texts: Vec<String>) -> anyhow::Result<Output> {
    let content = if texts.is_empty() {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("reading report text from stdin")?;
        SummaryContent::Text(text)
    } else {
        SummaryContent::Parts(texts)
    };

    let (summary, usage) = offline(gemini)?.summarize(content).await.into_parts();
    let summary = match summary {
        Ok(summary) => summary,
        Err(err) => return Ok(failure(err, usage)),
    };
    Ok(Output::ok(json!({
        "status": "Success",
        "summary": summary,
        "tokensUsed": usage.total_tokens(),
        "costUSD": usage.cost_usd,
    })))
}

async fn classify(gemini_args: &GeminiArgs, args: ClassifyArgs) -> anyhow::Result<Output> {
    let mut sheets = SheetsTableStore::builder();
    if let Some(token) = args.sheets_token {
        sheets = sheets.access_token(token);
    }
    if let Some(base_url) = args.sheets_base_url {
        sheets = sheets.base_url(base_url);
    }
    let store = sheets.build().context("configuring Google Sheets access")?;

    let orchestrator = Orchestrator::builder()
        .completion(Arc::new(gemini(gemini_args)?))
        .store(Arc::new(store))
        .build()?;

    let table = TableRef::new(&args.sheet, args.tab);
    let attempts = usize::try_from(args.attempts).unwrap_or(usize::MAX);
    let report = orchestrator
        .run_cycle_with_attempts(&args.description, &table, &args.reference_id, attempts)
        .await;

    Ok(Output {
        success: report.is_success(),
        document: serde_json::to_value(&report)?,
    })
}

fn hotlists(registry: &HotlistRegistry, command: HotlistCommand) -> Value {
    match command {
        HotlistCommand::Suggest {
            device_type,
            component_id,
            app_type,
        } => {
            let filter = HotlistFilter {
                device_type,
                component_id,
                app_type,
            };
            json!({ "hotlists": registry.suggest(&filter) })
        }
        HotlistCommand::Resolve { names } => json!({ "ids": registry.resolve(&names) }),
    }
}

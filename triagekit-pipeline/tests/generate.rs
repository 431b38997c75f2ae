mod common;

use std::sync::Arc;

use common::{success, usage, ScriptedCompletion};
use triagekit_core::{GenerationConfig, TriageError};
use triagekit_pipeline::{BugReportForm, DescriptionGenerator, Summarizer};

fn form() -> BugReportForm {
    BugReportForm {
        component: "1624352".to_string(),
        priority: "P2".to_string(),
        command: "back key exits the game".to_string(),
        device_type: "AL".to_string(),
        device_mode: "Tablet".to_string(),
        bug_type: "Bug".to_string(),
        device_details: "- App name: Free Fire\n- Build: 16".to_string(),
        application_type: "Game".to_string(),
    }
}

#[tokio::test]
async fn summary_joins_parts_and_trims_output() {
    let service = Arc::new(ScriptedCompletion::new([success("\n  Game crashes.  \n", 10, 4)]));
    let metered = Summarizer::new(service.clone())
        .summarize(vec!["first report", "second report"])
        .await;

    assert_eq!(metered.value.unwrap(), "Game crashes.");
    assert_eq!(metered.usage, usage(10, 4));
    let request = &service.requests()[0];
    assert!(request.prompt().contains("first report\nsecond report"));
    assert_eq!(request.config(), GenerationConfig::new(0.5, 200));
}

#[tokio::test]
async fn empty_summary_input_is_rejected_without_a_call() {
    let service = Arc::new(ScriptedCompletion::new([]));
    let summarizer = Summarizer::new(service.clone());

    for metered in [
        summarizer.summarize(Vec::<String>::new()).await,
        summarizer.summarize("  \n").await,
    ] {
        assert!(matches!(metered.value, Err(TriageError::EmptyInput(_))));
        assert_eq!(metered.usage.total_tokens(), 0);
    }
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn description_is_parsed_from_fenced_json() {
    let service = Arc::new(ScriptedCompletion::new([success(
        "```json\n{\"title\": \"[AL] > [Tablet] > [Free Fire] - exits on Back\", \"body\": \"- App name: Free Fire\"}\n```",
        300,
        120,
    )]));
    let metered = DescriptionGenerator::new(service.clone())
        .generate(&form())
        .await;

    let record = metered.value.unwrap();
    assert!(record.title.ends_with("exits on Back"));
    assert_eq!(record.body, "- App name: Free Fire");
    let request = &service.requests()[0];
    assert_eq!(request.config(), GenerationConfig::new(1.0, 1000));
    assert!(request.prompt().contains("- App name: Free Fire\n- Build: 16"));
}

#[tokio::test]
async fn contract_violation_keeps_usage() {
    let service = Arc::new(ScriptedCompletion::new([success("Here you go!", 300, 5)]));
    let metered = DescriptionGenerator::new(service).generate(&form()).await;

    let err = metered.value.unwrap_err();
    assert!(matches!(err, TriageError::Contract(_)));
    assert!(err.to_string().contains("Here you go!"));
    assert_eq!(metered.usage, usage(300, 5));
}

#[tokio::test]
async fn blank_form_fields_are_all_named() {
    let service = Arc::new(ScriptedCompletion::new([]));
    let mut incomplete = form();
    incomplete.priority = " ".to_string();
    incomplete.device_details.clear();

    let metered = DescriptionGenerator::new(service.clone())
        .generate(&incomplete)
        .await;

    let Err(TriageError::EmptyInput(message)) = metered.value else {
        panic!("expected empty input");
    };
    assert!(message.contains("priority, device_details"));
    assert_eq!(service.calls(), 0);
}

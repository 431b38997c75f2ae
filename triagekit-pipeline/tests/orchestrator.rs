mod common;

use std::sync::Arc;

use common::{
    blocked, plan_ref, rate_limited, success, test_plan, usage, RecordingTracker, ScriptedCompletion,
};
use serde_json::json;
use triagekit_core::{CompletionResult, TableRef, TabularDataset, TriageError};
use triagekit_pipeline::{
    AnnotationRequest, CycleStatus, FilingRequest, MergeStatus, Orchestrator,
};
use triagekit_sheets::MemoryTableStore;

struct Harness {
    completion: Arc<ScriptedCompletion>,
    store: Arc<MemoryTableStore>,
    tracker: Arc<RecordingTracker>,
    orchestrator: Orchestrator,
}

fn harness(script: Vec<CompletionResult>) -> Harness {
    let completion = Arc::new(ScriptedCompletion::new(script));
    let store = Arc::new(MemoryTableStore::with_table(plan_ref(), test_plan()));
    let tracker = Arc::new(RecordingTracker::default());
    let orchestrator = Orchestrator::builder()
        .completion(completion.clone())
        .store(store.clone())
        .tracker(tracker.clone())
        .build()
        .unwrap();
    Harness {
        completion,
        store,
        tracker,
        orchestrator,
    }
}

#[tokio::test]
async fn cycle_marks_failing_row_and_reports_usage() {
    let h = harness(vec![success("TC-2", 1000, 500)]);

    let report = h
        .orchestrator
        .run_cycle("Back key exits the game", &plan_ref(), "200")
        .await;

    assert_eq!(report.status, CycleStatus::Success);
    assert_eq!(report.message, "Updated 1 test cases to 'Fail' for Bug ID 200.");
    assert_eq!(report.tokens_used, 1500);
    assert!((report.usage.cost_usd - 0.000875).abs() < 1e-12);
    let stored = h.store.snapshot(&plan_ref()).await.unwrap();
    assert_eq!(
        stored,
        TabularDataset::from_rows([
            vec!["TC No", "Result", "Bug Id"],
            vec!["TC-1", "Pass", ""],
            vec!["TC-2", "Fail", "b/100, b/200"],
        ])
    );
    assert_eq!(h.store.write_count(), 1);
}

#[tokio::test]
async fn empty_outcome_is_success_without_writes() {
    let h = harness(vec![success(" none ", 900, 1)]);

    let report = h.orchestrator.run_cycle("crash", &plan_ref(), "200").await;

    assert!(report.is_success());
    assert_eq!(report.message, "No test cases were updated as 'Fail'.");
    assert_eq!(report.merge.unwrap().status, MergeStatus::NoChanges);
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn rate_limit_aborts_before_touching_the_table() {
    let h = harness(vec![rate_limited()]);

    let report = h.orchestrator.run_cycle("crash", &plan_ref(), "200").await;

    assert_eq!(report.status, CycleStatus::Error);
    assert!(report.is_retryable());
    assert!(report.message.contains("429"));
    assert_eq!(h.store.write_count(), 0);
    assert_eq!(h.store.snapshot(&plan_ref()).await.unwrap(), test_plan());
}

#[tokio::test]
async fn missing_columns_fail_before_any_completion_call() {
    let h = harness(vec![success("TC-2", 1, 1)]);
    let table = TableRef::new("sheet-1", "Broken");
    h.store
        .insert(
            table.clone(),
            TabularDataset::from_rows([vec!["Case", "Result"], vec!["TC-2", "Pass"]]),
        )
        .await;

    let report = h.orchestrator.run_cycle("crash", &table, "200").await;

    assert_eq!(
        report.error,
        Some(TriageError::MissingColumns {
            columns: vec!["TC No".to_string(), "Bug Id".to_string()],
        })
    );
    assert!(!report.is_retryable());
    assert_eq!(h.completion.calls(), 0);
}

#[tokio::test]
async fn rerunning_a_cycle_does_not_duplicate_references() {
    let h = harness(vec![success("TC-2", 10, 1), success("TC-2", 10, 1)]);

    h.orchestrator.run_cycle("crash", &plan_ref(), "200").await;
    let second = h.orchestrator.run_cycle("crash", &plan_ref(), "200").await;

    assert_eq!(second.merge.unwrap().rows_updated, 1);
    let stored = h.store.snapshot(&plan_ref()).await.unwrap();
    assert_eq!(stored.cell(1, "Bug Id"), Some("b/100, b/200"));
}

#[tokio::test]
async fn cycle_report_serializes_with_caller_facing_keys() {
    let h = harness(vec![success("TC-2", 1000, 500)]);
    let report = h.orchestrator.run_cycle("crash", &plan_ref(), "200").await;

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["status"], json!("Success"));
    assert_eq!(value["tokensUsed"], json!(1500));
    assert!(value.get("costUSD").is_some());
    assert_eq!(value["merge"]["rowsUpdated"], json!(1));
    assert!(value.get("error").is_none());
}

#[tokio::test]
async fn annotation_sums_usage_of_every_call() {
    let h = harness(vec![
        success("Short summary.", 100, 20),
        success("TC-2", 1000, 500),
    ]);

    let report = h
        .orchestrator
        .annotate(AnnotationRequest {
            issue_id: "200".to_string(),
            note: "long reporter text".to_string(),
            summarize: true,
            description: "Back key exits the game".to_string(),
            reproducible: true,
            table: Some(plan_ref()),
        })
        .await;

    assert_eq!(report.status, CycleStatus::Success);
    assert_eq!(report.message, "Note added to issue 200.");
    assert_eq!(report.usage, usage(100, 20) + usage(1000, 500));
    assert_eq!(report.tokens_used, 1620);
    assert_eq!(
        h.tracker.notes.lock().unwrap().as_slice(),
        &[("200".to_string(), "Short summary.".to_string())]
    );
    assert_eq!(h.store.write_count(), 1);
}

#[tokio::test]
async fn annotation_keeps_partial_usage_when_cycle_fails() {
    let h = harness(vec![blocked(700, 2)]);

    let report = h
        .orchestrator
        .annotate(AnnotationRequest {
            issue_id: "200".to_string(),
            note: "note".to_string(),
            description: "crash".to_string(),
            reproducible: true,
            table: Some(plan_ref()),
            ..Default::default()
        })
        .await;

    assert_eq!(report.status, CycleStatus::Error);
    assert!(matches!(report.error, Some(TriageError::ContentBlocked { .. })));
    assert_eq!(report.usage, usage(700, 2));
    assert_eq!(h.tracker.notes.lock().unwrap().len(), 1);
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn annotation_of_non_reproducible_issue_skips_the_cycle() {
    let h = harness(vec![]);

    let report = h
        .orchestrator
        .annotate(AnnotationRequest {
            issue_id: "200".to_string(),
            note: "cannot reproduce".to_string(),
            table: Some(plan_ref()),
            ..Default::default()
        })
        .await;

    assert!(report.cycle.is_none());
    assert_eq!(report.tokens_used, 0);
    assert_eq!(h.completion.calls(), 0);
}

#[tokio::test]
async fn filing_resolves_hotlists_and_blocking_ids() {
    let h = harness(vec![]);

    let filed = h
        .orchestrator
        .file_issue(FilingRequest {
            title: "Crash".to_string(),
            body: "Steps".to_string(),
            component_id: "1624352".to_string(),
            priority: "P2".to_string(),
            issue_type: "Bug".to_string(),
            device_type: "AL".to_string(),
            application_type: "Game".to_string(),
            blocking: " 11, ,12 ,".to_string(),
            hotlist_names: vec!["Appcompat-AL-1Papps".to_string(), "nope".to_string()],
        })
        .await
        .unwrap();

    assert_eq!(filed.issue_id, "424242");
    assert_eq!(filed.url, "https://issuetracker.google.com/issues/424242");
    let drafts = h.tracker.drafts.lock().unwrap();
    assert_eq!(drafts[0].blocking_ids, vec!["11".to_string(), "12".to_string()]);
    assert_eq!(drafts[0].hotlist_ids, vec!["6124440".to_string()]);
}

#[tokio::test]
async fn filing_rejects_missing_fields() {
    let h = harness(vec![]);

    let err = h
        .orchestrator
        .file_issue(FilingRequest {
            title: "Crash".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, TriageError::EmptyInput(ref message) if message.contains("body, component_id"))
    );
    assert!(h.tracker.drafts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn orchestrator_without_tracker_refuses_annotation() {
    let orchestrator = Orchestrator::builder()
        .completion(Arc::new(ScriptedCompletion::new([])))
        .store(Arc::new(MemoryTableStore::new()))
        .build()
        .unwrap();

    let report = orchestrator
        .annotate(AnnotationRequest {
            issue_id: "1".to_string(),
            note: "n".to_string(),
            ..Default::default()
        })
        .await;

    assert!(matches!(report.error, Some(TriageError::Configuration(_))));
}

#[test]
fn builder_requires_a_completion_service() {
    let err = Orchestrator::builder()
        .store(Arc::new(MemoryTableStore::new()))
        .build()
        .err()
        .unwrap();
    assert!(err.to_string().contains("completion service is required"));
}

#[tokio::test]
async fn non_retryable_failure_is_not_rerun() {
    let h = harness(vec![blocked(5, 0), rate_limited(), success("TC-2", 10, 2)]);

    let report = h
        .orchestrator
        .run_cycle_with_attempts("crash", &plan_ref(), "200", 3)
        .await;

    // the blocked generation is not retryable, so the first attempt is final
    assert_eq!(report.status, CycleStatus::Error);
    assert_eq!(h.completion.calls(), 1);
    assert_eq!(report.usage, usage(5, 0));
}

#[tokio::test]
async fn rate_limited_cycle_succeeds_on_a_later_attempt() {
    let h = harness(vec![rate_limited(), rate_limited(), success("TC-2", 10, 2)]);

    let report = h
        .orchestrator
        .run_cycle_with_attempts("crash", &plan_ref(), "200", 3)
        .await;

    assert!(report.is_success());
    assert_eq!(h.completion.calls(), 3);
    assert_eq!(report.tokens_used, 12);
    assert_eq!(h.store.write_count(), 1);
}

#[tokio::test]
async fn attempts_are_capped() {
    let h = harness(vec![rate_limited(), rate_limited(), rate_limited()]);

    let report = h
        .orchestrator
        .run_cycle_with_attempts("crash", &plan_ref(), "200", 2)
        .await;

    assert!(report.is_retryable());
    assert_eq!(h.completion.calls(), 2);
}

use triagekit_core::{ContractViolation, TriageError};

#[test]
fn error_display_for_api() {
    let err = TriageError::Api {
        http_status: 429,
        message: "quota exceeded".to_string(),
    };
    assert_eq!(format!("{err}"), "Completion API error 429: quota exceeded");
}

#[test]
fn error_display_for_missing_columns_lists_every_column() {
    let err = TriageError::MissingColumns {
        columns: vec!["TC No".to_string(), "Bug Id".to_string()],
    };
    assert_eq!(
        format!("{err}"),
        "Required columns not found in table header: TC No, Bug Id"
    );
}

#[test]
fn error_display_for_dataset() {
    let err = TriageError::Dataset {
        table: "sheet-1/Games Test Plan".to_string(),
        reason: "HTTP 404".to_string(),
    };
    assert_eq!(
        format!("{err}"),
        "Dataset access failed for 'sheet-1/Games Test Plan': HTTP 404"
    );
}

#[test]
fn contract_violation_is_transparent_inside_triage_error() {
    let violation = ContractViolation::MalformedEnvelope {
        text: "Sure! Here you go".to_string(),
    };
    let err: TriageError = violation.clone().into();
    assert_eq!(format!("{err}"), format!("{violation}"));
    assert_eq!(violation.text(), "Sure! Here you go");
}

#[test]
fn retryable_errors_are_rate_limits_server_errors_and_transport() {
    let api = |http_status| TriageError::Api {
        http_status,
        message: String::new(),
    };
    assert!(api(429).is_retryable());
    assert!(api(503).is_retryable());
    assert!(!api(400).is_retryable());
    assert!(TriageError::Transport("reset".to_string()).is_retryable());
    assert!(!TriageError::Configuration("missing credential".to_string()).is_retryable());
    assert!(!TriageError::MissingColumns { columns: vec![] }.is_retryable());
}

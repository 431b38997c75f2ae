use triagekit_core::{
    CompletionRequest, CompletionResult, CostRates, GenerationConfig, Metered, TriageError, Usage,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn cost_uses_per_million_rates() {
    let usage = Usage::metered(1000, 500, &CostRates::new(0.35, 1.05));
    assert!(approx(usage.cost_usd, 0.000875));
    assert_eq!(usage.total_tokens(), 1500);
}

#[test]
fn default_rates_are_flash_prices() {
    assert_eq!(CostRates::default(), CostRates::new(0.35, 1.05));
}

#[test]
fn usage_sums_without_recomputing_cost() {
    let a = Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        cost_usd: 0.25,
    };
    let b = Usage {
        prompt_tokens: 1,
        completion_tokens: 2,
        cost_usd: 0.5,
    };
    let total: Usage = [a, b].into_iter().sum();
    assert_eq!(total.prompt_tokens, 11);
    assert_eq!(total.completion_tokens, 7);
    assert!(approx(total.cost_usd, 0.75));
}

#[test]
fn usage_serializes_with_cost_usd_key() {
    let value = serde_json::to_value(Usage::default()).expect("serialize");
    assert_eq!(value["promptTokens"], 0);
    assert_eq!(value["costUSD"], 0.0);
}

#[test]
fn generation_config_serializes_camel_case() {
    let value = serde_json::to_value(GenerationConfig::new(0.5, 200)).expect("serialize");
    assert_eq!(value["temperature"], 0.5);
    assert_eq!(value["maxOutputTokens"], 200);
}

#[test]
fn request_keeps_prompt_and_config() {
    let request = CompletionRequest::new("hello", GenerationConfig::new(1.0, 1000));
    assert_eq!(request.prompt(), "hello");
    assert_eq!(request.config().max_output_tokens, 1000);
}

#[test]
fn missing_credential_becomes_configuration_error() {
    let result = CompletionResult::missing_credential();
    assert_eq!(
        result,
        CompletionResult::ApiError {
            http_status: 0,
            message: "missing credential".to_string()
        }
    );
    assert_eq!(
        result.into_text(),
        Err(TriageError::Configuration("missing credential".to_string()))
    );
}

#[test]
fn blocked_result_keeps_usage_when_metered() {
    let usage = Usage::metered(100, 20, &CostRates::default());
    let result = CompletionResult::ContentBlocked {
        reason: "SAFETY".to_string(),
        safety_detail: None,
        partial_text: Some("partial".to_string()),
        usage,
    };
    let Metered { value, usage: kept } = result.into_metered();
    assert_eq!(kept, usage);
    assert!(matches!(
        value,
        Err(TriageError::ContentBlocked { ref reason, .. }) if reason == "SAFETY"
    ));
}

#[test]
fn api_and_transport_errors_carry_zero_usage() {
    let api = CompletionResult::ApiError {
        http_status: 500,
        message: "boom".to_string(),
    };
    let transport = CompletionResult::TransportError {
        cause: "dns".to_string(),
    };
    assert_eq!(api.usage(), Usage::default());
    assert_eq!(transport.usage(), Usage::default());
    assert!(!api.is_success());
}

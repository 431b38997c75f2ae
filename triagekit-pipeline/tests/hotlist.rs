use triagekit_core::TriageError;
use triagekit_pipeline::{HotlistFilter, HotlistRegistry};

fn names(registry: &HotlistRegistry, filter: HotlistFilter) -> Vec<String> {
    registry
        .suggest(&filter)
        .into_iter()
        .map(|hotlist| hotlist.name.clone())
        .collect()
}

#[test]
fn resolve_matches_exact_trimmed_names_and_drops_the_rest() {
    let registry = HotlistRegistry::builtin();
    let ids = registry.resolve([" arc++ ", "", "Appcompat-AL-Platform", "ARC++", "unknown"]);
    assert_eq!(ids, vec!["292879".to_string(), "6375526".to_string()]);
}

#[test]
fn no_filter_suggests_everything() {
    let registry = HotlistRegistry::builtin();
    assert_eq!(registry.suggest(&HotlistFilter::default()).len(), 8);
}

#[test]
fn device_type_filter_keeps_only_that_platform() {
    let registry = HotlistRegistry::builtin();
    let filter = HotlistFilter {
        device_type: Some("ChromeOS".to_string()),
        ..Default::default()
    };
    assert_eq!(
        names(&registry, filter),
        vec!["dps_arc_proactive", "arc++", "ARC++ 3rdParty AppIssues"]
    );
}

#[test]
fn component_constraint_applies_only_when_both_sides_are_set() {
    let registry = HotlistRegistry::builtin();
    let filter = HotlistFilter {
        device_type: Some("AL".to_string()),
        component_id: Some("1624352".to_string()),
        app_type: Some("Application".to_string()),
    };
    assert_eq!(
        names(&registry, filter),
        vec![
            "Appcompat-AL-1Papps",
            "Appcompat-AL-Platform",
            "AL_appcompat_reviewed",
        ]
    );
}

#[test]
fn app_type_constraint_selects_clank() {
    let registry = HotlistRegistry::builtin();
    let filter = HotlistFilter {
        device_type: Some("AL".to_string()),
        component_id: Some("".to_string()),
        app_type: Some("Web(Clank)".to_string()),
    };
    let suggested = names(&registry, filter);
    assert!(suggested.contains(&"Appcompat-Clank-AL".to_string()));
    assert!(suggested.contains(&"Appcompat-AL-3Papps".to_string()));
}

#[test]
fn registry_loads_from_json() {
    let registry = HotlistRegistry::from_json(
        r#"[{"id": "1", "name": "games", "deviceType": null, "appTypes": ["Game"]}]"#,
    )
    .unwrap();
    assert_eq!(registry.resolve(["games"]), vec!["1".to_string()]);
    assert!(registry
        .suggest(&HotlistFilter {
            app_type: Some("Web".to_string()),
            ..Default::default()
        })
        .is_empty());
}

#[test]
fn invalid_registry_json_is_a_configuration_error() {
    assert!(matches!(
        HotlistRegistry::from_json("{}"),
        Err(TriageError::Configuration(_))
    ));
}

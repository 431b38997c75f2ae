use serde::{Deserialize, Serialize};
use triagekit_core::TriageError;

/// A tracker hotlist and the contexts it applies to. A missing constraint
/// list places no restriction on that attribute.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hotlist {
    pub id: String,
    pub name: String,
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_types: Option<Vec<String>>,
}

impl Hotlist {
    fn new(id: &str, name: &str, device_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            device_type: Some(device_type.to_string()),
            component_ids: None,
            app_types: None,
        }
    }

    fn for_components(mut self, ids: &[&str]) -> Self {
        self.component_ids = Some(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    fn for_app_types(mut self, types: &[&str]) -> Self {
        self.app_types = Some(types.iter().map(|t| t.to_string()).collect());
        self
    }

    /// A filter value only excludes the hotlist when both sides are set and
    /// disagree.
    fn accepts(&self, filter: &HotlistFilter) -> bool {
        let device_ok = match (self.device_type.as_deref(), given(&filter.device_type)) {
            (Some(own), Some(wanted)) => own == wanted,
            _ => true,
        };
        device_ok
            && allows(&self.component_ids, given(&filter.component_id))
            && allows(&self.app_types, given(&filter.app_type))
    }
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn allows(constraint: &Option<Vec<String>>, value: Option<&str>) -> bool {
    match (constraint, value) {
        (Some(allowed), Some(value)) => allowed.iter().any(|entry| entry == value),
        _ => true,
    }
}

/// Context used to suggest hotlists. `None` fields constrain nothing.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HotlistFilter {
    pub device_type: Option<String>,
    pub component_id: Option<String>,
    pub app_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HotlistRegistry {
    hotlists: Vec<Hotlist>,
}

impl Default for HotlistRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HotlistRegistry {
    pub fn new(hotlists: Vec<Hotlist>) -> Self {
        Self { hotlists }
    }

    /// The AppCompat triage hotlists.
    pub fn builtin() -> Self {
        Self::new(vec![
            Hotlist::new("355247", "dps_arc_proactive", "ChromeOS"),
            Hotlist::new("292879", "arc++", "ChromeOS"),
            Hotlist::new("357242", "ARC++ 3rdParty AppIssues", "ChromeOS"),
            Hotlist::new("6124440", "Appcompat-AL-1Papps", "AL").for_components(&["1624352"]),
            Hotlist::new("6124438", "Appcompat-AL-3Papps", "AL").for_components(&["1624252"]),
            Hotlist::new("6154106", "Appcompat-Clank-AL", "AL").for_app_types(&["Web(Clank)"]),
            Hotlist::new("6375526", "Appcompat-AL-Platform", "AL"),
            Hotlist::new("6200091", "AL_appcompat_reviewed", "AL"),
        ])
    }

    /// Parses a JSON array of hotlists.
    pub fn from_json(json: &str) -> Result<Self, TriageError> {
        serde_json::from_str(json)
            .map(Self::new)
            .map_err(|err| TriageError::Configuration(format!("invalid hotlist registry: {err}")))
    }

    pub fn hotlists(&self) -> &[Hotlist] {
        &self.hotlists
    }

    pub fn find(&self, name: &str) -> Option<&Hotlist> {
        self.hotlists.iter().find(|hotlist| hotlist.name == name)
    }

    /// Ids for every label that names a hotlist exactly (after trimming).
    /// Blank labels are skipped; unknown ones are logged and dropped.
    pub fn resolve<I, S>(&self, labels: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                continue;
            }
            match self.find(label) {
                Some(hotlist) => ids.push(hotlist.id.clone()),
                None => tracing::warn!(label = %label, "hotlist not found, skipping"),
            }
        }
        ids
    }

    /// Hotlists applicable to `filter`, in registry order.
    pub fn suggest(&self, filter: &HotlistFilter) -> Vec<&Hotlist> {
        self.hotlists
            .iter()
            .filter(|hotlist| hotlist.accepts(filter))
            .collect()
    }
}

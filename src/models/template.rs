use serde::{Deserialize, Serialize};
use super::request::Tone;
use super::scope::ReportScope;

/// A reusable report layout as returned by the template catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(alias = "report_scope")]
    pub report_scope: ReportScope,
    /// Ordered widget list. Position is the widget's fallback identity.
    #[serde(default, alias = "widgets")]
    pub structure: Vec<WidgetSpec>,
    #[serde(default, alias = "is_system")]
    pub is_system: bool,
    #[serde(default, alias = "is_default")]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSpec {
    /// Persisted identifier. Templates created before stable ids lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "aiConfig", alias = "ai_config", skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiWidgetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiWidgetConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl WidgetSpec {
    /// The persisted id, ignoring blank values.
    pub fn persisted_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

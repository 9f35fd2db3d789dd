use serde::{Deserialize, Serialize};
use super::scope::ReportScope;
use super::target::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Executive,
    Technical,
    Detailed,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executive => "executive",
            Self::Technical => "technical",
            Self::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "executive" => Ok(Self::Executive),
            "technical" => Ok(Self::Technical),
            "detailed" => Ok(Self::Detailed),
            other => Err(format!("Unknown tone: {}", other)),
        }
    }
}

/// Global override applied by the backend to every AI widget of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceMode {
    Ai,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_mode: Option<ForceMode>,
    #[serde(default)]
    pub include_appendix: bool,
    #[serde(default = "default_true")]
    pub include_ai_summary: bool,
    #[serde(default)]
    pub include_benchmarking: bool,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            force_mode: None,
            include_appendix: false,
            include_ai_summary: true,
            include_benchmarking: false,
            language: default_language(),
        }
    }
}

/// Editable per-widget choice between AI text and manual text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiWidgetOverride {
    pub widget_id: String,
    /// Index in the template's full widget list.
    pub position: usize,
    /// False when `widget_id` is a positional fallback rather than a persisted id.
    pub stable: bool,
    pub widget_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub use_ai: bool,
    #[serde(default)]
    pub manual_content: String,
    #[serde(default)]
    pub tone: Tone,
}

/// The override as the backend receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireWidgetOverride {
    pub widget_id: String,
    pub use_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_content: Option<String>,
    pub tone: Tone,
}

impl WireWidgetOverride {
    /// The entry as sent, with a global force mode taking precedence over the widget's own choice.
    pub fn resolve(o: &AiWidgetOverride, force_mode: Option<ForceMode>) -> Self {
        let use_ai = match force_mode {
            Some(ForceMode::Ai) => true,
            Some(ForceMode::Manual) => false,
            None => o.use_ai,
        };
        Self {
            widget_id: o.widget_id.clone(),
            use_ai,
            manual_content: (!use_ai).then(|| o.manual_content.clone()),
            tone: o.tone,
        }
    }
}

impl From<&AiWidgetOverride> for WireWidgetOverride {
    fn from(o: &AiWidgetOverride) -> Self {
        Self::resolve(o, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(flatten)]
    pub generation: GenerationOptions,
    #[serde(default)]
    pub widget_overrides: Vec<WireWidgetOverride>,
}

/// Outbound generation request. Fields are private: once built it is only read and sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    report_scope: ReportScope,
    template_id: String,
    target: Target,
    title: String,
    options: RequestOptions,
}

impl GenerationRequest {
    pub(crate) fn new(
        report_scope: ReportScope,
        template_id: String,
        target: Target,
        title: String,
        options: RequestOptions,
    ) -> Self {
        Self { report_scope, template_id, target, title, options }
    }

    pub fn report_scope(&self) -> ReportScope {
        self.report_scope
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }
}

/// Acknowledgement of a single generation; rendering happens out of band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationAccepted {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn override_with(use_ai: bool, manual: &str) -> AiWidgetOverride {
        AiWidgetOverride {
            widget_id: "w-1".into(),
            position: 0,
            stable: true,
            widget_type: "ai_summary".into(),
            title: None,
            use_ai,
            manual_content: manual.into(),
            tone: Tone::Technical,
        }
    }

    #[test]
    fn test_manual_content_sent_when_ai_disabled() {
        let wire = WireWidgetOverride::from(&override_with(false, "Written by the auditor"));
        assert_eq!(wire.manual_content.as_deref(), Some("Written by the auditor"));
        assert!(!wire.use_ai);
    }

    #[test]
    fn test_manual_content_omitted_when_ai_enabled() {
        let wire = WireWidgetOverride::from(&override_with(true, "draft"));
        assert_eq!(wire.manual_content, None);
        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("manual_content").is_none());
        assert_eq!(json["tone"], "technical");
    }

    #[test]
    fn test_forced_manual_overrides_widget_choice() {
        let wire = WireWidgetOverride::resolve(&override_with(true, "Auditor text"), Some(ForceMode::Manual));
        assert!(!wire.use_ai);
        assert_eq!(wire.manual_content.as_deref(), Some("Auditor text"));

        let wire = WireWidgetOverride::resolve(&override_with(false, ""), Some(ForceMode::Ai));
        assert!(wire.use_ai);
        assert_eq!(wire.manual_content, None);
    }

    #[test]
    fn test_options_defaults() {
        let options: GenerationOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, GenerationOptions::default());
        assert!(options.include_ai_summary);
        assert_eq!(options.language, "en");
    }

    #[test]
    fn test_request_options_flatten() {
        let options = RequestOptions {
            generation: GenerationOptions { force_mode: Some(ForceMode::Manual), ..Default::default() },
            widget_overrides: vec![],
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["force_mode"], "manual");
        assert_eq!(json["language"], "en");
        assert!(json["widget_overrides"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_tone_from_str() {
        assert_eq!("Detailed".parse::<Tone>().unwrap(), Tone::Detailed);
        assert!("casual".parse::<Tone>().is_err());
    }
}

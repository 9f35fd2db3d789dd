use serde::{Deserialize, Serialize};
use crate::compat::Verdict;
use crate::errors::ReportError;
use crate::models::{AiWidgetOverride, GenerationOptions, ProgressState, ReportScope, ReportTemplate, Target};
use crate::session::{OverrideEdit, SelectionState};

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub scope: Option<String>,
    pub category: Option<String>,
    /// Target kind; `all_entities` asks for per-entity capable templates.
    pub target: Option<String>,
}

/// A catalog entry annotated for the selection form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCandidate<'a> {
    #[serde(flatten)]
    pub template: &'a ReportTemplate,
    pub compatible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
}

/// Selection as posted by the UI. The template is resolved through the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    pub scope: ReportScope,
    #[serde(default)]
    pub target: Option<Target>,
    #[serde(default, alias = "template_id")]
    pub template_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub options: Option<GenerationOptions>,
    #[serde(default)]
    pub overrides: Vec<OverrideEdit>,
}

impl SelectionPayload {
    /// Build the selection, applying widget edits in order.
    pub fn into_selection(
        self,
        template: Option<ReportTemplate>,
        defaults: &GenerationOptions,
    ) -> Result<SelectionState, ReportError> {
        let mut selection = SelectionState::new(self.scope);
        selection.set_target(self.target);
        if let Some(template) = template {
            selection.select_template(template);
        }
        selection.title = self.title;
        selection.options = self.options.unwrap_or_else(|| defaults.clone());
        selection.apply_edits(&self.overrides)?;
        Ok(selection)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse<'a> {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
    pub widgets: &'a [AiWidgetOverride],
}

impl<'a> CheckResponse<'a> {
    pub fn new(verdict: &'a Verdict, widgets: &'a [AiWidgetOverride]) -> Self {
        Self { allowed: verdict.is_allowed(), reason: verdict.reason(), widgets }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub progress: ProgressState,
}

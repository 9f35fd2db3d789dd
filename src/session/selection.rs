use crate::compat::{validate, Verdict};
use crate::errors::ReportError;
use crate::models::{
    AiWidgetOverride, GenerationOptions, ReportScope, ReportTemplate, Target, Tone,
};
use crate::widgets;
use serde::Deserialize;
use tracing::debug;

/// One user edit to an extracted AI widget; unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideEdit {
    #[serde(alias = "widget_id")]
    pub widget_id: String,
    #[serde(default, alias = "use_ai")]
    pub use_ai: Option<bool>,
    #[serde(default, alias = "manual_content")]
    pub manual_content: Option<String>,
    #[serde(default)]
    pub tone: Option<Tone>,
}

/// Everything the user picked for one submission, passed around as a plain value.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    pub scope: ReportScope,
    pub target: Option<Target>,
    template: Option<ReportTemplate>,
    overrides: Vec<AiWidgetOverride>,
    pub title: Option<String>,
    pub options: GenerationOptions,
}

impl SelectionState {
    pub fn new(scope: ReportScope) -> Self {
        Self {
            scope,
            target: None,
            template: None,
            overrides: Vec::new(),
            title: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.set_target(Some(target));
        self
    }

    pub fn with_template(mut self, template: ReportTemplate) -> Self {
        self.select_template(template);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn template(&self) -> Option<&ReportTemplate> {
        self.template.as_ref()
    }

    pub fn overrides(&self) -> &[AiWidgetOverride] {
        &self.overrides
    }

    pub fn is_bulk(&self) -> bool {
        self.target.as_ref().is_some_and(Target::is_bulk)
    }

    /// Change the requested scope. A template that no longer fits is dropped
    /// together with its overrides. Returns whether the template was kept.
    pub fn set_scope(&mut self, scope: ReportScope) -> bool {
        self.scope = scope;
        self.drop_template_if_incompatible()
    }

    pub fn set_target(&mut self, target: Option<Target>) -> bool {
        self.target = target;
        self.drop_template_if_incompatible()
    }

    /// Select a template and rebuild the override form from it.
    ///
    /// A different template replaces the override list entirely. Reselecting
    /// the same template keeps the user's edits for widgets that still exist.
    pub fn select_template(&mut self, template: ReportTemplate) {
        let mut fresh = widgets::extract(&template);
        let same_template = self.template.as_ref().is_some_and(|t| t.id == template.id);
        if same_template {
            for entry in &mut fresh {
                if let Some(prev) = self.overrides.iter().find(|o| o.widget_id == entry.widget_id) {
                    entry.use_ai = prev.use_ai;
                    entry.manual_content = prev.manual_content.clone();
                    entry.tone = prev.tone;
                }
            }
        }
        debug!(
            template_id = %template.id,
            widgets = fresh.len(),
            kept_edits = same_template,
            "Template selected"
        );
        self.template = Some(template);
        self.overrides = fresh;
    }

    pub fn clear_template(&mut self) {
        self.template = None;
        self.overrides.clear();
    }

    /// Validator verdict for the current selection; `None` until a template is picked.
    pub fn verdict(&self) -> Option<Verdict> {
        self.template
            .as_ref()
            .map(|t| validate(self.scope, self.is_bulk(), t))
    }

    /// Inline denial reason for the UI.
    pub fn denial_reason(&self) -> Option<String> {
        self.verdict().and_then(|v| v.reason().map(String::from))
    }

    pub fn set_use_ai(&mut self, widget_id: &str, use_ai: bool) -> Result<(), ReportError> {
        self.override_mut(widget_id)?.use_ai = use_ai;
        Ok(())
    }

    /// Store manual text for a widget. Writing text implies opting out of AI for it.
    pub fn set_manual_content(&mut self, widget_id: &str, content: impl Into<String>) -> Result<(), ReportError> {
        let entry = self.override_mut(widget_id)?;
        entry.manual_content = content.into();
        entry.use_ai = false;
        Ok(())
    }

    pub fn set_tone(&mut self, widget_id: &str, tone: Tone) -> Result<(), ReportError> {
        self.override_mut(widget_id)?.tone = tone;
        Ok(())
    }

    /// Apply edits in order. Manual text implies AI off unless the same edit turns it back on.
    pub fn apply_edits(&mut self, edits: &[OverrideEdit]) -> Result<(), ReportError> {
        for edit in edits {
            if let Some(tone) = edit.tone {
                self.set_tone(&edit.widget_id, tone)?;
            }
            if let Some(content) = &edit.manual_content {
                self.set_manual_content(&edit.widget_id, content.clone())?;
            }
            if let Some(use_ai) = edit.use_ai {
                self.set_use_ai(&edit.widget_id, use_ai)?;
            }
        }
        Ok(())
    }

    fn override_mut(&mut self, widget_id: &str) -> Result<&mut AiWidgetOverride, ReportError> {
        self.overrides
            .iter_mut()
            .find(|o| o.widget_id == widget_id)
            .ok_or_else(|| ReportError::Validation(format!("Unknown AI widget: {}", widget_id)))
    }

    fn drop_template_if_incompatible(&mut self) -> bool {
        match self.verdict() {
            Some(Verdict::Denied(reason)) => {
                debug!(%reason, "Dropping template after selection change");
                self.clear_template();
                false
            }
            Some(Verdict::Allowed) => true,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WidgetSpec;

    fn template(id: &str, scope: ReportScope, widget_ids: &[&str]) -> ReportTemplate {
        ReportTemplate {
            id: id.into(),
            name: id.into(),
            category: None,
            report_scope: scope,
            structure: widget_ids
                .iter()
                .map(|w| WidgetSpec {
                    id: Some(w.to_string()),
                    widget_type: "ai_summary".into(),
                    title: None,
                    ai: None,
                })
                .collect(),
            is_system: false,
            is_default: false,
        }
    }

    #[test]
    fn test_switching_template_discards_overrides() {
        let mut selection = SelectionState::new(ReportScope::Individual)
            .with_template(template("a", ReportScope::Individual, &["shared", "only-a"]));
        selection.set_manual_content("shared", "Text written for A").unwrap();

        selection.select_template(template("b", ReportScope::Individual, &["shared", "only-b"]));

        let ids: Vec<_> = selection.overrides().iter().map(|o| o.widget_id.as_str()).collect();
        assert_eq!(ids, vec!["shared", "only-b"]);
        assert!(selection.overrides().iter().all(|o| o.use_ai && o.manual_content.is_empty()));
    }

    #[test]
    fn test_reselecting_same_template_keeps_edits() {
        let tpl = template("a", ReportScope::Individual, &["w1", "w2"]);
        let mut selection = SelectionState::new(ReportScope::Individual).with_template(tpl.clone());
        selection.set_manual_content("w2", "Manual").unwrap();
        selection.set_tone("w1", Tone::Technical).unwrap();

        selection.select_template(tpl);

        assert_eq!(selection.overrides()[0].tone, Tone::Technical);
        assert_eq!(selection.overrides()[1].manual_content, "Manual");
        assert!(!selection.overrides()[1].use_ai);
    }

    #[test]
    fn test_scope_change_drops_incompatible_template() {
        let mut selection = SelectionState::new(ReportScope::Individual)
            .with_template(template("entity", ReportScope::Individual, &["w"]));
        assert!(!selection.set_scope(ReportScope::Consolidated));
        assert!(selection.template().is_none());
        assert!(selection.overrides().is_empty());
    }

    #[test]
    fn test_scope_change_keeps_combined_template() {
        let mut selection = SelectionState::new(ReportScope::Individual)
            .with_template(template("both", ReportScope::Both, &["w"]));
        assert!(selection.set_scope(ReportScope::Consolidated));
        assert_eq!(selection.overrides().len(), 1);
    }

    #[test]
    fn test_denial_reason_surfaces_validator_text() {
        let mut selection = SelectionState::new(ReportScope::Consolidated);
        assert_eq!(selection.denial_reason(), None);
        // Selecting directly bypasses the scope-change drop so the UI can show why.
        selection.select_template(template("entity", ReportScope::Individual, &[]));
        assert!(selection.denial_reason().unwrap().contains("per-entity"));
    }

    #[test]
    fn test_unknown_widget_rejected() {
        let mut selection = SelectionState::new(ReportScope::Individual)
            .with_template(template("a", ReportScope::Individual, &["w"]));
        let err = selection.set_use_ai("missing", false).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn test_bulk_target_keeps_per_entity_template() {
        let mut selection = SelectionState::new(ReportScope::Individual)
            .with_template(template("both", ReportScope::Both, &[]));
        assert!(selection.set_target(Some(Target::AllEntities {
            campaign_id: "c".into(),
            campaign_name: None,
        })));
        assert!(selection.is_bulk());
    }

    #[test]
    fn test_apply_edits_in_order() {
        let mut selection = SelectionState::new(ReportScope::Individual)
            .with_template(template("a", ReportScope::Individual, &["w1", "w2"]));
        selection
            .apply_edits(&[
                OverrideEdit { widget_id: "w1".into(), manual_content: Some("Auditor text".into()), ..Default::default() },
                OverrideEdit { widget_id: "w2".into(), tone: Some(Tone::Detailed), ..Default::default() },
            ])
            .unwrap();
        let overrides = selection.overrides();
        assert!(!overrides[0].use_ai);
        assert_eq!(overrides[0].manual_content, "Auditor text");
        assert!(overrides[1].use_ai);
        assert_eq!(overrides[1].tone, Tone::Detailed);
    }
}

use std::collections::HashSet;

use crate::models::{AiWidgetOverride, ReportTemplate, Tone, WidgetSpec};
use tracing::{debug, warn};

/// Widget types that produce AI text even without an explicit AI block.
/// Compared after normalization, so `aiSummary`, `ai-summary` and `ai_summary` match.
const AI_WIDGET_TYPES: &[&str] = &[
    "aisummary",
    "aianalysis",
    "airecommendations",
    "executivesummary",
    "risknarrative",
];

fn normalize_type(widget_type: &str) -> String {
    widget_type
        .chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn is_ai_capable(widget: &WidgetSpec) -> bool {
    widget.ai.is_some() || AI_WIDGET_TYPES.contains(&normalize_type(&widget.widget_type).as_str())
}

/// Id synthesized for widgets without a persisted id.
///
/// Derived from the position in the full widget list so that reselecting the
/// same template reproduces it; widget content is edited independently of
/// identity and must not feed into it.
pub fn fallback_widget_id(position: usize) -> String {
    format!("widget-{}", position)
}

/// Build one override entry per AI-capable widget, in template order.
///
/// Ids are unique across the result. A fallback id that matches a persisted
/// id elsewhere in the template, or a persisted id repeated by a later
/// widget, gets a numeric suffix and is marked unstable.
pub fn extract(template: &ReportTemplate) -> Vec<AiWidgetOverride> {
    let persisted: HashSet<&str> = template.structure.iter().filter_map(WidgetSpec::persisted_id).collect();
    let mut taken: HashSet<String> = HashSet::new();

    let overrides: Vec<AiWidgetOverride> = template
        .structure
        .iter()
        .enumerate()
        .filter(|(_, widget)| is_ai_capable(widget))
        .map(|(position, widget)| {
            let (candidate, stable) = match widget.persisted_id() {
                Some(id) => (id.to_string(), true),
                None => (fallback_widget_id(position), false),
            };
            let widget_id = unique_id(&candidate, !stable, &persisted, &taken);
            let stable = stable && widget_id == candidate;
            if widget_id != candidate {
                warn!(template_id = %template.id, position, id = %candidate, renamed = %widget_id, "Widget id collision");
            }
            taken.insert(widget_id.clone());

            let ai = widget.ai.as_ref();
            AiWidgetOverride {
                widget_id,
                position,
                stable,
                widget_type: widget.widget_type.clone(),
                title: widget.title.clone(),
                use_ai: ai.map_or(true, |c| c.enabled),
                manual_content: String::new(),
                tone: ai.and_then(|c| c.tone).unwrap_or(Tone::Executive),
            }
        })
        .collect();

    let unstable = overrides.iter().filter(|o| !o.stable).count();
    debug!(
        template_id = %template.id,
        ai_widgets = overrides.len(),
        positional_ids = unstable,
        "Extracted AI widget overrides"
    );
    overrides
}

/// `candidate` if nobody holds it, else the first free `candidate-N`.
/// Fallback ids also yield to every persisted id in the template.
fn unique_id(candidate: &str, is_fallback: bool, persisted: &HashSet<&str>, taken: &HashSet<String>) -> String {
    if !taken.contains(candidate) && !(is_fallback && persisted.contains(candidate)) {
        return candidate.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", candidate, n))
        .find(|id| !taken.contains(id) && !persisted.contains(id.as_str()))
        .unwrap_or_else(|| format!("{}-{}", candidate, taken.len() + 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AiWidgetConfig, ReportScope};

    fn widget(id: Option<&str>, widget_type: &str, ai: Option<AiWidgetConfig>) -> WidgetSpec {
        WidgetSpec {
            id: id.map(String::from),
            widget_type: widget_type.into(),
            title: Some(format!("{} section", widget_type)),
            ai,
        }
    }

    fn template(id: &str, structure: Vec<WidgetSpec>) -> ReportTemplate {
        ReportTemplate {
            id: id.into(),
            name: id.into(),
            category: None,
            report_scope: ReportScope::Individual,
            structure,
            is_system: false,
            is_default: false,
        }
    }

    #[test]
    fn test_only_ai_widgets_kept() {
        let tpl = template("t", vec![
            widget(Some("cover"), "cover_page", None),
            widget(Some("sum"), "ai_summary", None),
            widget(Some("chart"), "score_chart", None),
            widget(Some("risk"), "riskNarrative", None),
        ]);
        let ids: Vec<_> = extract(&tpl).into_iter().map(|o| o.widget_id).collect();
        assert_eq!(ids, vec!["sum", "risk"]);
    }

    #[test]
    fn test_explicit_ai_block_makes_widget_capable() {
        let tpl = template("t", vec![widget(
            Some("txt"),
            "free_text",
            Some(AiWidgetConfig { enabled: true, tone: Some(Tone::Detailed), prompt: None }),
        )]);
        let overrides = extract(&tpl);
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].tone, Tone::Detailed);
    }

    #[test]
    fn test_disabled_ai_defaults_to_manual() {
        let tpl = template("t", vec![widget(
            Some("w"),
            "ai_analysis",
            Some(AiWidgetConfig { enabled: false, tone: None, prompt: None }),
        )]);
        let overrides = extract(&tpl);
        assert!(!overrides[0].use_ai);
        assert_eq!(overrides[0].tone, Tone::Executive);
    }

    #[test]
    fn test_missing_ids_fall_back_to_position() {
        let tpl = template("t", vec![
            widget(None, "cover_page", None),
            widget(None, "ai_summary", None),
            widget(Some(""), "executive_summary", None),
            widget(Some("kept"), "ai_recommendations", None),
        ]);
        let overrides = extract(&tpl);
        assert_eq!(overrides[0].widget_id, "widget-1");
        assert!(!overrides[0].stable);
        assert_eq!(overrides[1].widget_id, "widget-2");
        assert_eq!(overrides[2].widget_id, "kept");
        assert!(overrides[2].stable);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let tpl = template("t", vec![
            widget(None, "ai_summary", None),
            widget(Some("x"), "ai_analysis", None),
            widget(None, "risk_narrative", None),
        ]);
        let first: Vec<_> = extract(&tpl).into_iter().map(|o| o.widget_id).collect();
        let second: Vec<_> = extract(&tpl).into_iter().map(|o| o.widget_id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fallback_ids_ignore_content_edits() {
        let original = template("t", vec![widget(None, "ai_summary", None)]);
        let mut edited = original.clone();
        edited.structure[0].title = Some("Renamed".into());
        assert_eq!(extract(&original)[0].widget_id, extract(&edited)[0].widget_id);
    }

    #[test]
    fn test_fallback_id_colliding_with_persisted_id_is_suffixed() {
        let tpl = template("t", vec![
            widget(Some("cover"), "cover_page", None),
            widget(None, "ai_summary", None),
            widget(Some("widget-1"), "risk_narrative", None),
        ]);
        let overrides = extract(&tpl);
        let ids: Vec<_> = overrides.iter().map(|o| o.widget_id.as_str()).collect();
        assert_eq!(ids, vec!["widget-1-2", "widget-1"]);
        assert!(!overrides[0].stable);
        assert!(overrides[1].stable);
    }

    #[test]
    fn test_repeated_persisted_id_made_unique() {
        let tpl = template("t", vec![
            widget(Some("summary"), "ai_summary", None),
            widget(Some("summary"), "ai_analysis", None),
        ]);
        let overrides = extract(&tpl);
        assert_eq!(overrides[0].widget_id, "summary");
        assert!(overrides[0].stable);
        assert_eq!(overrides[1].widget_id, "summary-2");
        assert!(!overrides[1].stable);
    }
}

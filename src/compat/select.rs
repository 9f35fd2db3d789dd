use crate::models::{ReportScope, ReportTemplate};
use super::matrix::validate;

/// Catalog entries usable for the request, in catalog order.
pub fn compatible_templates(
    scope: ReportScope,
    bulk: bool,
    templates: &[ReportTemplate],
) -> Vec<&ReportTemplate> {
    templates
        .iter()
        .filter(|t| validate(scope, bulk, t).is_allowed())
        .collect()
}

/// Pick a template automatically after a scope change.
///
/// The first compatible default wins; several defaults for the same scope
/// are tolerated. Without a default, the first compatible template is used.
pub fn auto_select(
    scope: ReportScope,
    bulk: bool,
    templates: &[ReportTemplate],
) -> Option<&ReportTemplate> {
    let candidates = compatible_templates(scope, bulk, templates);
    let picked = candidates
        .iter()
        .find(|t| t.is_default)
        .or_else(|| candidates.first())
        .copied();
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str, scope: ReportScope, is_default: bool) -> ReportTemplate {
        ReportTemplate {
            id: id.into(),
            name: id.into(),
            category: None,
            report_scope: scope,
            structure: vec![],
            is_system: false,
            is_default,
        }
    }

    #[test]
    fn test_auto_select_prefers_default() {
        let templates = vec![
            template("plain", ReportScope::Individual, false),
            template("default", ReportScope::Individual, true),
        ];
        let picked = auto_select(ReportScope::Individual, false, &templates).unwrap();
        assert_eq!(picked.id, "default");
    }

    #[test]
    fn test_auto_select_skips_incompatible_default() {
        let templates = vec![
            template("consolidated-default", ReportScope::Consolidated, true),
            template("entity", ReportScope::Individual, false),
        ];
        let picked = auto_select(ReportScope::Individual, true, &templates).unwrap();
        assert_eq!(picked.id, "entity");
    }

    #[test]
    fn test_auto_select_with_duplicate_defaults_takes_first() {
        let templates = vec![
            template("a", ReportScope::Both, true),
            template("b", ReportScope::Consolidated, true),
        ];
        let picked = auto_select(ReportScope::Consolidated, false, &templates).unwrap();
        assert_eq!(picked.id, "a");
    }

    #[test]
    fn test_auto_select_none_when_nothing_fits() {
        let templates = vec![template("scan", ReportScope::ScanIndividual, true)];
        assert!(auto_select(ReportScope::Consolidated, false, &templates).is_none());
    }

    #[test]
    fn test_compatible_templates_keeps_catalog_order() {
        let templates = vec![
            template("both", ReportScope::Both, false),
            template("scan", ReportScope::ScanBoth, false),
            template("entity", ReportScope::Individual, false),
        ];
        let ids: Vec<_> = compatible_templates(ReportScope::Individual, false, &templates)
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["both", "entity"]);
    }
}

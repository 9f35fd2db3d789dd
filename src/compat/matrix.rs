use serde::Serialize;
use crate::models::{ReportScope, ReportTemplate, ScopeFamily};

/// Outcome of a compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "lowercase")]
pub enum Verdict {
    Allowed,
    Denied(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

/// Whether a template declaring `template_scope` can produce a `requested` report.
pub fn scope_accepts(template_scope: ReportScope, requested: ReportScope) -> bool {
    if template_scope.family() != requested.family() {
        return false;
    }
    if template_scope.is_combined() {
        return true;
    }
    template_scope == requested
}

/// Template scopes able to render one report per entity.
pub fn supports_per_entity(template_scope: ReportScope) -> bool {
    matches!(template_scope, ReportScope::Individual | ReportScope::Both)
}

/// Decide whether `template` may be used for a `scope` request.
///
/// `bulk` is set for "all entities in campaign" submissions. Pure: no I/O,
/// same inputs give the same verdict.
pub fn validate(scope: ReportScope, bulk: bool, template: &ReportTemplate) -> Verdict {
    let template_scope = template.report_scope;

    if bulk {
        if scope != ReportScope::Individual {
            return Verdict::Denied(format!(
                "Generating for all entities is only available for entity reports, not {} reports",
                scope.label().to_lowercase().trim_end_matches(" report"),
            ));
        }
        if !supports_per_entity(template_scope) {
            return Verdict::Denied(format!(
                "Template '{}' is a {} template and cannot generate one report per entity",
                template.name,
                template_scope.template_description(),
            ));
        }
    }

    if scope_accepts(template_scope, scope) {
        return Verdict::Allowed;
    }

    let reason = if template_scope.family() != scope.family() {
        match template_scope.family() {
            ScopeFamily::Scanner => format!(
                "Template '{}' is a vulnerability-scan template and cannot be used for audit reports",
                template.name
            ),
            ScopeFamily::Audit => format!(
                "Template '{}' is an audit template and cannot be used for scan reports",
                template.name
            ),
        }
    } else if scope.is_combined() {
        format!(
            "Template '{}' only supports {} reports; a combined {} report needs a template covering every {} scope",
            template.name,
            template_scope.template_description(),
            scope.family(),
            scope.family(),
        )
    } else {
        format!(
            "Template '{}' only supports {} reports and cannot produce a {}",
            template.name,
            template_scope.template_description(),
            scope.label().to_lowercase(),
        )
    };
    Verdict::Denied(reason)
}

use chrono::NaiveDate;
use crate::compat::{validate, Verdict};
use crate::errors::ReportError;
use crate::models::{
    ForceMode, GenerationRequest, ReportScope, RequestOptions, Target, WireWidgetOverride,
};
use crate::session::SelectionState;
use super::title::default_title;
use tracing::debug;

/// Assemble the outbound request for a selection.
///
/// Runs the compatibility check first; nothing here touches the network, so
/// every rejection happens before a request exists.
pub fn build_request(selection: &SelectionState, today: NaiveDate) -> Result<GenerationRequest, ReportError> {
    let template = selection
        .template()
        .ok_or_else(|| ReportError::Validation("Select a report template first".into()))?;

    let target = resolve_target(selection.scope, selection.target.as_ref())?;

    if let Verdict::Denied(reason) = validate(selection.scope, target.is_bulk(), template) {
        return Err(ReportError::Incompatible(reason));
    }

    let force_mode = selection.options.force_mode;
    let mut widget_overrides = Vec::with_capacity(selection.overrides().len());
    for entry in selection.overrides() {
        let wire = WireWidgetOverride::resolve(entry, force_mode);
        if !wire.use_ai && entry.manual_content.trim().is_empty() {
            let name = entry.title.as_deref().unwrap_or(&entry.widget_id);
            let message = if force_mode == Some(ForceMode::Manual) {
                format!("Manual mode is forced but widget '{}' has no manual content", name)
            } else {
                format!("Widget '{}' has AI generation disabled but no manual content", name)
            };
            return Err(ReportError::Validation(message));
        }
        widget_overrides.push(wire);
    }

    let title = selection
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .unwrap_or_else(|| default_title(selection.scope, Some(&target), today));

    debug!(
        scope = %selection.scope,
        template_id = %template.id,
        target = target.kind(),
        overrides = widget_overrides.len(),
        "Generation request built"
    );

    Ok(GenerationRequest::new(
        selection.scope,
        template.id.clone(),
        target,
        title,
        RequestOptions {
            generation: selection.options.clone(),
            widget_overrides,
        },
    ))
}

/// Check that the target fits the scope. The ecosystem scope needs no explicit target.
fn resolve_target(scope: ReportScope, target: Option<&Target>) -> Result<Target, ReportError> {
    let target = match (scope, target) {
        (ReportScope::ScanEcosystem, None) => return Ok(Target::Ecosystem),
        (ReportScope::Individual, None) => {
            return Err(ReportError::Validation(
                "Entity reports need an entity or the 'all entities' option".into(),
            ))
        }
        (_, None) => {
            return Err(ReportError::Validation(format!(
                "A {} needs a target",
                scope.label().to_lowercase()
            )))
        }
        (_, Some(t)) => t,
    };

    let fits = match scope {
        ReportScope::Individual => matches!(target, Target::Entity { .. } | Target::AllEntities { .. }),
        ReportScope::Consolidated => matches!(target, Target::Campaign { .. }),
        ReportScope::ScanIndividual => matches!(target, Target::Scan { .. }),
        ReportScope::ScanEcosystem => matches!(target, Target::Ecosystem),
        ReportScope::Both => matches!(target, Target::Entity { .. } | Target::Campaign { .. }),
        ReportScope::ScanBoth => matches!(target, Target::Scan { .. } | Target::Ecosystem),
    };
    if !fits {
        return Err(ReportError::Validation(format!(
            "The {} target cannot be used for a {}",
            target.kind().replace('_', " "),
            scope.label().to_lowercase()
        )));
    }

    if let Some(id) = target.id() {
        if id.trim().is_empty() {
            return Err(ReportError::Validation(format!("The {} id is empty", target.kind().replace('_', " "))));
        }
    }

    Ok(target.clone())
}

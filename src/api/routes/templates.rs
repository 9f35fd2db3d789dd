use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use crate::api::models::{TemplateCandidate, TemplateQuery};
use crate::api::AppState;
use crate::client::{list_with_retry, TemplateFilter};
use crate::compat::{auto_select, validate};
use crate::errors::ReportError;
use crate::models::ReportScope;

/// Candidate templates for a scope, each with its verdict, plus the auto-selected id.
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<Value>, ReportError> {
    let scope = match query.scope.as_deref() {
        Some(raw) => raw.parse::<ReportScope>().map_err(ReportError::Validation)?,
        None => ReportScope::Individual,
    };
    let bulk = matches!(query.target.as_deref(), Some("all_entities" | "allEntities" | "bulk"));

    let filter = TemplateFilter::for_scope(scope)
        .with_category(query.category.or_else(|| state.defaults.category.clone()));
    let templates = list_with_retry(state.catalog.as_ref(), &filter, &state.defaults.retry).await?;

    let verdicts: Vec<_> = templates.iter().map(|t| validate(scope, bulk, t)).collect();
    let candidates: Vec<TemplateCandidate> = templates
        .iter()
        .zip(&verdicts)
        .map(|(template, verdict)| TemplateCandidate {
            template,
            compatible: verdict.is_allowed(),
            reason: verdict.reason(),
        })
        .collect();
    let selected = auto_select(scope, bulk, &templates).map(|t| t.id.clone());

    Ok(Json(json!({
        "scope": scope,
        "bulk": bulk,
        "autoSelected": selected,
        "templates": candidates,
    })))
}

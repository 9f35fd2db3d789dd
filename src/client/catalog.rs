use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::errors::{with_retry, ReportError, RetryConfig};
use crate::models::{ReportScope, ReportTemplate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_scope: Option<ReportScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TemplateFilter {
    pub fn for_scope(scope: ReportScope) -> Self {
        Self { report_scope: Some(scope), category: None }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }
}

#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Candidate templates for the filter. Each carries `reportScope` and its widget structure.
    async fn list(&self, filter: &TemplateFilter) -> Result<Vec<ReportTemplate>, ReportError>;

    /// Fetch one template by id.
    async fn get(&self, template_id: &str) -> Result<ReportTemplate, ReportError> {
        self.list(&TemplateFilter::default())
            .await?
            .into_iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| ReportError::NotFound(format!("Template {}", template_id)))
    }
}

/// Listing is idempotent, so transient failures are retried.
pub async fn list_with_retry(
    catalog: &dyn TemplateCatalog,
    filter: &TemplateFilter,
    retry: &RetryConfig,
) -> Result<Vec<ReportTemplate>, ReportError> {
    with_retry("list_templates", retry, || catalog.list(filter)).await
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::{list_with_retry, HttpReportClient, TemplateCatalog, TemplateFilter};
use crate::compat::auto_select;
use crate::config::{parse_config, ReportctlConfig};
use crate::errors::{with_retry, ReportError};
use crate::models::{ReportScope, ReportTemplate};
use super::commands::GlobalArgs;
use tracing::{debug, info};

const DEFAULT_CONFIG_FILE: &str = "reportctl.yaml";

/// Config and backend client shared by the subcommands.
pub struct CliContext {
    pub config: ReportctlConfig,
    pub client: Arc<HttpReportClient>,
}

impl CliContext {
    pub async fn load(global: &GlobalArgs) -> Result<Self, ReportError> {
        let config = load_config(global.config.as_deref()).await?;
        let settings = config.client_settings(global.base_url.as_deref(), global.api_token.as_deref())?;
        debug!(base_url = %settings.base_url, authenticated = settings.api_token.is_some(), "Backend configured");
        let client = Arc::new(HttpReportClient::new(&settings)?);
        Ok(Self { config, client })
    }

    pub fn scope(&self, raw: Option<&str>) -> Result<ReportScope, ReportError> {
        match raw {
            Some(raw) => raw.parse().map_err(ReportError::Validation),
            None => Ok(self.config.default_scope()),
        }
    }

    pub async fn template(&self, id: &str) -> Result<ReportTemplate, ReportError> {
        let retry = self.config.retry_config();
        with_retry("get_template", &retry, || self.client.get(id)).await
    }

    /// The explicit template, or the one auto-selected for the scope.
    pub async fn template_or_default(
        &self,
        id: Option<&str>,
        scope: ReportScope,
        bulk: bool,
    ) -> Result<ReportTemplate, ReportError> {
        if let Some(id) = id {
            return self.template(id).await;
        }
        let filter = TemplateFilter::for_scope(scope).with_category(self.config.default_category());
        let templates = list_with_retry(self.client.as_ref(), &filter, &self.config.retry_config()).await?;
        let picked = auto_select(scope, bulk, &templates).cloned().ok_or_else(|| {
            ReportError::Validation(format!("No template can produce a {}", scope.label().to_lowercase()))
        })?;
        info!(template_id = %picked.id, name = %picked.name, "Template auto-selected");
        Ok(picked)
    }
}

pub async fn load_config(path: Option<&str>) -> Result<ReportctlConfig, ReportError> {
    let path = match path {
        Some(p) => PathBuf::from(p),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => PathBuf::from(DEFAULT_CONFIG_FILE),
        None => return Ok(ReportctlConfig::default()),
    };
    parse_config(&path).await
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use reqwest_eventsource::{retry::Never, EventSource};
use serde::Deserialize;
use serde_json::Value;
use crate::config::ClientSettings;
use crate::errors::ReportError;
use crate::models::{GenerationAccepted, GenerationRequest, ReportTemplate};
use super::backend::{EventStream, GenerationBackend};
use super::catalog::{TemplateCatalog, TemplateFilter};
use super::sse::{map_status, open_event_stream};
use tracing::{debug, info};

/// REST/SSE client for the audit platform's report endpoints.
pub struct HttpReportClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    request_timeout: Duration,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateListing {
    Bare(Vec<ReportTemplate>),
    Wrapped { templates: Vec<ReportTemplate> },
}

impl HttpReportClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ReportError> {
        // No client-wide timeout: the progress stream stays open for the whole bulk run.
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| ReportError::Config(format!("Cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token.clone(),
            request_timeout: settings.request_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(&self, resp: Response, what: &str) -> Result<Response, ReportError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body: Option<Value> = resp.json().await.ok();
        let detail = body.as_ref().and_then(|b| {
            b.get("error")
                .or_else(|| b.get("message"))
                .or_else(|| b.get("detail"))
                .and_then(Value::as_str)
                .map(String::from)
        });
        Err(match (map_status(status, what), detail) {
            (ReportError::Backend(_), Some(detail)) => ReportError::Backend(detail),
            (ReportError::Permission(_), Some(detail)) => ReportError::Permission(detail),
            (err, _) => err,
        })
    }
}

#[async_trait]
impl TemplateCatalog for HttpReportClient {
    async fn list(&self, filter: &TemplateFilter) -> Result<Vec<ReportTemplate>, ReportError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(scope) = filter.report_scope {
            query.push(("report_scope", scope.to_string()));
        }
        if let Some(category) = &filter.category {
            query.push(("category", category.clone()));
        }

        let resp = self
            .authorize(self.client.get(self.url("report-templates")))
            .query(&query)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let resp = self.check(resp, "template catalog").await?;

        let templates = match resp.json::<TemplateListing>().await? {
            TemplateListing::Bare(t) | TemplateListing::Wrapped { templates: t } => t,
        };
        debug!(count = templates.len(), scope = ?filter.report_scope, "Templates listed");
        Ok(templates)
    }

    async fn get(&self, template_id: &str) -> Result<ReportTemplate, ReportError> {
        let resp = self
            .authorize(self.client.get(self.url(&format!("report-templates/{}", template_id))))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let resp = self.check(resp, &format!("template {}", template_id)).await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl GenerationBackend for HttpReportClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationAccepted, ReportError> {
        let resp = self
            .authorize(self.client.post(self.url("reports/generate")))
            .json(request)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let resp = self.check(resp, "report generation").await?;
        let accepted: GenerationAccepted = resp.json().await?;
        if !accepted.accepted {
            return Err(ReportError::Backend(
                accepted.message.unwrap_or_else(|| "Generation request was not accepted".into()),
            ));
        }
        info!(report_id = ?accepted.report_id, "Generation accepted");
        Ok(accepted)
    }

    async fn open_bulk_stream(
        &self,
        campaign_id: &str,
        request: &GenerationRequest,
    ) -> Result<EventStream, ReportError> {
        let url = self.url(&format!("campaigns/{}/reports/generate-all/stream", campaign_id));
        info!(%url, template_id = request.template_id(), "Opening progress stream");

        let builder = self
            .authorize(self.client.post(&url))
            .query(&[("template_id", request.template_id())])
            .json(request);
        let mut source = EventSource::new(builder)
            .map_err(|e| ReportError::Internal(format!("Cannot open progress stream: {}", e)))?;
        source.set_retry_policy(Box::new(Never));

        open_event_stream(source).await
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}

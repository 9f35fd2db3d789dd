use async_trait::async_trait;
use futures::stream::BoxStream;
use crate::errors::ReportError;
use crate::models::{GenerationAccepted, GenerationRequest};
use crate::stream::StreamEvent;

/// Decoded bulk-generation events. The connection closes when the stream is dropped.
pub type EventStream = BoxStream<'static, Result<StreamEvent, ReportError>>;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// One request/response generation. Acceptance only; rendering happens out of band.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationAccepted, ReportError>;

    /// Open the server-sent progress stream for one report per entity of the campaign.
    async fn open_bulk_stream(
        &self,
        campaign_id: &str,
        request: &GenerationRequest,
    ) -> Result<EventStream, ReportError>;

    /// Backend name for logging
    fn backend_name(&self) -> &str;
}

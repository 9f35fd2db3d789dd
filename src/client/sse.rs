use futures::StreamExt;
use reqwest::StatusCode;
use reqwest_eventsource::{Event, EventSource};
use crate::errors::ReportError;
use crate::stream::{decode_payload, StreamEvent};
use super::backend::EventStream;
use tracing::{debug, warn};

/// Keep-alives and payloads that fail to parse yield nothing.
fn decode_message(event_name: &str, data: &str) -> Option<StreamEvent> {
    match decode_payload(data) {
        Ok(Some(event)) => Some(event),
        Ok(None) => {
            debug!("Received SSE keepalive");
            None
        }
        Err(e) => {
            warn!(event = event_name, error = %e, data = %data, "Failed to parse progress event");
            None
        }
    }
}

/// Wait for the connection to open, then expose the source as an [`EventStream`].
///
/// Reconnection must already be disabled on `source`: a bulk run is not
/// guaranteed to be resumable, so a dropped connection ends the stream.
pub async fn open_event_stream(mut source: EventSource) -> Result<EventStream, ReportError> {
    let mut pending = None;
    match source.next().await {
        Some(Ok(Event::Open)) => debug!("Progress stream opened"),
        Some(Ok(Event::Message(message))) => pending = decode_message(&message.event, &message.data),
        Some(Err(e)) => {
            source.close();
            return Err(map_eventsource_error(e));
        }
        None => return Err(ReportError::ConnectionLost("stream closed before opening".into())),
    }

    let head = futures::stream::iter(pending.map(Ok));
    let tail = futures::stream::unfold(Some(source), |source| async move {
        let mut source = source?;
        loop {
            match source.next().await {
                None => return None,
                Some(Ok(Event::Open)) => continue,
                Some(Ok(Event::Message(message))) => {
                    if let Some(event) = decode_message(&message.event, &message.data) {
                        return Some((Ok(event), Some(source)));
                    }
                }
                Some(Err(reqwest_eventsource::Error::StreamEnded)) => {
                    source.close();
                    return None;
                }
                Some(Err(e)) => {
                    source.close();
                    return Some((Err(map_eventsource_error(e)), None));
                }
            }
        }
    });
    Ok(head.chain(tail).boxed())
}

pub fn map_eventsource_error(e: reqwest_eventsource::Error) -> ReportError {
    match e {
        reqwest_eventsource::Error::InvalidStatusCode(status, _) => map_status(status, "progress stream"),
        reqwest_eventsource::Error::InvalidContentType(content_type, _) => ReportError::Backend(format!(
            "Progress stream answered with content type {:?}",
            content_type
        )),
        reqwest_eventsource::Error::Transport(e) => ReportError::ConnectionLost(e.to_string()),
        reqwest_eventsource::Error::StreamEnded => ReportError::ConnectionLost("stream ended".into()),
        other => ReportError::ConnectionLost(other.to_string()),
    }
}

pub fn map_status(status: StatusCode, what: &str) -> ReportError {
    match status.as_u16() {
        401 => ReportError::Authentication(format!("{} rejected the API token", what)),
        403 => ReportError::Permission(format!("{} returned 403 Forbidden", what)),
        404 => ReportError::NotFound(what.to_string()),
        429 => ReportError::RateLimit(format!("{} rate limited", what)),
        code => ReportError::Backend(format!("{} returned HTTP {}", what, code)),
    }
}

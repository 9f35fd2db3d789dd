use serde::{Deserialize, Serialize};

/// One server-pushed progress payload, discriminated by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamEvent {
    Started {
        total_entities: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(alias = "entityStarted")]
    EntityStarted {
        entity_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_name: Option<String>,
    },
    #[serde(alias = "entityProgress")]
    EntityProgress {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(alias = "entityCompleted")]
    EntityCompleted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(alias = "entityFailed")]
    EntityFailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        success_count: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        failed_count: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(alias = "keepalive", alias = "ping")]
    Heartbeat,
    /// Any discriminator this client does not know.
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// `completed` and `error` end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Error { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::EntityStarted { .. } => "entity_started",
            Self::EntityProgress { .. } => "entity_progress",
            Self::EntityCompleted { .. } => "entity_completed",
            Self::EntityFailed { .. } => "entity_failed",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
            Self::Heartbeat => "heartbeat",
            Self::Unknown => "unknown",
        }
    }
}

/// Decode the `data` field of one SSE message.
///
/// Keep-alive payloads (empty or the literal `keepalive`) yield `Ok(None)`.
pub fn decode_payload(data: &str) -> Result<Option<StreamEvent>, serde_json::Error> {
    let data = data.trim();
    if data.is_empty() || data == "keepalive" {
        return Ok(None);
    }
    serde_json::from_str(data).map(Some)
}

use crate::models::Target;

/// How a submission reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    /// One request/response call for a concrete target.
    Single,
    /// One report per entity of the campaign, progress pushed over SSE.
    Streaming { campaign_id: String },
}

impl GenerationMode {
    pub fn for_target(target: &Target) -> Self {
        match target {
            Target::AllEntities { campaign_id, .. } => Self::Streaming { campaign_id: campaign_id.clone() },
            _ => Self::Single,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming { .. })
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Streaming { .. } => write!(f, "streaming"),
        }
    }
}

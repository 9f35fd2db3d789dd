use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ProgressPhase {
    #[default]
    Idle,
    Validating,
    SingleRequestInFlight,
    Streaming,
    Completed,
    Failed,
}

impl ProgressPhase {
    /// A generation owns the view while in one of these phases.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Validating | Self::SingleRequestInFlight | Self::Streaming)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::SingleRequestInFlight => "singleRequestInFlight",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProgressPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOutcome {
    pub name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of a generation run as the UI sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub phase: ProgressPhase,
    pub total_targets: usize,
    pub current_index: usize,
    pub current_target_name: Option<String>,
    /// Latest informational sub-step reported for the current target.
    pub current_step: Option<String>,
    pub success_count: usize,
    pub failed_count: usize,
    pub outcomes: Vec<TargetOutcome>,
    /// Summary or failure message surfaced to the user.
    pub message: Option<String>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> usize {
        self.success_count + self.failed_count
    }

    /// Counts stay within the total and the outcome log matches them.
    pub fn is_consistent(&self) -> bool {
        self.outcomes.len() == self.processed() && self.processed() <= self.total_targets
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

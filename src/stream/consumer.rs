use crate::errors::classification::{reword_failure, CONNECTION_LOST_MESSAGE};
use crate::models::{ProgressPhase, ProgressState, TargetOutcome};
use super::events::StreamEvent;
use tracing::{debug, info, warn};

/// Recorded for targets the server never reported before `completed`.
pub const UNREPORTED_TARGET_ERROR: &str = "No outcome reported by the server";

/// Whether the consumer wants more events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// A terminal event was applied; the caller closes the connection.
    Terminal,
}

/// Reducer turning the bulk-generation event stream into a [`ProgressState`].
///
/// Events are applied strictly in arrival order. Per-target failures are
/// absorbed into the counts; only `error`, a transport drop, or an
/// abandonment end the run as failed.
#[derive(Debug, Clone, Default)]
pub struct ProgressConsumer {
    state: ProgressState,
    started: bool,
    finished: bool,
}

impl ProgressConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a whole sequence, stopping at the first terminal event.
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a StreamEvent>) -> Self {
        let mut consumer = Self::new();
        for event in events {
            if consumer.apply(event) == Step::Terminal {
                break;
            }
        }
        consumer
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn into_state(self) -> ProgressState {
        self.state
    }

    /// True once a terminal event, a transport drop or an abandonment was recorded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn apply(&mut self, event: &StreamEvent) -> Step {
        if self.finished {
            debug!(status = event.status(), "Ignoring event after terminal state");
            return Step::Terminal;
        }

        match event {
            StreamEvent::Started { total_entities, message } => {
                if self.started {
                    warn!(total_entities, "Duplicate started event ignored");
                } else {
                    self.started = true;
                    self.state.phase = ProgressPhase::Streaming;
                    self.state.total_targets = *total_entities;
                    self.state.message = message.clone();
                    info!(total_entities, "Bulk generation started");
                }
            }
            StreamEvent::EntityStarted { entity_index, entity_name } => {
                self.state.current_index = *entity_index;
                self.state.current_target_name = entity_name.clone();
                self.state.current_step = None;
                debug!(entity_index, entity_name = ?entity_name, "Entity started");
            }
            StreamEvent::EntityProgress { message, .. } => {
                if message.is_some() {
                    self.state.current_step = message.clone();
                }
            }
            StreamEvent::EntityCompleted { entity_index, entity_name, .. } => {
                let name = self.outcome_name(*entity_index, entity_name.as_deref());
                self.record(TargetOutcome { name, success: true, error: None });
            }
            StreamEvent::EntityFailed { entity_index, entity_name, error, message } => {
                let name = self.outcome_name(*entity_index, entity_name.as_deref());
                let error = error
                    .clone()
                    .or_else(|| message.clone())
                    .unwrap_or_else(|| "Report generation failed".to_string());
                warn!(entity = %name, %error, "Entity report failed");
                self.record(TargetOutcome { name, success: false, error: Some(error) });
            }
            StreamEvent::Completed { success_count, failed_count, message } => {
                self.complete(*success_count, *failed_count, message.as_deref());
                return Step::Terminal;
            }
            StreamEvent::Error { error, message } => {
                let raw = error
                    .as_deref()
                    .or(message.as_deref())
                    .unwrap_or("Bulk generation failed");
                self.fail(reword_failure(raw));
                return Step::Terminal;
            }
            StreamEvent::Heartbeat => {}
            StreamEvent::Unknown => debug!("Skipping event with unknown status"),
        }
        Step::Continue
    }

    /// The connection ended without a terminal event.
    pub fn connection_lost(&mut self, detail: Option<&str>) {
        if self.finished {
            return;
        }
        warn!(detail = ?detail, processed = self.state.processed(), total = self.state.total_targets, "Event stream dropped before a terminal event");
        self.fail(CONNECTION_LOST_MESSAGE.to_string());
    }

    /// A stream-level failure raised outside the event payloads (open failure, access check).
    pub fn stream_failed(&mut self, message: String) {
        if self.finished {
            return;
        }
        self.fail(message);
    }

    fn outcome_name(&self, entity_index: Option<usize>, entity_name: Option<&str>) -> String {
        if let Some(name) = entity_name.filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        let matches_current = entity_index.map_or(true, |i| i == self.state.current_index);
        match (&self.state.current_target_name, matches_current) {
            (Some(current), true) => current.clone(),
            _ => format!("Entity {}", entity_index.unwrap_or(self.state.current_index)),
        }
    }

    fn record(&mut self, outcome: TargetOutcome) {
        if !self.started {
            warn!(entity = %outcome.name, "Outcome received before started event, dropped");
            return;
        }
        if self.state.processed() >= self.state.total_targets {
            warn!(
                entity = %outcome.name,
                total = self.state.total_targets,
                "Outcome exceeds announced total, dropped"
            );
            return;
        }
        if outcome.success {
            self.state.success_count += 1;
        } else {
            self.state.failed_count += 1;
        }
        self.state.outcomes.push(outcome);
    }

    fn complete(&mut self, success_count: Option<usize>, failed_count: Option<usize>, message: Option<&str>) {
        let missing = self.state.total_targets.saturating_sub(self.state.processed());
        if missing > 0 {
            warn!(missing, "Completed with unreported targets, recording them as failed");
            for _ in 0..missing {
                self.state.failed_count += 1;
                self.state.outcomes.push(TargetOutcome {
                    name: format!("Entity {}", self.state.outcomes.len() + 1),
                    success: false,
                    error: Some(UNREPORTED_TARGET_ERROR.to_string()),
                });
            }
        }

        if success_count.is_some_and(|s| s != self.state.success_count)
            || failed_count.is_some_and(|f| f != self.state.failed_count)
        {
            warn!(
                server_success = ?success_count,
                server_failed = ?failed_count,
                success = self.state.success_count,
                failed = self.state.failed_count,
                "Server summary disagrees with observed outcomes"
            );
        }

        let summary = message
            .filter(|m| !m.trim().is_empty())
            .map(String::from)
            .unwrap_or_else(|| self.summary());
        info!(
            success = self.state.success_count,
            failed = self.state.failed_count,
            total = self.state.total_targets,
            "Bulk generation completed"
        );
        self.state.phase = ProgressPhase::Completed;
        self.state.current_step = None;
        self.state.message = Some(summary);
        self.finished = true;
    }

    fn fail(&mut self, message: String) {
        self.state.phase = ProgressPhase::Failed;
        self.state.current_step = None;
        self.state.message = Some(message);
        self.finished = true;
    }

    fn summary(&self) -> String {
        format!(
            "Generated {} of {} reports ({} failed)",
            self.state.success_count, self.state.total_targets, self.state.failed_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(total: usize) -> StreamEvent {
        StreamEvent::Started { total_entities: total, message: None }
    }

    fn entity_started(index: usize, name: &str) -> StreamEvent {
        StreamEvent::EntityStarted { entity_index: index, entity_name: Some(name.into()) }
    }

    fn entity_completed(index: usize) -> StreamEvent {
        StreamEvent::EntityCompleted { entity_index: Some(index), entity_name: None, message: None }
    }

    fn entity_failed(index: usize, error: &str) -> StreamEvent {
        StreamEvent::EntityFailed { entity_index: Some(index), entity_name: None, error: Some(error.into()), message: None }
    }

    fn completed(success: usize, failed: usize) -> StreamEvent {
        StreamEvent::Completed { success_count: Some(success), failed_count: Some(failed), message: None }
    }

    #[test]
    fn test_three_entity_run_with_one_failure() {
        let events = vec![
            started(3),
            entity_started(1, "Alpha"),
            entity_completed(1),
            entity_started(2, "Beta"),
            entity_failed(2, "render error"),
            entity_started(3, "Gamma"),
            entity_completed(3),
            completed(2, 1),
        ];
        let state = ProgressConsumer::replay(&events).into_state();

        assert_eq!(state.phase, ProgressPhase::Completed);
        assert_eq!(state.success_count, 2);
        assert_eq!(state.failed_count, 1);
        assert_eq!(state.outcomes.len(), 3);
        assert_eq!(state.outcomes[1].name, "Beta");
        assert_eq!(state.outcomes[1].error.as_deref(), Some("render error"));
        assert_eq!(state.message.as_deref(), Some("Generated 2 of 3 reports (1 failed)"));
    }

    #[test]
    fn test_invariants_hold_after_every_event() {
        let events = vec![
            started(2),
            entity_started(1, "A"),
            StreamEvent::EntityProgress { entity_index: Some(1), entity_name: None, message: Some("Rendering charts".into()) },
            entity_completed(1),
            entity_started(2, "B"),
            entity_failed(2, "timeout"),
            completed(1, 1),
        ];
        let mut consumer = ProgressConsumer::new();
        for event in &events {
            consumer.apply(event);
            assert!(consumer.state().is_consistent());
        }
    }

    #[test]
    fn test_progress_event_sets_step_only() {
        let mut consumer = ProgressConsumer::replay(&[started(1), entity_started(1, "A")]);
        let before = consumer.state().clone();
        consumer.apply(&StreamEvent::EntityProgress { entity_index: Some(1), entity_name: None, message: Some("AI summary".into()) });
        assert_eq!(consumer.state().current_step.as_deref(), Some("AI summary"));
        assert_eq!(consumer.state().outcomes, before.outcomes);
        assert_eq!(consumer.state().processed(), before.processed());
    }

    #[test]
    fn test_completed_fills_unreported_targets() {
        let state = ProgressConsumer::replay(&[
            started(3),
            entity_started(1, "A"),
            entity_completed(1),
            completed(1, 0),
        ])
        .into_state();
        assert_eq!(state.processed(), state.total_targets);
        assert_eq!(state.outcomes.len(), 3);
        assert_eq!(state.failed_count, 2);
        assert_eq!(state.outcomes[2].error.as_deref(), Some(UNREPORTED_TARGET_ERROR));
    }

    #[test]
    fn test_outcomes_beyond_total_dropped() {
        let state = ProgressConsumer::replay(&[
            started(1),
            entity_completed(1),
            entity_completed(2),
            entity_failed(3, "late"),
        ])
        .into_state();
        assert_eq!(state.processed(), 1);
        assert_eq!(state.outcomes.len(), 1);
        assert_eq!(state.phase, ProgressPhase::Streaming);
    }

    #[test]
    fn test_outcome_before_started_dropped() {
        let state = ProgressConsumer::replay(&[entity_completed(1)]).into_state();
        assert_eq!(state.processed(), 0);
        assert_eq!(state.phase, ProgressPhase::Idle);
    }

    #[test]
    fn test_stream_error_fails_run() {
        let state = ProgressConsumer::replay(&[
            started(2),
            entity_completed(1),
            StreamEvent::Error { error: Some("Renderer unavailable".into()), message: None },
        ])
        .into_state();
        assert_eq!(state.phase, ProgressPhase::Failed);
        assert_eq!(state.message.as_deref(), Some("Renderer unavailable"));
        assert_eq!(state.success_count, 1);
    }

    #[test]
    fn test_stream_error_permission_reworded() {
        let state = ProgressConsumer::replay(&[
            StreamEvent::Error { error: None, message: Some("Forbidden: missing reports.generate".into()) },
        ])
        .into_state();
        assert_eq!(state.message.as_deref(), Some(crate::errors::PERMISSION_DENIED_MESSAGE));
    }

    #[test]
    fn test_transport_drop_never_completes() {
        let mut consumer = ProgressConsumer::replay(&[started(3), entity_started(1, "A"), entity_completed(1)]);
        consumer.connection_lost(Some("connection reset"));
        let state = consumer.state();
        assert_eq!(state.phase, ProgressPhase::Failed);
        assert_eq!(state.message.as_deref(), Some(CONNECTION_LOST_MESSAGE));
        assert!(state.is_consistent());
    }

    #[test]
    fn test_connection_lost_after_terminal_is_noop() {
        let mut consumer = ProgressConsumer::replay(&[started(1), entity_completed(1), completed(1, 0)]);
        consumer.connection_lost(None);
        assert_eq!(consumer.state().phase, ProgressPhase::Completed);
    }

    #[test]
    fn test_events_after_terminal_ignored() {
        let mut consumer = ProgressConsumer::replay(&[started(1), completed(0, 0)]);
        assert_eq!(consumer.apply(&entity_completed(1)), Step::Terminal);
        assert_eq!(consumer.state().processed(), 1);
        assert_eq!(consumer.state().phase, ProgressPhase::Completed);
    }

    #[test]
    fn test_name_falls_back_to_current_target() {
        let state = ProgressConsumer::replay(&[
            started(2),
            entity_started(1, "Acme"),
            entity_completed(1),
            StreamEvent::EntityCompleted { entity_index: Some(2), entity_name: None, message: None },
        ])
        .into_state();
        assert_eq!(state.outcomes[0].name, "Acme");
        assert_eq!(state.outcomes[1].name, "Entity 2");
    }

    #[test]
    fn test_unknown_and_heartbeat_do_not_change_state() {
        let mut consumer = ProgressConsumer::replay(&[started(2)]);
        let before = consumer.state().clone();
        consumer.apply(&StreamEvent::Heartbeat);
        consumer.apply(&StreamEvent::Unknown);
        assert_eq!(consumer.state(), &before);
    }

    #[test]
    fn test_server_message_used_as_summary() {
        let state = ProgressConsumer::replay(&[
            started(1),
            entity_completed(1),
            StreamEvent::Completed { success_count: Some(1), failed_count: Some(0), message: Some("1 report ready".into()) },
        ])
        .into_state();
        assert_eq!(state.message.as_deref(), Some("1 report ready"));
    }
}

use std::sync::Arc;

use chrono::NaiveDate;
use futures::StreamExt;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use crate::client::{EventStream, GenerationBackend};
use crate::errors::ReportError;
use crate::models::{GenerationRequest, ProgressPhase, ProgressState, TargetOutcome};
use crate::request::build_request;
use crate::session::SelectionState;
use crate::stream::{ProgressConsumer, Step};
use super::mode::GenerationMode;
use tracing::{debug, info, warn};

pub const ACCEPTED_MESSAGE: &str = "Report generation accepted";
pub const ABANDONED_MESSAGE: &str =
    "Generation abandoned. Reports already queued on the server may still be produced.";

/// A validated submission, ready to be sent.
#[derive(Debug)]
pub struct PreparedGeneration {
    pub request: GenerationRequest,
    pub mode: GenerationMode,
    cancel_token: CancellationToken,
}

/// One view's generation lifecycle:
/// `Idle -> Validating -> {SingleRequestInFlight | Streaming} -> {Completed | Failed}`.
///
/// Only the task driving [`GenerationSession::run`] writes progress; everyone
/// else reads cloned snapshots.
pub struct GenerationSession {
    id: String,
    backend: Arc<dyn GenerationBackend>,
    state: Arc<RwLock<ProgressState>>,
    cancel_token: RwLock<CancellationToken>,
    event_tx: Option<mpsc::UnboundedSender<ProgressState>>,
}

impl GenerationSession {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            backend,
            state: Arc::new(RwLock::new(ProgressState::new())),
            cancel_token: RwLock::new(CancellationToken::new()),
            event_tx: None,
        }
    }

    /// Stream every published snapshot to a progress renderer.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<ProgressState>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn snapshot(&self) -> ProgressState {
        self.state.read().await.clone()
    }

    fn emit(&self, state: &ProgressState) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(state.clone());
        }
    }

    /// Validate the selection and claim the session.
    ///
    /// Fails with [`ReportError::Busy`] while a generation is in flight. A
    /// finished run is reset first. Validation failures leave the session idle
    /// and never reach the network.
    pub async fn prepare(
        &self,
        selection: &SelectionState,
        today: NaiveDate,
    ) -> Result<PreparedGeneration, ReportError> {
        let mut state = self.state.write().await;
        if state.phase.is_in_flight() {
            warn!(session = %self.id, phase = %state.phase, "Submission rejected while a generation is running");
            return Err(ReportError::Busy(format!("session {} is {}", self.id, state.phase)));
        }

        state.reset();
        state.phase = ProgressPhase::Validating;
        debug!(session = %self.id, scope = %selection.scope, "Validating selection");

        let request = match build_request(selection, today) {
            Ok(request) => request,
            Err(e) => {
                state.reset();
                info!(session = %self.id, error = %e, "Selection rejected");
                self.emit(&state);
                return Err(e);
            }
        };
        self.emit(&state);

        let cancel_token = CancellationToken::new();
        *self.cancel_token.write().await = cancel_token.clone();

        let mode = GenerationMode::for_target(request.target());
        info!(
            session = %self.id,
            %mode,
            template_id = request.template_id(),
            target = request.target().kind(),
            "Selection validated"
        );
        Ok(PreparedGeneration { request, mode, cancel_token })
    }

    /// Drive a prepared generation to a terminal state and return the final snapshot.
    pub async fn run(&self, prepared: PreparedGeneration) -> ProgressState {
        let PreparedGeneration { request, mode, cancel_token } = prepared;
        match mode {
            GenerationMode::Single => self.run_single(&request, &cancel_token).await,
            GenerationMode::Streaming { campaign_id } => {
                self.run_streaming(&campaign_id, &request, &cancel_token).await
            }
        }
        self.snapshot().await
    }

    /// Validate, then run the generation on a background task.
    pub async fn submit(
        self: &Arc<Self>,
        selection: &SelectionState,
        today: NaiveDate,
    ) -> Result<JoinHandle<ProgressState>, ReportError> {
        let prepared = self.prepare(selection, today).await?;
        let session = Arc::clone(self);
        Ok(tokio::spawn(async move { session.run(prepared).await }))
    }

    /// Validate and run to completion on the current task.
    pub async fn generate(
        &self,
        selection: &SelectionState,
        today: NaiveDate,
    ) -> Result<ProgressState, ReportError> {
        let prepared = self.prepare(selection, today).await?;
        Ok(self.run(prepared).await)
    }

    /// Dismiss the progress view. A no-op returning false while a generation is in flight.
    pub async fn close(&self) -> bool {
        let mut state = self.state.write().await;
        if state.phase.is_in_flight() {
            debug!(session = %self.id, phase = %state.phase, "Close ignored while in flight");
            return false;
        }
        state.reset();
        self.emit(&state);
        debug!(session = %self.id, "Progress view closed");
        true
    }

    /// Best-effort cancellation: drop the connection and mark the run failed.
    ///
    /// The server may keep generating reports it already accepted.
    pub async fn abandon(&self) {
        // `prepare` swaps the token under the state lock; take it first so the
        // token cancelled here is the one the next run will watch.
        let mut state = self.state.write().await;
        self.cancel_token.read().await.cancel();
        if state.phase.is_in_flight() {
            state.phase = ProgressPhase::Failed;
            state.message = Some(ABANDONED_MESSAGE.to_string());
            self.emit(&state);
            warn!(
                session = %self.id,
                processed = state.processed(),
                total = state.total_targets,
                "Generation abandoned"
            );
        }
    }

    /// Write a snapshot unless the run was abandoned in the meantime.
    async fn publish(&self, next: ProgressState, cancel_token: &CancellationToken) {
        let mut state = self.state.write().await;
        if cancel_token.is_cancelled() {
            return;
        }
        if state.phase != next.phase {
            debug!(session = %self.id, from = %state.phase, to = %next.phase, "Phase transition");
        }
        *state = next;
        self.emit(&state);
    }

    async fn run_single(&self, request: &GenerationRequest, cancel_token: &CancellationToken) {
        let name = request
            .target()
            .display_name()
            .unwrap_or(request.title())
            .to_string();
        let mut progress = ProgressState {
            phase: ProgressPhase::SingleRequestInFlight,
            total_targets: 1,
            current_index: 1,
            current_target_name: Some(name.clone()),
            ..Default::default()
        };
        self.publish(progress.clone(), cancel_token).await;
        info!(session = %self.id, backend = self.backend.backend_name(), target = %name, "Sending generation request");

        let result = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => return,
            result = self.backend.generate(request) => result,
        };

        match result {
            Ok(accepted) => {
                progress.phase = ProgressPhase::Completed;
                progress.success_count = 1;
                progress.outcomes.push(TargetOutcome { name, success: true, error: None });
                progress.message = Some(ACCEPTED_MESSAGE.to_string());
                info!(session = %self.id, report_id = ?accepted.report_id, "Report generation accepted");
            }
            Err(e) => {
                let message = e.user_message();
                progress.phase = ProgressPhase::Failed;
                progress.failed_count = 1;
                progress.outcomes.push(TargetOutcome { name, success: false, error: Some(message.clone()) });
                progress.message = Some(message);
                warn!(session = %self.id, error = %e, error_type = e.classify().error_type, "Report generation failed");
            }
        }
        self.publish(progress, cancel_token).await;
    }

    async fn run_streaming(&self, campaign_id: &str, request: &GenerationRequest, cancel_token: &CancellationToken) {
        info!(session = %self.id, backend = self.backend.backend_name(), campaign_id, "Starting bulk generation");
        let mut consumer = ProgressConsumer::new();

        let opened = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => return,
            opened = self.backend.open_bulk_stream(campaign_id, request) => opened,
        };
        let stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                warn!(session = %self.id, error = %e, "Could not open the progress stream");
                Self::absorb_stream_error(&mut consumer, e);
                self.publish(Self::streaming_snapshot(&consumer), cancel_token).await;
                return;
            }
        };

        self.consume(stream, &mut consumer, cancel_token).await;
        let final_state = consumer.into_state();
        info!(
            session = %self.id,
            phase = %final_state.phase,
            success = final_state.success_count,
            failed = final_state.failed_count,
            total = final_state.total_targets,
            "Bulk generation finished"
        );
    }

    async fn consume(&self, mut stream: EventStream, consumer: &mut ProgressConsumer, cancel_token: &CancellationToken) {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    debug!(session = %self.id, "Dropping progress stream after abandonment");
                    return;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(event)) => {
                    let step = consumer.apply(&event);
                    self.publish(Self::streaming_snapshot(consumer), cancel_token).await;
                    if step == Step::Terminal {
                        // Dropping the stream closes the connection.
                        return;
                    }
                }
                Some(Err(e)) => {
                    Self::absorb_stream_error(consumer, e);
                    self.publish(Self::streaming_snapshot(consumer), cancel_token).await;
                    return;
                }
                None => {
                    consumer.connection_lost(None);
                    self.publish(Self::streaming_snapshot(consumer), cancel_token).await;
                    return;
                }
            }
        }
    }

    fn absorb_stream_error(consumer: &mut ProgressConsumer, error: ReportError) {
        match error {
            ReportError::ConnectionLost(detail) => consumer.connection_lost(Some(&detail)),
            other => consumer.stream_failed(other.user_message()),
        }
    }

    /// The phase stays `Validating` until the server announces the run.
    fn streaming_snapshot(consumer: &ProgressConsumer) -> ProgressState {
        let mut snapshot = consumer.state().clone();
        if snapshot.phase == ProgressPhase::Idle {
            snapshot.phase = ProgressPhase::Validating;
        }
        snapshot
    }
}

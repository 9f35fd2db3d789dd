use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use crate::client::GenerationBackend;
use crate::dispatch::GenerationSession;
use tracing::{debug, info};

/// Live view sessions keyed by id. At most one generation runs per session.
pub struct SessionManager {
    backend: Arc<dyn GenerationBackend>,
    sessions: DashMap<String, TrackedSession>,
}

struct TrackedSession {
    session: Arc<GenerationSession>,
    last_seen: Instant,
}

pub struct SessionCounts {
    pub total: usize,
    pub in_flight: usize,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend, sessions: DashMap::new() }
    }

    pub fn create(&self) -> Arc<GenerationSession> {
        let session = Arc::new(GenerationSession::new(Arc::clone(&self.backend)));
        self.sessions.insert(
            session.id().to_string(),
            TrackedSession { session: Arc::clone(&session), last_seen: Instant::now() },
        );
        info!(session = %session.id(), "Session created");
        session
    }

    /// Look a session up and mark it as seen.
    pub fn get(&self, id: &str) -> Option<Arc<GenerationSession>> {
        self.sessions.get_mut(id).map(|mut entry| {
            entry.last_seen = Instant::now();
            Arc::clone(&entry.session)
        })
    }

    /// Abandon whatever the session is running and forget it.
    pub async fn remove(&self, id: &str) -> bool {
        let Some((_, tracked)) = self.sessions.remove(id) else {
            return false;
        };
        tracked.session.abandon().await;
        debug!(session = %id, "Session removed");
        true
    }

    pub async fn counts(&self) -> SessionCounts {
        let sessions: Vec<_> = self.sessions.iter().map(|e| Arc::clone(&e.session)).collect();
        let mut in_flight = 0;
        for session in &sessions {
            if session.snapshot().await.phase.is_in_flight() {
                in_flight += 1;
            }
        }
        SessionCounts { total: sessions.len(), in_flight }
    }

    /// Drop sessions nobody has looked at for `ttl`, measured at `now`.
    ///
    /// Sessions with a generation in flight are kept until the run ends.
    /// Returns how many were dropped.
    pub async fn reap_idle(&self, ttl: Duration, now: Instant) -> usize {
        let stale: Vec<(String, Arc<GenerationSession>)> = self
            .sessions
            .iter()
            .filter(|e| now.saturating_duration_since(e.last_seen) >= ttl)
            .map(|e| (e.key().clone(), Arc::clone(&e.session)))
            .collect();

        let mut reaped = 0;
        for (id, session) in stale {
            if session.snapshot().await.phase.is_in_flight() {
                continue;
            }
            // A request may have touched it since the scan.
            if self
                .sessions
                .remove_if(&id, |_, t| now.saturating_duration_since(t.last_seen) >= ttl)
                .is_some()
            {
                debug!(session = %id, "Idle session reaped");
                reaped += 1;
            }
        }
        if reaped > 0 {
            info!(reaped, remaining = self.sessions.len(), "Reaped idle sessions");
        }
        reaped
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::client::EventStream;
    use crate::errors::ReportError;
    use crate::models::{GenerationAccepted, GenerationRequest};

    struct NullBackend;

    #[async_trait]
    impl GenerationBackend for NullBackend {
        async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationAccepted, ReportError> {
            Ok(GenerationAccepted { accepted: true, report_id: None, message: None })
        }

        async fn open_bulk_stream(&self, _campaign_id: &str, _request: &GenerationRequest) -> Result<EventStream, ReportError> {
            Err(ReportError::Internal("no streams".into()))
        }

        fn backend_name(&self) -> &str {
            "null"
        }
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let manager = SessionManager::new(Arc::new(NullBackend));
        let session = manager.create();
        assert!(manager.get(session.id()).is_some());
        assert_eq!(manager.counts().await.in_flight, 0);

        assert!(manager.remove(session.id()).await);
        assert!(manager.get(session.id()).is_none());
        assert!(!manager.remove(session.id()).await);
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_reap_idle_sessions() {
        let manager = SessionManager::new(Arc::new(NullBackend));
        let ttl = Duration::from_secs(600);
        let forgotten = manager.create();
        let active = manager.create();

        assert_eq!(manager.reap_idle(ttl, Instant::now()).await, 0);
        assert_eq!(manager.len(), 2);

        let later = Instant::now() + ttl;
        manager.sessions.get_mut(active.id()).unwrap().last_seen = later;
        assert_eq!(manager.reap_idle(ttl, later).await, 1);
        assert!(manager.get(forgotten.id()).is_none());
        assert!(manager.get(active.id()).is_some());
    }

    #[tokio::test]
    async fn test_reap_keeps_in_flight_sessions() {
        use crate::models::{ReportScope, ReportTemplate, Target};
        use crate::session::SelectionState;

        let manager = SessionManager::new(Arc::new(NullBackend));
        let session = manager.create();
        let selection = SelectionState::new(ReportScope::Individual)
            .with_target(Target::Entity { id: "e-1".into(), name: None })
            .with_template(ReportTemplate {
                id: "t".into(),
                name: "t".into(),
                category: None,
                report_scope: ReportScope::Individual,
                structure: vec![],
                is_system: false,
                is_default: false,
            });
        let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let _prepared = session.prepare(&selection, today).await.unwrap();

        let ttl = Duration::from_secs(1);
        assert_eq!(manager.reap_idle(ttl, Instant::now() + ttl).await, 0);
        assert_eq!(manager.len(), 1);
    }
}

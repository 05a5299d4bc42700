use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use course_signup::workflows::signup::{
    NotifyError, SessionError, SessionId, SessionStore, SignupNotice, SignupNotifier,
    StudentRecord,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session storage: one record per session id.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    records: Arc<Mutex<HashMap<SessionId, StudentRecord>>>,
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session: &SessionId) -> Result<Option<StudentRecord>, SessionError> {
        let guard = self.records.lock().expect("session mutex poisoned");
        Ok(guard.get(session).cloned())
    }

    fn set(&self, session: &SessionId, record: StudentRecord) -> Result<(), SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        guard.insert(session.clone(), record);
        Ok(())
    }

    fn remove(&self, session: &SessionId) -> Result<(), SessionError> {
        let mut guard = self.records.lock().expect("session mutex poisoned");
        guard.remove(session);
        Ok(())
    }
}

/// Surfaces commit confirmations on the service log; the JSON response
/// carries the same message to the browser.
#[derive(Default, Clone)]
pub(crate) struct TracingNotifier;

impl SignupNotifier for TracingNotifier {
    fn publish(&self, notice: SignupNotice) -> Result<(), NotifyError> {
        info!(
            subject = %notice.enrollment.subject,
            topic = %notice.enrollment.topic,
            timeslot = %notice.enrollment.timeslot,
            "{}",
            notice.message
        );
        Ok(())
    }
}

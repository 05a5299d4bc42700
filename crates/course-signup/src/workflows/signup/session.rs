use serde::{Deserialize, Serialize};

use super::domain::{CourseEnrollment, SessionId, StudentRecord};

/// Message surfaced to the student after a successful commit.
pub const ADDED_MESSAGE: &str = "Successfully added";

/// Session storage collaborator holding at most one record per session.
///
/// The workflow performs one `get` and at most one `set` per request, so
/// implementations need no coordination beyond being shareable across the
/// server's worker threads.
pub trait SessionStore: Send + Sync {
    fn get(&self, session: &SessionId) -> Result<Option<StudentRecord>, SessionError>;
    fn set(&self, session: &SessionId, record: StudentRecord) -> Result<(), SessionError>;
    /// Removing an absent record is not an error.
    fn remove(&self, session: &SessionId) -> Result<(), SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook surfacing commit confirmations to the presentation layer.
pub trait SignupNotifier: Send + Sync {
    fn publish(&self, notice: SignupNotice) -> Result<(), NotifyError>;
}

/// Payload describing a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupNotice {
    pub message: String,
    pub enrollment: CourseEnrollment,
}

impl SignupNotice {
    pub fn added(enrollment: CourseEnrollment) -> Self {
        Self {
            message: ADDED_MESSAGE.to_string(),
            enrollment,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

//! Course signup workflow: cascading catalog selection, field and schedule
//! validation, and one session-scoped student record.
//!
//! The service facade composes three collaborators: the read-only
//! [`crate::catalog::CourseCatalog`], a [`SessionStore`] holding at most one
//! record per session, and a [`SignupNotifier`] surfacing commit
//! confirmations. The router exposes the workflow to the form/AJAX
//! collaborator as a JSON API.

pub mod domain;
pub mod router;
pub mod service;
pub mod session;
pub mod validation;

pub use domain::{
    CourseEnrollment, SessionId, SignupSubmission, StudentPreview, StudentRecord,
};
pub use router::signup_router;
pub use service::{SignupError, SignupRejection, SignupService};
pub use session::{
    NotifyError, SessionError, SessionStore, SignupNotice, SignupNotifier, ADDED_MESSAGE,
};
pub use validation::{FieldName, FormatRule, ValidationError};

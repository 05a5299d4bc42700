use std::fmt;
use std::sync::Arc;

use super::domain::{
    CourseEnrollment, SessionId, SignupSubmission, StudentPreview, StudentRecord,
};
use super::session::{NotifyError, SessionError, SessionStore, SignupNotice, SignupNotifier};
use super::validation::{self, ValidationError};
use crate::catalog::{CourseCatalog, OptionEntry};

/// Service composing the course catalog, session storage, and notifications.
pub struct SignupService<S, N> {
    catalog: Arc<CourseCatalog>,
    sessions: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> SignupService<S, N>
where
    S: SessionStore + 'static,
    N: SignupNotifier + 'static,
{
    pub fn new(catalog: Arc<CourseCatalog>, sessions: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            catalog,
            sessions,
            notifier,
        }
    }

    /// Option list for the subject select.
    pub fn subjects(&self) -> Vec<OptionEntry> {
        self.catalog.subjects()
    }

    /// Option list for the topic select, narrowed by the chosen subject. The
    /// presentation layer re-queries this whenever the subject changes, which
    /// implicitly resets the dependent selections.
    pub fn topics(&self, subject: &str) -> Vec<OptionEntry> {
        self.catalog.topics(subject)
    }

    /// Option list for the timeslot select, narrowed by subject and topic.
    pub fn timeslots(&self, subject: &str, topic: &str) -> Vec<OptionEntry> {
        self.catalog.timeslots(subject, topic)
    }

    /// Validate and commit one submission.
    ///
    /// The identity triple is taken wholesale from the submission, replacing
    /// whatever the session stored before, while `courses` is carried over
    /// with the new enrollment appended. A commit therefore always edits
    /// identity as well as adding a course; see DESIGN.md for why the
    /// overwrite is kept. On rejection nothing is mutated and nothing is
    /// published.
    pub fn submit(
        &self,
        session: &SessionId,
        submission: SignupSubmission,
    ) -> Result<StudentRecord, SignupError> {
        let field_errors = validation::check_fields(&submission);
        if !field_errors.is_empty() {
            return Err(SignupRejection {
                errors: field_errors,
            }
            .into());
        }

        let stored = self.sessions.get(session)?;

        let record_check = validation::check_selection(&self.catalog, &submission)
            .and_then(|()| validation::check_conflicts(stored.as_ref(), &submission.course_timeslot));
        if let Err(error) = record_check {
            return Err(SignupRejection {
                errors: vec![error],
            }
            .into());
        }

        let enrollment = CourseEnrollment {
            subject: submission.course_subject,
            topic: submission.course_topic,
            timeslot: submission.course_timeslot,
        };

        let mut courses = stored.map(|record| record.courses).unwrap_or_default();
        courses.push(enrollment.clone());

        let record = StudentRecord {
            username: submission.username,
            email: submission.email,
            student_id: submission.student_id,
            courses,
        };

        self.sessions.set(session, record.clone())?;
        self.notifier.publish(SignupNotice::added(enrollment))?;

        Ok(record)
    }

    /// The stored record rendered for display, earliest enrollment first, or
    /// `None` when the session holds no record yet.
    pub fn preview(&self, session: &SessionId) -> Result<Option<StudentPreview>, SignupError> {
        Ok(self.sessions.get(session)?.as_ref().map(StudentPreview::from))
    }

    /// Drop the session's record. Absence is not an error; the caller owns
    /// the follow-up refresh of its view.
    pub fn delete(&self, session: &SessionId) -> Result<(), SignupError> {
        self.sessions.remove(session)?;
        Ok(())
    }
}

/// A rejected submission, carrying every field-scoped failure.
#[derive(Debug)]
pub struct SignupRejection {
    pub errors: Vec<ValidationError>,
}

impl SignupRejection {
    fn describe(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for SignupRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "submission rejected: {}", self.describe())
    }
}

impl std::error::Error for SignupRejection {}

/// Error raised by the signup service.
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error(transparent)]
    Rejected(#[from] SignupRejection),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

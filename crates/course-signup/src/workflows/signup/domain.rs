use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier scoping one browser session's stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// One committed (subject, topic, timeslot) selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEnrollment {
    pub subject: String,
    pub topic: String,
    pub timeslot: String,
}

/// Session-scoped identity plus enrollment history for one student.
///
/// Enrollments keep insertion order; display ordering is a view concern, see
/// [`StudentRecord::courses_by_schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub username: String,
    pub email: String,
    pub student_id: String,
    pub courses: Vec<CourseEnrollment>,
}

impl StudentRecord {
    /// Enrollments ordered for the preview table, earliest timeslot first.
    ///
    /// Timeslots that do not parse as an instant, and exact ties, keep their
    /// original relative position. Sorting never fails.
    pub fn courses_by_schedule(&self) -> Vec<CourseEnrollment> {
        let mut ordered = self.courses.clone();
        ordered.sort_by(|a, b| {
            match (parse_timeslot(&a.timeslot), parse_timeslot(&b.timeslot)) {
                (Some(left), Some(right)) => left.cmp(&right),
                _ => Ordering::Equal,
            }
        });
        ordered
    }
}

/// Raw form values for one signup submission, all strings as posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupSubmission {
    pub username: String,
    pub email: String,
    pub student_id: String,
    pub course_subject: String,
    pub course_topic: String,
    pub course_timeslot: String,
}

/// The stored record as presented back to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentPreview {
    pub username: String,
    pub email: String,
    pub student_id: String,
    pub courses: Vec<CourseEnrollment>,
}

impl From<&StudentRecord> for StudentPreview {
    fn from(record: &StudentRecord) -> Self {
        Self {
            username: record.username.clone(),
            email: record.email.clone(),
            student_id: record.student_id.clone(),
            courses: record.courses_by_schedule(),
        }
    }
}

const TIMESLOT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

fn parse_timeslot(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in TIMESLOT_FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(instant);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

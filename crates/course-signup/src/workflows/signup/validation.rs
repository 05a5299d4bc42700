//! Field-level and record-level checks for signup submissions.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::domain::{SignupSubmission, StudentRecord};
use crate::catalog::CourseCatalog;

/// Form fields referenced by validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Username,
    Email,
    StudentId,
    CourseSubject,
    CourseTopic,
    CourseTimeslot,
}

impl FieldName {
    /// Machine name the form collaborator uses to annotate the field.
    pub const fn key(self) -> &'static str {
        match self {
            FieldName::Username => "username",
            FieldName::Email => "email",
            FieldName::StudentId => "student_id",
            FieldName::CourseSubject => "course_subject",
            FieldName::CourseTopic => "course_topic",
            FieldName::CourseTimeslot => "course_timeslot",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FieldName::Username => "Username",
            FieldName::Email => "Email",
            FieldName::StudentId => "Student ID",
            FieldName::CourseSubject => "Course Subject",
            FieldName::CourseTopic => "Course Topic",
            FieldName::CourseTimeslot => "Course Timeslot",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shape a field value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRule {
    Alphanumeric,
    Numeric,
    Email,
    /// The value must name an entry the course catalog actually offers.
    CatalogOption,
}

impl FormatRule {
    fn accepts(self, value: &str) -> bool {
        match self {
            FormatRule::Alphanumeric => alphanumeric_pattern().is_match(value),
            FormatRule::Numeric => numeric_pattern().is_match(value),
            FormatRule::Email => email_pattern().is_match(value),
            // Membership is checked against the catalog, not a pattern.
            FormatRule::CatalogOption => true,
        }
    }
}

impl fmt::Display for FormatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FormatRule::Alphanumeric => "should contain only alphanumeric characters",
            FormatRule::Numeric => "should contain only numeric characters",
            FormatRule::Email => "must be a valid email address",
            FormatRule::CatalogOption => "is not offered in the course catalog",
        };
        f.write_str(text)
    }
}

/// Field-scoped failures raised during validation. Every variant names the
/// form field it should be attached to, see [`ValidationError::field`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("the {0} field is required")]
    MissingRequired(FieldName),
    #[error("the {field} field {rule}")]
    InvalidFormat { field: FieldName, rule: FormatRule },
    #[error("{subject} {topic} {timeslot} has a conflict with your schedule")]
    ScheduleConflict {
        subject: String,
        topic: String,
        timeslot: String,
    },
}

impl ValidationError {
    pub fn field(&self) -> FieldName {
        match self {
            ValidationError::MissingRequired(field) => *field,
            ValidationError::InvalidFormat { field, .. } => *field,
            ValidationError::ScheduleConflict { .. } => FieldName::CourseTimeslot,
        }
    }
}

fn alphanumeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("alphanumeric pattern compiles"))
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("numeric pattern compiles"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"))
}

fn check_field(
    errors: &mut Vec<ValidationError>,
    field: FieldName,
    value: &str,
    rule: Option<FormatRule>,
) {
    if value.is_empty() {
        errors.push(ValidationError::MissingRequired(field));
        return;
    }
    if let Some(rule) = rule {
        if !rule.accepts(value) {
            errors.push(ValidationError::InvalidFormat { field, rule });
        }
    }
}

/// Run the independent field-level checks, collecting every failure so the
/// caller can annotate each offending field at once.
pub fn check_fields(submission: &SignupSubmission) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_field(
        &mut errors,
        FieldName::Username,
        &submission.username,
        Some(FormatRule::Alphanumeric),
    );
    check_field(
        &mut errors,
        FieldName::Email,
        &submission.email,
        Some(FormatRule::Email),
    );
    check_field(
        &mut errors,
        FieldName::StudentId,
        &submission.student_id,
        Some(FormatRule::Numeric),
    );
    check_field(&mut errors, FieldName::CourseSubject, &submission.course_subject, None);
    check_field(&mut errors, FieldName::CourseTopic, &submission.course_topic, None);
    check_field(
        &mut errors,
        FieldName::CourseTimeslot,
        &submission.course_timeslot,
        None,
    );

    errors
}

/// Reject selections that do not resolve against the catalog. Stored
/// enrollments are never re-validated; this runs at submission time only.
pub fn check_selection(
    catalog: &CourseCatalog,
    submission: &SignupSubmission,
) -> Result<(), ValidationError> {
    if !catalog.has_subject(&submission.course_subject) {
        return Err(ValidationError::InvalidFormat {
            field: FieldName::CourseSubject,
            rule: FormatRule::CatalogOption,
        });
    }
    if !catalog.has_topic(&submission.course_subject, &submission.course_topic) {
        return Err(ValidationError::InvalidFormat {
            field: FieldName::CourseTopic,
            rule: FormatRule::CatalogOption,
        });
    }
    if !catalog.offers_timeslot(
        &submission.course_subject,
        &submission.course_topic,
        &submission.course_timeslot,
    ) {
        return Err(ValidationError::InvalidFormat {
            field: FieldName::CourseTimeslot,
            rule: FormatRule::CatalogOption,
        });
    }
    Ok(())
}

/// Reject a timeslot already taken by a stored enrollment. The first conflict
/// in insertion order is reported; no record or no enrollments means no check.
pub fn check_conflicts(
    record: Option<&StudentRecord>,
    timeslot: &str,
) -> Result<(), ValidationError> {
    let Some(record) = record else {
        return Ok(());
    };

    for course in &record.courses {
        if course.timeslot == timeslot {
            return Err(ValidationError::ScheduleConflict {
                subject: course.subject.clone(),
                topic: course.topic.clone(),
                timeslot: course.timeslot.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::signup::domain::CourseEnrollment;

    fn submission() -> SignupSubmission {
        SignupSubmission {
            username: "ab12".to_string(),
            email: "a@b.com".to_string(),
            student_id: "42".to_string(),
            course_subject: "Mathematics".to_string(),
            course_topic: "Algebra".to_string(),
            course_timeslot: "2024-06-03 09:00".to_string(),
        }
    }

    #[test]
    fn clean_submission_passes_field_checks() {
        assert!(check_fields(&submission()).is_empty());
    }

    #[test]
    fn username_with_space_is_invalid() {
        let mut bad = submission();
        bad.username = "ab 12".to_string();
        let errors = check_fields(&bad);
        assert_eq!(
            errors,
            vec![ValidationError::InvalidFormat {
                field: FieldName::Username,
                rule: FormatRule::Alphanumeric,
            }]
        );
    }

    #[test]
    fn empty_fields_are_each_reported() {
        let bad = SignupSubmission {
            username: String::new(),
            email: String::new(),
            student_id: String::new(),
            course_subject: String::new(),
            course_topic: String::new(),
            course_timeslot: String::new(),
        };
        let errors = check_fields(&bad);
        assert_eq!(errors.len(), 6);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::MissingRequired(_))));
    }

    #[test]
    fn student_id_accepts_signed_and_decimal_numbers() {
        for value in ["42", "-3", "+7", "3.5", ".5", "10."] {
            let mut ok = submission();
            ok.student_id = value.to_string();
            assert!(check_fields(&ok).is_empty(), "{value} should be numeric");
        }
    }

    #[test]
    fn student_id_rejects_non_numbers() {
        for value in ["4a", "1e5", "nan", "--2", "3.1.4"] {
            let mut bad = submission();
            bad.student_id = value.to_string();
            let errors = check_fields(&bad);
            assert_eq!(errors.len(), 1, "{value} should be rejected");
            assert_eq!(errors[0].field(), FieldName::StudentId);
        }
    }

    #[test]
    fn email_requires_local_domain_and_dot() {
        for value in ["a@b.com", "first.last@example.co.uk"] {
            let mut ok = submission();
            ok.email = value.to_string();
            assert!(check_fields(&ok).is_empty(), "{value} should be accepted");
        }
        for value in ["a@b", "a b@c.com", "plainaddress", "a@@b.com"] {
            let mut bad = submission();
            bad.email = value.to_string();
            let errors = check_fields(&bad);
            assert_eq!(errors.len(), 1, "{value} should be rejected");
            assert_eq!(errors[0].field(), FieldName::Email);
        }
    }

    #[test]
    fn multiple_failures_collect_together() {
        let mut bad = submission();
        bad.username = "ab 12".to_string();
        bad.student_id = "4a".to_string();
        let errors = check_fields(&bad);
        let fields: Vec<FieldName> = errors.iter().map(ValidationError::field).collect();
        assert_eq!(fields, vec![FieldName::Username, FieldName::StudentId]);
    }

    #[test]
    fn conflict_reports_first_matching_enrollment() {
        let record = StudentRecord {
            username: "ab12".to_string(),
            email: "a@b.com".to_string(),
            student_id: "42".to_string(),
            courses: vec![
                CourseEnrollment {
                    subject: "Mathematics".to_string(),
                    topic: "Algebra".to_string(),
                    timeslot: "Mon 10:00".to_string(),
                },
                CourseEnrollment {
                    subject: "Science".to_string(),
                    topic: "Physics".to_string(),
                    timeslot: "Mon 10:00".to_string(),
                },
            ],
        };

        match check_conflicts(Some(&record), "Mon 10:00") {
            Err(ValidationError::ScheduleConflict { subject, topic, timeslot }) => {
                assert_eq!(subject, "Mathematics");
                assert_eq!(topic, "Algebra");
                assert_eq!(timeslot, "Mon 10:00");
            }
            other => panic!("expected schedule conflict, got {other:?}"),
        }
    }

    #[test]
    fn conflict_check_skipped_without_record() {
        assert!(check_conflicts(None, "Mon 10:00").is_ok());
    }

    #[test]
    fn conflict_errors_attach_to_the_timeslot_field() {
        let error = ValidationError::ScheduleConflict {
            subject: "Mathematics".to_string(),
            topic: "Algebra".to_string(),
            timeslot: "Mon 10:00".to_string(),
        };
        assert_eq!(error.field(), FieldName::CourseTimeslot);
        assert_eq!(
            error.to_string(),
            "Mathematics Algebra Mon 10:00 has a conflict with your schedule"
        );
    }
}

//! Static course catalog: subject → topic → timeslot lists.
//!
//! The catalog is read once from a JSON file whose shape mirrors the data the
//! feature has always shipped with: `{ subject: { topic: { "timeslot": [..] } } }`.
//! Source order is preserved so option lists render the way the file is
//! written. Lookups against unknown keys are permissive and produce a
//! sentinel-only list instead of an error; a catalog that cannot be read or
//! parsed is fatal at startup.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

/// Label of the placeholder entry prefixed to dependent option lists.
pub const SELECT_SENTINEL_LABEL: &str = "- Select -";

/// One `(key, label)` pair for a select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    pub key: String,
    pub label: String,
}

impl OptionEntry {
    fn item(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: key.to_string(),
        }
    }

    /// The `("", "- Select -")` placeholder shown before any choice is made.
    pub fn sentinel() -> Self {
        Self {
            key: String::new(),
            label: SELECT_SENTINEL_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct TopicEntry {
    name: String,
    timeslots: Vec<String>,
}

#[derive(Debug, Clone)]
struct SubjectEntry {
    name: String,
    topics: Vec<TopicEntry>,
}

/// The parsed catalog, immutable for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    subjects: Vec<SubjectEntry>,
}

impl CourseCatalog {
    /// Read and parse the catalog file. Any failure here means the signup
    /// feature cannot function and the caller should refuse to start.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|source| CatalogError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value = serde_json::from_reader(BufReader::new(file))?;
        Self::from_value(root)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let root: Value = serde_json::from_str(raw)?;
        Self::from_value(root)
    }

    fn from_value(root: Value) -> Result<Self, CatalogError> {
        let Value::Object(raw_subjects) = root else {
            return Err(CatalogError::NotAnObject);
        };

        let mut subjects = Vec::with_capacity(raw_subjects.len());
        for (subject, topics_value) in raw_subjects {
            let Value::Object(raw_topics) = topics_value else {
                return Err(CatalogError::InvalidSubject { subject });
            };

            let mut topics = Vec::with_capacity(raw_topics.len());
            for (topic, record) in raw_topics {
                let Some(Value::Array(entries)) = record.get("timeslot") else {
                    return Err(CatalogError::MissingTimeslots {
                        subject: subject.clone(),
                        topic,
                    });
                };

                let mut timeslots = Vec::with_capacity(entries.len());
                for entry in entries {
                    match entry {
                        Value::String(slot) => timeslots.push(slot.clone()),
                        _ => {
                            return Err(CatalogError::InvalidTimeslot {
                                subject: subject.clone(),
                                topic,
                            })
                        }
                    }
                }

                topics.push(TopicEntry {
                    name: topic,
                    timeslots,
                });
            }

            subjects.push(SubjectEntry {
                name: subject,
                topics,
            });
        }

        Ok(Self { subjects })
    }

    fn subject(&self, name: &str) -> Option<&SubjectEntry> {
        self.subjects.iter().find(|subject| subject.name == name)
    }

    fn topic(&self, subject: &str, topic: &str) -> Option<&TopicEntry> {
        self.subject(subject)?
            .topics
            .iter()
            .find(|entry| entry.name == topic)
    }

    /// Option list for the subject select, one entry per top-level key.
    pub fn subjects(&self) -> Vec<OptionEntry> {
        self.subjects
            .iter()
            .map(|subject| OptionEntry::item(&subject.name))
            .collect()
    }

    /// Topic options for a subject, sentinel first. Unknown subjects yield the
    /// sentinel alone.
    pub fn topics(&self, subject: &str) -> Vec<OptionEntry> {
        let mut options = vec![OptionEntry::sentinel()];
        if let Some(subject) = self.subject(subject) {
            options.extend(subject.topics.iter().map(|topic| OptionEntry::item(&topic.name)));
        }
        options
    }

    /// Timeslot options for a subject/topic pair, sentinel first. Unresolved
    /// pairs yield the sentinel alone.
    pub fn timeslots(&self, subject: &str, topic: &str) -> Vec<OptionEntry> {
        let mut options = vec![OptionEntry::sentinel()];
        if let Some(topic) = self.topic(subject, topic) {
            options.extend(topic.timeslots.iter().map(|slot| OptionEntry::item(slot)));
        }
        options
    }

    pub fn has_subject(&self, subject: &str) -> bool {
        self.subject(subject).is_some()
    }

    pub fn has_topic(&self, subject: &str, topic: &str) -> bool {
        self.topic(subject, topic).is_some()
    }

    pub fn offers_timeslot(&self, subject: &str, topic: &str, timeslot: &str) -> bool {
        self.topic(subject, topic)
            .map(|entry| entry.timeslots.iter().any(|slot| slot == timeslot))
            .unwrap_or(false)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read course catalog at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("course catalog is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("course catalog must be a JSON object keyed by subject")]
    NotAnObject,
    #[error("subject {subject:?} must map topic names to objects")]
    InvalidSubject { subject: String },
    #[error("topic {topic:?} under {subject:?} is missing its timeslot list")]
    MissingTimeslots { subject: String, topic: String },
    #[error("topic {topic:?} under {subject:?} has a non-string timeslot entry")]
    InvalidTimeslot { subject: String, topic: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Mathematics": {
            "Algebra": { "timeslot": ["2024-06-03 09:00", "2024-06-10 09:00"] },
            "Calculus": { "timeslot": ["2024-06-04 10:00"] }
        },
        "Science": {
            "Physics": { "timeslot": ["2024-06-03 11:00"] }
        }
    }"#;

    fn catalog() -> CourseCatalog {
        CourseCatalog::from_json(SAMPLE).expect("sample catalog parses")
    }

    #[test]
    fn subjects_follow_source_order() {
        let keys: Vec<String> = catalog()
            .subjects()
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        assert_eq!(keys, vec!["Mathematics", "Science"]);
    }

    #[test]
    fn subject_labels_equal_keys() {
        for entry in catalog().subjects() {
            assert_eq!(entry.key, entry.label);
        }
    }

    #[test]
    fn topics_are_sentinel_prefixed() {
        let options = catalog().topics("Mathematics");
        assert_eq!(options[0], OptionEntry::sentinel());
        let keys: Vec<&str> = options.iter().skip(1).map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["Algebra", "Calculus"]);
    }

    #[test]
    fn unknown_subject_yields_sentinel_only() {
        assert_eq!(catalog().topics("Astrology"), vec![OptionEntry::sentinel()]);
    }

    #[test]
    fn timeslots_preserve_source_order() {
        let options = catalog().timeslots("Mathematics", "Algebra");
        let keys: Vec<&str> = options.iter().skip(1).map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-06-03 09:00", "2024-06-10 09:00"]);
    }

    #[test]
    fn unresolved_pair_yields_sentinel_only() {
        let catalog = catalog();
        assert_eq!(
            catalog.timeslots("Mathematics", "Physics"),
            vec![OptionEntry::sentinel()]
        );
        assert_eq!(
            catalog.timeslots("Astrology", "Algebra"),
            vec![OptionEntry::sentinel()]
        );
    }

    #[test]
    fn membership_checks_resolve_the_hierarchy() {
        let catalog = catalog();
        assert!(catalog.has_subject("Science"));
        assert!(!catalog.has_subject("Astrology"));
        assert!(catalog.has_topic("Science", "Physics"));
        assert!(!catalog.has_topic("Science", "Algebra"));
        assert!(catalog.offers_timeslot("Science", "Physics", "2024-06-03 11:00"));
        assert!(!catalog.offers_timeslot("Science", "Physics", "2024-06-03 09:00"));
    }

    #[test]
    fn missing_timeslot_key_is_rejected() {
        let raw = r#"{ "Math": { "Algebra": { "slots": [] } } }"#;
        match CourseCatalog::from_json(raw) {
            Err(CatalogError::MissingTimeslots { subject, topic }) => {
                assert_eq!(subject, "Math");
                assert_eq!(topic, "Algebra");
            }
            other => panic!("expected missing timeslots, got {other:?}"),
        }
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(matches!(
            CourseCatalog::from_json("[1, 2]"),
            Err(CatalogError::NotAnObject)
        ));
    }
}

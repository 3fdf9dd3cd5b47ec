//! Subject-list reader.
//!
//! The list is a small CSV, one row per pipeline run: `subject_id` with an
//! optional `session_id` column. Blank lines and `#` comments are skipped.
//! IDs are normalized to the BIDS `sub-`/`ses-` prefix form so the rest of
//! the crate never has to guess which spelling the list used.
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SubjectListError {
    #[error("cannot read subject list: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed subject list: {0}")]
    Csv(#[from] csv::Error),

    #[error("subject list is empty: {path}")]
    Empty { path: String },

    #[error("line {line}: subject ID is empty")]
    EmptySubject { line: u64 },

    #[error("line {line}: invalid character in ID '{id}'")]
    InvalidId { line: u64, id: String },

    #[error("line {line}: duplicate entry for {subject}")]
    Duplicate { line: u64, subject: String },
}

/// One subject/session pair, IDs always in prefixed form (`sub-*`, `ses-*`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub subject: String,
    pub session: Option<String>,
}

impl Subject {
    pub fn new(subject: &str, session: Option<&str>) -> Self {
        Self {
            subject: with_prefix("sub-", subject),
            session: session.map(|s| with_prefix("ses-", s)),
        }
    }

    /// `sub-01` or `sub-01/ses-02`, the spelling used in logs and reports.
    pub fn label(&self) -> String {
        match &self.session {
            Some(ses) => format!("{}/{}", self.subject, ses),
            None => self.subject.clone(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn with_prefix(prefix: &str, id: &str) -> String {
    if id.starts_with(prefix) {
        id.to_string()
    } else {
        format!("{prefix}{id}")
    }
}

fn valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Deserialize)]
struct Row {
    subject: String,
    #[serde(default)]
    session: Option<String>,
}

/// Parse the subject list at `path`. Row order is preserved; duplicates and
/// malformed IDs fail the whole list rather than a single subject, since a
/// bad list is an operator error, not a data error.
pub fn read_subject_list(path: &Path) -> Result<Vec<Subject>, SubjectListError> {
    let file = std::fs::File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);

    let mut subjects = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: Row = record.deserialize(None)?;

        if row.subject.is_empty() {
            return Err(SubjectListError::EmptySubject { line });
        }
        if !valid_id(&row.subject) {
            return Err(SubjectListError::InvalidId {
                line,
                id: row.subject,
            });
        }
        let session = row.session.filter(|s| !s.is_empty());
        if let Some(ses) = &session {
            if !valid_id(ses) {
                return Err(SubjectListError::InvalidId {
                    line,
                    id: ses.clone(),
                });
            }
        }

        let subject = Subject::new(&row.subject, session.as_deref());
        if !seen.insert(subject.clone()) {
            return Err(SubjectListError::Duplicate {
                line,
                subject: subject.label(),
            });
        }
        subjects.push(subject);
    }

    if subjects.is_empty() {
        return Err(SubjectListError::Empty {
            path: path.display().to_string(),
        });
    }

    debug!("parsed {} subject(s) from {:?}", subjects.len(), path);
    Ok(subjects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn list(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_subject_and_session_columns() {
        let file = list("01,01\n02,01\n");
        let subjects = read_subject_list(file.path()).unwrap();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].subject, "sub-01");
        assert_eq!(subjects[0].session.as_deref(), Some("ses-01"));
        assert_eq!(subjects[1].label(), "sub-02/ses-01");
    }

    #[test]
    fn keeps_existing_prefixes() {
        let file = list("sub-control01,ses-baseline\n");
        let subjects = read_subject_list(file.path()).unwrap();
        assert_eq!(subjects[0].subject, "sub-control01");
        assert_eq!(subjects[0].session.as_deref(), Some("ses-baseline"));
    }

    #[test]
    fn session_column_is_optional() {
        let file = list("01\n02\n");
        let subjects = read_subject_list(file.path()).unwrap();
        assert_eq!(subjects[0].session, None);
        assert_eq!(subjects[1].label(), "sub-02");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let file = list("# cohort A\n01,01\n\n# cohort B\n02,01\n");
        let subjects = read_subject_list(file.path()).unwrap();
        assert_eq!(subjects.len(), 2);
    }

    #[test]
    fn rejects_duplicates_with_line_number() {
        let file = list("01,01\n02,01\n01,01\n");
        match read_subject_list(file.path()) {
            Err(SubjectListError::Duplicate { line, subject }) => {
                assert_eq!(line, 3);
                assert_eq!(subject, "sub-01/ses-01");
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn same_subject_different_session_is_not_a_duplicate() {
        let file = list("01,01\n01,02\n");
        let subjects = read_subject_list(file.path()).unwrap();
        assert_eq!(subjects.len(), 2);
    }

    #[test]
    fn rejects_ids_with_path_characters() {
        let file = list("../evil,01\n");
        assert!(matches!(
            read_subject_list(file.path()),
            Err(SubjectListError::InvalidId { line: 1, .. })
        ));
    }

    #[test]
    fn empty_list_is_an_error() {
        let file = list("# only comments\n");
        assert!(matches!(
            read_subject_list(file.path()),
            Err(SubjectListError::Empty { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = read_subject_list(Path::new("/nonexistent/subjects.csv"));
        assert!(matches!(result, Err(SubjectListError::Io(_))));
    }
}

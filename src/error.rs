//! Crate-level error type and `Result` alias for stable, structured error
//! handling. Converts underlying I/O, subject-list, and external-tool errors,
//! and provides semantic variants for input validation and stage failures.
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Stage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Subject list error: {0}")]
    SubjectList(#[from] crate::io::SubjectListError),

    #[error("External tool error: {0}")]
    Tool(#[from] crate::io::ToolError),

    #[error("Missing required input for {subject}: {path}")]
    MissingInput { subject: String, path: PathBuf },

    #[error("Stage {stage} completed but expected output is missing: {path}")]
    StageOutputMissing { stage: Stage, path: PathBuf },
}

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Streamline count must be greater than 0")]
    ZeroStreamlines,

    #[error("SIFT count {sift} exceeds streamline count {streamlines}")]
    SiftExceedsStreamlines { sift: u64, streamlines: u64 },

    #[error("Input directory does not exist: {path}")]
    MissingInputDir { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Subject list error: {0}")]
    SubjectList(#[from] dwiconn::io::SubjectListError),
}

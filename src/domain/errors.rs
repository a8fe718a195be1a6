use thiserror::Error;

/// Login failures. The `Display` text is shown as-is on the login view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Incorrect identifier or password")]
    Rejected { status: u16 },
    #[error("Login service unreachable: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Submit was requested with no file selected.
    #[error("Please select an image.")]
    Validation,
    #[error("An upload is already in progress.")]
    InFlight,
    /// The answer belongs to a selection that has since been replaced.
    #[error("Upload superseded by a newer selection.")]
    Superseded,
    #[error("Cannot use {path}: {reason}")]
    UnreadableFile { path: String, reason: String },
    /// Non-2xx answer or unreachable endpoint; carries the failure reason.
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("Feedback has already been sent for this result.")]
    AlreadySent,
    #[error("Feedback is already being sent.")]
    InFlight,
    #[error("Invalid score {0}, expected 1 to 4.")]
    InvalidScore(u8),
    #[error("{0}")]
    Transport(String),
}

/// Persistent client storage failures. Never shown to the user: a corrupted
/// session is treated as a logged-out one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Corrupted storage entry '{key}': {reason}")]
    Corrupted { key: String, reason: String },
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

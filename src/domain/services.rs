//! Boundaries to the outside world: the captioning backend and the
//! persistent client storage.
//!
//! Both are traits so that the session and workflow logic can be driven by
//! in-memory fakes in tests.

use super::errors::{AuthError, FeedbackError, StorageError, UploadError};
use super::models::{CaptionResult, FeedbackSubmission, ImagePreview};
use async_trait::async_trait;

/// Fixed locale sent with every upload.
pub const CAPTION_LOCALE: &str = "fr";

/// The auth, captioning and feedback backend.
#[async_trait]
pub trait CaptionApi: Send + Sync {
    /// Exchanges credentials for an access token.
    async fn login(&self, identifier: &str, secret: &str) -> Result<String, AuthError>;

    /// Uploads one image and returns its generated caption.
    async fn upload_image(&self, token: &str, image: &ImagePreview) -> Result<CaptionResult, UploadError>;

    /// Sends a rating for a previously captioned image.
    async fn send_feedback(&self, token: &str, submission: &FeedbackSubmission) -> Result<(), FeedbackError>;
}

/// Local string key/value storage that survives restarts.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

//! In-memory backend used by the application tests.

use crate::domain::{
    AuthError, CaptionApi, CaptionResult, FeedbackError, FeedbackSubmission, ImagePreview, UploadError,
};
use async_trait::async_trait;
use std::sync::Mutex;

/// Lets spawned tasks run until they block on something.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn png(name: &str) -> ImagePreview {
    ImagePreview::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

/// Records every call and answers with preset results.
pub struct FakeApi {
    login_result: Mutex<Result<String, AuthError>>,
    upload_result: Mutex<Result<CaptionResult, UploadError>>,
    feedback_result: Mutex<Result<(), FeedbackError>>,
    pub logins: Mutex<Vec<(String, String)>>,
    pub uploads: Mutex<Vec<(String, String)>>,
    pub feedbacks: Mutex<Vec<(String, FeedbackSubmission)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            login_result: Mutex::new(Ok("token-123".to_string())),
            upload_result: Mutex::new(Ok(CaptionResult::new("abc", "a dog"))),
            feedback_result: Mutex::new(Ok(())),
            logins: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            feedbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn set_login_result(&self, result: Result<String, AuthError>) {
        *self.login_result.lock().unwrap() = result;
    }

    pub fn set_upload_result(&self, result: Result<CaptionResult, UploadError>) {
        *self.upload_result.lock().unwrap() = result;
    }

    pub fn set_feedback_result(&self, result: Result<(), FeedbackError>) {
        *self.feedback_result.lock().unwrap() = result;
    }

    pub fn login_count(&self) -> usize {
        self.logins.lock().unwrap().len()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn feedback_count(&self) -> usize {
        self.feedbacks.lock().unwrap().len()
    }
}

#[async_trait]
impl CaptionApi for FakeApi {
    async fn login(&self, identifier: &str, secret: &str) -> Result<String, AuthError> {
        self.logins
            .lock()
            .unwrap()
            .push((identifier.to_string(), secret.to_string()));
        self.login_result.lock().unwrap().clone()
    }

    async fn upload_image(&self, token: &str, image: &ImagePreview) -> Result<CaptionResult, UploadError> {
        self.uploads
            .lock()
            .unwrap()
            .push((token.to_string(), image.file_name().to_string()));
        self.upload_result.lock().unwrap().clone()
    }

    async fn send_feedback(&self, token: &str, submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
        self.feedbacks
            .lock()
            .unwrap()
            .push((token.to_string(), submission.clone()));
        self.feedback_result.lock().unwrap().clone()
    }
}

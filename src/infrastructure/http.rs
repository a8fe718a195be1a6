//! reqwest client for the captioning backend.

use crate::domain::{
    AuthError, CAPTION_LOCALE, CaptionApi, CaptionResult, FeedbackError, FeedbackSubmission, ImagePreview,
    UploadError,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

pub struct HttpCaptionApi {
    client: Client,
    base_url: String,
}

impl HttpCaptionApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Extracts a readable reason from a failed response body.
///
/// The backend answers errors as `{"detail": "..."}`; other bodies are used
/// verbatim and an empty body falls back to the status line.
fn failure_reason(status: StatusCode, body: &str) -> String {
    if let Ok(error) = serde_json::from_str::<ErrorDetail>(body) {
        return error.detail;
    }
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}

async fn read_failure(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    failure_reason(status, &body)
}

#[async_trait]
impl CaptionApi for HttpCaptionApi {
    async fn login(&self, identifier: &str, secret: &str) -> Result<String, AuthError> {
        debug!(identifier, "Requesting access token");
        let response = self
            .client
            .post(self.endpoint("login"))
            .form(&[("username", identifier), ("password", secret)])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Login rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("Invalid login response: {}", e)))?;
        Ok(body.access_token)
    }

    async fn upload_image(&self, token: &str, image: &ImagePreview) -> Result<CaptionResult, UploadError> {
        debug!(file = image.file_name(), size = image.size(), "Uploading image");
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.mime())
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part).text("lang", CAPTION_LOCALE);

        let response = self
            .client
            .post(self.endpoint("upload_image"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let reason = read_failure(response).await;
            warn!(%reason, "Upload rejected");
            return Err(UploadError::Transport(reason));
        }

        response
            .json::<CaptionResult>()
            .await
            .map_err(|e| UploadError::Transport(format!("Invalid caption response: {}", e)))
    }

    async fn send_feedback(&self, token: &str, submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
        debug!(result_id = %submission.result_id, score = submission.score.value(), "Sending feedback");
        let response = self
            .client
            .post(self.endpoint("send_feedback"))
            .bearer_auth(token)
            .json(submission)
            .send()
            .await
            .map_err(|e| FeedbackError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let reason = read_failure(response).await;
            warn!(%reason, "Feedback rejected");
            return Err(FeedbackError::Transport(reason));
        }

        let ack: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FeedbackError::Transport(format!("Invalid feedback response: {}", e)))?;
        debug!(%ack, "Feedback acknowledged");
        Ok(())
    }
}

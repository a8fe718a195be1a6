//! Upload workflow: choose an image, send it for captioning, hand the result
//! over to the result view.

use crate::domain::{CaptionApi, CaptionResult, ImagePreview, UploadError, WorkflowPayload};
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Prefix of the message shown when an upload fails.
pub const UPLOAD_FAILED_PREFIX: &str = "Upload failed: ";

/// Upload lifecycle.
///
/// A successful upload hands its payload to the navigation and resets the
/// coordinator to `Idle`, so there is no lasting success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    FileSelected,
    Submitting,
    Failed,
}

/// One in-flight upload. `cancel` fires when the selection it was made for is
/// replaced.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub generation: u64,
    pub image: ImagePreview,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
pub struct UploadCoordinator {
    state: UploadState,
    image: Option<ImagePreview>,
    error: Option<String>,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl Default for UploadCoordinator {
    fn default() -> Self {
        Self {
            state: UploadState::Idle,
            image: None,
            error: None,
            generation: 0,
            in_flight: None,
        }
    }
}

impl UploadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn image(&self) -> Option<&ImagePreview> {
        self.image.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.state != UploadState::Submitting
    }

    /// Reads an image file from disk and makes it the current selection.
    ///
    /// A file that cannot be read or is not an image is reported through
    /// [`error`](Self::error) and leaves the current selection in place.
    pub fn select_file(&mut self, path: &Path) -> Result<(), UploadError> {
        match load_image(path) {
            Ok(image) => {
                self.select_image(image);
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Rejected image selection");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replaces the current selection, from any state.
    ///
    /// An upload still in flight for the previous selection is cancelled and
    /// its answer, should it arrive, is discarded.
    pub fn select_image(&mut self, image: ImagePreview) {
        if let Some(cancel) = self.in_flight.take() {
            debug!(generation = self.generation, "Superseding in-flight upload");
            cancel.cancel();
        }
        debug!(file = image.file_name(), "Image selected");
        self.generation += 1;
        self.image = Some(image);
        self.error = None;
        self.state = UploadState::FileSelected;
    }

    /// Moves to `Submitting` and returns what needs to be sent.
    ///
    /// Without a selected file this fails with [`UploadError::Validation`]
    /// and changes nothing; while an upload is in flight it fails with
    /// [`UploadError::InFlight`].
    pub fn begin_submit(&mut self) -> Result<UploadTicket, UploadError> {
        if self.state == UploadState::Submitting {
            return Err(UploadError::InFlight);
        }
        let Some(image) = self.image.clone() else {
            let e = UploadError::Validation;
            self.error = Some(e.to_string());
            return Err(e);
        };

        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.error = None;
        self.state = UploadState::Submitting;
        info!(file = image.file_name(), generation = self.generation, "Submitting image");

        Ok(UploadTicket {
            generation: self.generation,
            image,
            cancel,
        })
    }

    /// Applies the answer for the upload started with `generation`.
    ///
    /// Success yields the payload for the result view and resets the
    /// coordinator. Failure records a message and keeps the selection for a
    /// retry. An answer for a superseded selection changes nothing.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<CaptionResult, UploadError>,
    ) -> Result<WorkflowPayload, UploadError> {
        if generation != self.generation || self.state != UploadState::Submitting {
            debug!(generation, current = self.generation, "Discarding stale upload answer");
            return Err(UploadError::Superseded);
        }
        self.in_flight = None;

        match result {
            Ok(caption_result) => {
                let Some(image_preview) = self.image.take() else {
                    self.state = UploadState::Idle;
                    return Err(UploadError::Validation);
                };
                info!(result_id = %caption_result.result_id, "Caption received");
                *self = Self {
                    generation: self.generation,
                    ..Self::default()
                };
                Ok(WorkflowPayload {
                    caption_result,
                    image_preview,
                })
            }
            Err(e) => {
                warn!(error = %e, "Upload failed");
                self.error = Some(format!("{}{}", UPLOAD_FAILED_PREFIX, e));
                self.state = UploadState::Failed;
                Err(e)
            }
        }
    }

    /// Sends the current selection and waits for the answer.
    ///
    /// Inline form of [`begin_submit`](Self::begin_submit) followed by
    /// [`complete`](Self::complete). [`App`](crate::application::App) runs
    /// the request as a view-scoped task instead, so a new selection can
    /// cancel it.
    pub async fn submit(&mut self, api: &dyn CaptionApi, token: &str) -> Result<WorkflowPayload, UploadError> {
        let ticket = self.begin_submit()?;
        let result = api.upload_image(token, &ticket.image).await;
        self.complete(ticket.generation, result)
    }
}

fn load_image(path: &Path) -> Result<ImagePreview, UploadError> {
    let unreadable = |reason: String| UploadError::UnreadableFile {
        path: path.display().to_string(),
        reason,
    };

    let mime = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .filter(|m| m.starts_with("image/"))
        .ok_or_else(|| unreadable("not an image file".to_string()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| unreadable("no file name".to_string()))?;
    let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;

    Ok(ImagePreview::new(file_name, mime, bytes))
}

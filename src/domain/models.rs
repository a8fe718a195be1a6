use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity shown for the logged-in user.
///
/// Persisted as `{"name": ...}` so a stored session stays readable by other
/// clients of the same backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "name")]
    pub display_name: String,
}

/// The client's record of being authenticated.
///
/// Token and identity are always present together; an absent session is
/// modelled as `Option<Session>` by its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

impl Session {
    pub fn new(token: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            identity: Identity {
                display_name: display_name.into(),
            },
        }
    }
}

/// Identifier of a captioned image.
///
/// The backend may answer with either a string or an integer; the id is sent
/// back in the same JSON shape it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultId::Number(n) => write!(f, "{}", n),
            ResultId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ResultId {
    fn from(value: &str) -> Self {
        ResultId::Text(value.to_string())
    }
}

impl From<i64> for ResultId {
    fn from(value: i64) -> Self {
        ResultId::Number(value)
    }
}

/// Response of the captioning endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaptionResult {
    #[serde(rename = "id_image")]
    pub result_id: ResultId,
    #[serde(rename = "resultat_pred")]
    pub caption_text: String,
    #[serde(default, rename = "id_prediction")]
    pub prediction_id: Option<ResultId>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "confiance_pred")]
    pub confidence: Option<f64>,
}

impl CaptionResult {
    pub fn new(result_id: impl Into<ResultId>, caption_text: impl Into<String>) -> Self {
        Self {
            result_id: result_id.into(),
            caption_text: caption_text.into(),
            prediction_id: None,
            message: None,
            confidence: None,
        }
    }
}

/// In-memory handle on a selected image, used both for display and upload.
///
/// Cloning shares the underlying bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePreview {
    file_name: String,
    mime: String,
    bytes: Arc<[u8]>,
}

impl ImagePreview {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// One-line description for the preview panes, e.g. `dog.png (image/png, 1.5 KiB)`.
    pub fn summary(&self) -> String {
        format!("{} ({}, {})", self.file_name, self.mime, human_size(self.size()))
    }
}

impl fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePreview")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

fn human_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

/// Data carried from the upload step to the result step.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowPayload {
    pub caption_result: CaptionResult,
    pub image_preview: ImagePreview,
}

/// A caption rating between 1 (bad) and 4 (excellent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Score(value))
    }

    /// All valid scores, in display order.
    pub fn all() -> [Score; 4] {
        [Score(1), Score(2), Score(3), Score(4)]
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Bad",
            2 => "Average",
            3 => "Good",
            _ => "Excellent",
        }
    }
}

/// Rating sent for one caption result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSubmission {
    #[serde(rename = "id_image")]
    pub result_id: ResultId,
    #[serde(rename = "feedback")]
    pub score: Score,
}

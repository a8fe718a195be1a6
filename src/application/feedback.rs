use crate::domain::{CaptionApi, FeedbackError, FeedbackSubmission, ResultId, Score};
use tracing::{debug, info, warn};

/// Acknowledgement shown under the rating controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAck {
    Saved,
    Failed,
}

impl FeedbackAck {
    pub fn message(self) -> &'static str {
        match self {
            FeedbackAck::Saved => "Feedback saved!",
            FeedbackAck::Failed => "Error while sending feedback.",
        }
    }
}

/// Rating workflow for one result view.
///
/// At most one rating is accepted per instance. The `sent` flag is checked
/// before any request is made; it is a client-side guarantee only, the
/// backend does not deduplicate.
#[derive(Debug)]
pub struct FeedbackCoordinator {
    result_id: ResultId,
    sent: bool,
    in_flight: bool,
    ack: Option<FeedbackAck>,
}

impl FeedbackCoordinator {
    pub fn new(result_id: ResultId) -> Self {
        Self {
            result_id,
            sent: false,
            in_flight: false,
            ack: None,
        }
    }

    pub fn result_id(&self) -> &ResultId {
        &self.result_id
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn ack(&self) -> Option<FeedbackAck> {
        self.ack
    }

    /// Whether the four rating controls accept input.
    pub fn controls_enabled(&self) -> bool {
        !self.sent && !self.in_flight
    }

    /// Validates `score` and marks a request as in flight.
    ///
    /// Rejected locally, without any request, once a rating was accepted or
    /// while one is being sent.
    pub fn begin_submit(&mut self, score: u8) -> Result<FeedbackSubmission, FeedbackError> {
        if self.sent {
            debug!(result_id = %self.result_id, "Feedback already sent, ignoring");
            return Err(FeedbackError::AlreadySent);
        }
        if self.in_flight {
            return Err(FeedbackError::InFlight);
        }
        let score = Score::new(score).ok_or(FeedbackError::InvalidScore(score))?;

        self.in_flight = true;
        Ok(FeedbackSubmission {
            result_id: self.result_id.clone(),
            score,
        })
    }

    pub fn complete(&mut self, result: Result<(), FeedbackError>) -> Result<(), FeedbackError> {
        self.in_flight = false;
        match result {
            Ok(()) => {
                info!(result_id = %self.result_id, "Feedback saved");
                self.sent = true;
                self.ack = Some(FeedbackAck::Saved);
                Ok(())
            }
            Err(e) => {
                warn!(result_id = %self.result_id, error = %e, "Feedback failed");
                self.ack = Some(FeedbackAck::Failed);
                Err(e)
            }
        }
    }

    /// Sends one rating and waits for the answer.
    ///
    /// Inline form of [`begin_submit`](Self::begin_submit) followed by
    /// [`complete`](Self::complete); [`App`](crate::application::App) runs
    /// the request as a view-scoped task.
    pub async fn submit(&mut self, api: &dyn CaptionApi, token: &str, score: u8) -> Result<(), FeedbackError> {
        let submission = self.begin_submit(score)?;
        let result = api.send_feedback(token, &submission).await;
        self.complete(result)
    }
}

//! Navigation between the three views and the payload handed from the
//! upload view to the result view.
//!
//! The payload only exists inside a [`Navigation::Result`] transition and is
//! moved into the [`ResultView`] it creates; it is never stored anywhere else
//! and does not survive leaving that view.

use super::feedback::FeedbackCoordinator;
use crate::domain::WorkflowPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Upload,
    Result,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Login, Route::Upload, Route::Result];

    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Home",
            Route::Upload => "Upload",
            Route::Result => "Result",
        }
    }

    /// Direct navigation; only the upload workflow attaches a payload.
    pub fn navigation(self) -> Navigation {
        match self {
            Route::Login => Navigation::Login,
            Route::Upload => Navigation::Upload,
            Route::Result => Navigation::Result(None),
        }
    }
}

/// A one-shot transition request.
#[derive(Debug)]
pub enum Navigation {
    Login,
    Upload,
    Result(Option<WorkflowPayload>),
}

impl Navigation {
    pub fn route(&self) -> Route {
        match self {
            Navigation::Login => Route::Login,
            Navigation::Upload => Route::Upload,
            Navigation::Result(_) => Route::Result,
        }
    }
}

/// Content of a result view instance.
#[derive(Debug)]
pub enum ResultView {
    /// Entered without a payload, e.g. straight from the navbar.
    Empty,
    Loaded {
        payload: WorkflowPayload,
        feedback: FeedbackCoordinator,
    },
}

impl ResultView {
    pub fn enter(payload: Option<WorkflowPayload>) -> Self {
        match payload {
            Some(payload) => {
                let feedback = FeedbackCoordinator::new(payload.caption_result.result_id.clone());
                ResultView::Loaded { payload, feedback }
            }
            None => ResultView::Empty,
        }
    }

    pub fn payload(&self) -> Option<&WorkflowPayload> {
        match self {
            ResultView::Loaded { payload, .. } => Some(payload),
            ResultView::Empty => None,
        }
    }

    pub fn feedback(&self) -> Option<&FeedbackCoordinator> {
        match self {
            ResultView::Loaded { feedback, .. } => Some(feedback),
            ResultView::Empty => None,
        }
    }

    pub fn feedback_mut(&mut self) -> Option<&mut FeedbackCoordinator> {
        match self {
            ResultView::Loaded { feedback, .. } => Some(feedback),
            ResultView::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::png;
    use crate::domain::{CaptionResult, ResultId};

    #[test]
    fn test_enter_without_payload_is_empty() {
        let view = ResultView::enter(None);
        assert!(matches!(view, ResultView::Empty));
        assert!(view.payload().is_none());
        assert!(view.feedback().is_none());
    }

    #[test]
    fn test_enter_with_payload_binds_feedback_to_result() {
        let payload = WorkflowPayload {
            caption_result: CaptionResult::new("abc", "a dog"),
            image_preview: png("dog.png"),
        };

        let view = ResultView::enter(Some(payload));

        assert_eq!(view.payload().unwrap().caption_result.caption_text, "a dog");
        let feedback = view.feedback().unwrap();
        assert_eq!(feedback.result_id(), &ResultId::from("abc"));
        assert!(feedback.controls_enabled());
    }

    #[test]
    fn test_direct_navigation_carries_no_payload() {
        assert!(matches!(Route::Result.navigation(), Navigation::Result(None)));
        for route in Route::ALL {
            assert_eq!(route.navigation().route(), route);
        }
    }
}

//! Scoped asynchronous work.
//!
//! Every view instance owns a [`ViewScope`]. Tasks spawned through the
//! [`TaskRunner`] are tied to a scope and stop as soon as the scope is
//! dropped, so a late network answer or timer can never act on a view the
//! user already left. Completions come back as [`AppEvent`]s over a channel
//! and are applied by the application state on the UI loop.

use crate::domain::{AuthError, CaptionResult, FeedbackError, UploadError};
use std::future::Future;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

/// Identifies one view instance; a new id is issued on every navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// Lifetime of one view instance. Dropping it cancels its tasks.
pub struct ViewScope {
    id: ViewId,
    token: CancellationToken,
    _cancel_on_drop: DropGuard,
}

impl ViewScope {
    pub fn new(id: ViewId) -> Self {
        let token = CancellationToken::new();
        Self {
            id,
            _cancel_on_drop: token.clone().drop_guard(),
            token,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// A token cancelled with this scope, or earlier if cancelled directly.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Completion of asynchronous work, tagged with the view that started it.
#[derive(Debug)]
pub enum AppEvent {
    LoginFinished {
        view: ViewId,
        identifier: String,
        result: Result<String, AuthError>,
    },
    UploadFinished {
        view: ViewId,
        generation: u64,
        result: Result<CaptionResult, UploadError>,
    },
    FeedbackFinished {
        view: ViewId,
        result: Result<(), FeedbackError>,
    },
    RedirectElapsed {
        view: ViewId,
    },
}

impl AppEvent {
    pub fn view(&self) -> ViewId {
        match self {
            AppEvent::LoginFinished { view, .. }
            | AppEvent::UploadFinished { view, .. }
            | AppEvent::FeedbackFinished { view, .. }
            | AppEvent::RedirectElapsed { view } => *view,
        }
    }
}

#[derive(Clone)]
pub struct TaskRunner {
    events: UnboundedSender<AppEvent>,
}

impl TaskRunner {
    pub fn new() -> (Self, UnboundedReceiver<AppEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { events }, receiver)
    }

    /// Runs `task` until it completes or `cancel` fires; only a completed
    /// task delivers its event.
    pub fn spawn<F>(&self, cancel: CancellationToken, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => debug!("Task cancelled before completion"),
                event = task => {
                    // The receiver only goes away when the UI loop has exited.
                    let _ = events.send(event);
                }
            }
        });
    }
}

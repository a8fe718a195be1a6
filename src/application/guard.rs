use super::session::SessionStore;
use super::tasks::{AppEvent, TaskRunner, ViewScope};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::info;

/// Access decision taken when a protected view is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Authorized,
    /// No session: the view shows a notice and a redirect to the login view
    /// is pending in the view's scope.
    Redirecting,
}

impl Guard {
    /// Checks the session once and, without a token, schedules a single
    /// redirect `delay` from now.
    ///
    /// The redirect belongs to `scope` and is cancelled if the view is left
    /// before it fires. The check is not repeated while the view stays open.
    pub fn enter(session: &SessionStore, scope: &ViewScope, runner: &TaskRunner, delay: Duration) -> Self {
        if session.current_token().is_some() {
            return Guard::Authorized;
        }

        info!(view = scope.id().0, delay_ms = delay.as_millis() as u64, "Not authorized, redirecting to login");
        let deadline = Instant::now() + delay;
        let view = scope.id();
        runner.spawn(scope.child_token(), async move {
            sleep_until(deadline).await;
            AppEvent::RedirectElapsed { view }
        });
        Guard::Redirecting
    }

    pub fn is_authorized(self) -> bool {
        self == Guard::Authorized
    }
}

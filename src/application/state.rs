//! Application state management for the captioning client.
//!
//! [`App`] owns the session store and the current view. Every navigation
//! creates a fresh view instance with its own [`ViewScope`]; the previous
//! instance is dropped, which cancels its pending work. Results of
//! asynchronous work arrive through [`App::handle_event`] and are ignored
//! unless they belong to the view that is still on screen.

use super::feedback::FeedbackCoordinator;
use super::guard::Guard;
use super::session::SessionStore;
use super::tasks::{AppEvent, TaskRunner, ViewId, ViewScope};
use super::upload::UploadCoordinator;
use super::workflow::{Navigation, ResultView, Route};
use crate::domain::{AuthError, CaptionApi, CaptionResult, FeedbackError, UploadError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Input field of the login form that receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Identifier,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub identifier: String,
    pub secret: String,
    pub focus: LoginField,
    pub error: Option<String>,
    /// A login request is in flight.
    pub pending: bool,
}

impl LoginForm {
    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            LoginField::Identifier => &mut self.identifier,
            LoginField::Password => &mut self.secret,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Identifier => LoginField::Password,
            LoginField::Password => LoginField::Identifier,
        };
    }
}

/// The view currently on screen, with its view-local state.
#[derive(Debug)]
pub enum ViewState {
    Login(LoginForm),
    Upload {
        guard: Guard,
        upload: UploadCoordinator,
        /// Path typed by the user, applied with [`App::choose_file`].
        path_input: String,
    },
    Result {
        guard: Guard,
        result: ResultView,
    },
}

impl ViewState {
    pub fn route(&self) -> Route {
        match self {
            ViewState::Login(_) => Route::Login,
            ViewState::Upload { .. } => Route::Upload,
            ViewState::Result { .. } => Route::Result,
        }
    }
}

pub struct App {
    session: SessionStore,
    api: Arc<dyn CaptionApi>,
    runner: TaskRunner,
    redirect_delay: Duration,
    scope: ViewScope,
    view: ViewState,
    next_view: u64,
    /// Set when the user asked to leave the application.
    pub should_quit: bool,
}

impl App {
    /// Starts on the login view. `session` should already be restored.
    pub fn new(session: SessionStore, api: Arc<dyn CaptionApi>, runner: TaskRunner, redirect_delay: Duration) -> Self {
        Self {
            session,
            api,
            runner,
            redirect_delay,
            scope: ViewScope::new(ViewId(0)),
            view: ViewState::Login(LoginForm::default()),
            next_view: 0,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_id(&self) -> ViewId {
        self.scope.id()
    }

    pub fn route(&self) -> Route {
        self.view.route()
    }

    /// Leaves the current view and enters a new instance of the target one.
    pub fn navigate(&mut self, navigation: Navigation) {
        self.next_view += 1;
        // Replacing the scope cancels every task of the view being left.
        self.scope = ViewScope::new(ViewId(self.next_view));

        let delay = self.redirect_delay;
        let route = navigation.route();
        self.view = match navigation {
            Navigation::Login => ViewState::Login(LoginForm::default()),
            Navigation::Upload => ViewState::Upload {
                guard: Guard::enter(&self.session, &self.scope, &self.runner, delay),
                upload: UploadCoordinator::new(),
                path_input: String::new(),
            },
            Navigation::Result(payload) => ViewState::Result {
                guard: Guard::enter(&self.session, &self.scope, &self.runner, delay),
                result: ResultView::enter(payload),
            },
        };
        info!(?route, view = self.next_view, "Entered view");
    }

    pub fn go_to(&mut self, route: Route) {
        self.navigate(route.navigation());
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.navigate(Navigation::Login);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Types into the active text field, if the view has one.
    pub fn insert_char(&mut self, c: char) {
        match &mut self.view {
            ViewState::Login(form) if !form.pending => form.focused_input().push(c),
            ViewState::Upload {
                guard: Guard::Authorized,
                path_input,
                ..
            } => path_input.push(c),
            _ => {}
        }
    }

    pub fn delete_char(&mut self) {
        match &mut self.view {
            ViewState::Login(form) if !form.pending => {
                form.focused_input().pop();
            }
            ViewState::Upload {
                guard: Guard::Authorized,
                path_input,
                ..
            } => {
                path_input.pop();
            }
            _ => {}
        }
    }

    pub fn toggle_login_focus(&mut self) {
        if let ViewState::Login(form) = &mut self.view {
            form.toggle_focus();
        }
    }

    /// Sends the login form. Ignored while a login is pending or when a
    /// session already exists.
    pub fn submit_login(&mut self) {
        if self.session.is_authenticated() {
            return;
        }
        let ViewState::Login(form) = &mut self.view else {
            return;
        };
        if form.pending {
            return;
        }
        form.pending = true;
        form.error = None;

        let identifier = form.identifier.trim().to_string();
        let secret = form.secret.clone();
        let api = Arc::clone(&self.api);
        let view = self.scope.id();
        self.runner.spawn(self.scope.child_token(), async move {
            let result = api.login(&identifier, &secret).await;
            AppEvent::LoginFinished { view, identifier, result }
        });
    }

    /// Selects the image at the typed path.
    pub fn choose_file(&mut self) {
        let ViewState::Upload {
            guard: Guard::Authorized,
            upload,
            path_input,
        } = &mut self.view
        else {
            return;
        };
        // Errors are kept on the coordinator for display.
        let _ = upload.select_file(Path::new(path_input.trim()));
    }

    /// Submits the selected image for captioning.
    pub fn submit_upload(&mut self) {
        let ViewState::Upload {
            guard: Guard::Authorized,
            upload,
            ..
        } = &mut self.view
        else {
            return;
        };
        let Some(token) = self.session.current_token().map(str::to_owned) else {
            return;
        };
        let Ok(ticket) = upload.begin_submit() else {
            return;
        };

        let api = Arc::clone(&self.api);
        let view = self.scope.id();
        self.runner.spawn(self.scope.child_token(), async move {
            let result = tokio::select! {
                biased;
                _ = ticket.cancel.cancelled() => Err(UploadError::Superseded),
                result = api.upload_image(&token, &ticket.image) => result,
            };
            AppEvent::UploadFinished {
                view,
                generation: ticket.generation,
                result,
            }
        });
    }

    /// Rates the caption shown on the result view.
    pub fn rate(&mut self, score: u8) {
        let ViewState::Result {
            guard: Guard::Authorized,
            result,
        } = &mut self.view
        else {
            return;
        };
        let Some(feedback) = result.feedback_mut() else {
            return;
        };
        let Some(token) = self.session.current_token().map(str::to_owned) else {
            return;
        };
        let Ok(submission) = feedback.begin_submit(score) else {
            return;
        };

        let api = Arc::clone(&self.api);
        let view = self.scope.id();
        self.runner.spawn(self.scope.child_token(), async move {
            let result = api.send_feedback(&token, &submission).await;
            AppEvent::FeedbackFinished { view, result }
        });
    }

    /// Leaves the result view for a fresh upload.
    pub fn new_upload(&mut self) {
        if self.route() == Route::Result {
            self.navigate(Navigation::Upload);
        }
    }

    /// Applies the completion of asynchronous work.
    pub fn handle_event(&mut self, event: AppEvent) {
        if event.view() != self.scope.id() {
            debug!(event_view = event.view().0, current = self.scope.id().0, "Discarding event of a closed view");
            return;
        }

        match event {
            AppEvent::LoginFinished { identifier, result, .. } => self.finish_login(identifier, result),
            AppEvent::UploadFinished { generation, result, .. } => self.finish_upload(generation, result),
            AppEvent::FeedbackFinished { result, .. } => self.finish_feedback(result),
            AppEvent::RedirectElapsed { .. } => {
                info!("Redirecting to login");
                self.navigate(Navigation::Login);
            }
        }
    }

    fn finish_login(&mut self, identifier: String, result: Result<String, AuthError>) {
        let ViewState::Login(form) = &mut self.view else {
            return;
        };
        form.pending = false;
        match result {
            Ok(token) => {
                self.session.establish(&identifier, token);
                self.navigate(Navigation::Upload);
            }
            Err(e) => {
                form.secret.clear();
                form.error = Some(e.to_string());
            }
        }
    }

    fn finish_upload(&mut self, generation: u64, result: Result<CaptionResult, UploadError>) {
        let ViewState::Upload { upload, .. } = &mut self.view else {
            return;
        };
        if let Ok(payload) = upload.complete(generation, result) {
            self.navigate(Navigation::Result(Some(payload)));
        }
    }

    fn finish_feedback(&mut self, result: Result<(), FeedbackError>) {
        if let ViewState::Result { result: view, .. } = &mut self.view {
            if let Some(feedback) = view.feedback_mut() {
                let _ = feedback.complete(result);
            }
        }
    }

    /// Rating state of the current result view, if any.
    pub fn feedback(&self) -> Option<&FeedbackCoordinator> {
        match &self.view {
            ViewState::Result { result, .. } => result.feedback(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeApi, settle};
    use crate::application::upload::UploadState;
    use crate::infrastructure::MemoryStorage;
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::mpsc::UnboundedReceiver;

    const DELAY: Duration = Duration::from_millis(2500);

    fn app_with(api: &Arc<FakeApi>, logged_in: bool) -> (App, UnboundedReceiver<AppEvent>) {
        let mut session = SessionStore::new(MemoryStorage::new());
        if logged_in {
            session.establish("alice", "tok".to_string());
        }
        let (runner, events) = TaskRunner::new();
        (App::new(session, api.clone(), runner, DELAY), events)
    }

    async fn pump(app: &mut App, events: &mut UnboundedReceiver<AppEvent>) {
        let event = events.recv().await.unwrap();
        app.handle_event(event);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    fn write_image(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, [0x89u8, b'P', b'N', b'G']).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_app_starts_on_login() {
        let api = Arc::new(FakeApi::new());
        let (app, _events) = app_with(&api, false);
        assert_eq!(app.route(), Route::Login);
        assert!(!app.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_flow_enters_upload() {
        let api = Arc::new(FakeApi::new());
        let (mut app, mut events) = app_with(&api, false);

        type_text(&mut app, "alice");
        app.toggle_login_focus();
        type_text(&mut app, "secret");
        app.submit_login();
        app.submit_login();
        pump(&mut app, &mut events).await;

        assert_eq!(api.login_count(), 1);
        assert_eq!(api.logins.lock().unwrap()[0], ("alice".to_string(), "secret".to_string()));
        assert_eq!(app.session().display_name(), Some("alice"));
        assert!(matches!(app.view(), ViewState::Upload { guard: Guard::Authorized, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_login_shows_error() {
        let api = Arc::new(FakeApi::new());
        api.set_login_result(Err(AuthError::Rejected { status: 401 }));
        let (mut app, mut events) = app_with(&api, false);

        type_text(&mut app, "alice");
        app.submit_login();
        pump(&mut app, &mut events).await;

        let ViewState::Login(form) = app.view() else {
            panic!("expected login view");
        };
        assert_eq!(form.error.as_deref(), Some("Incorrect identifier or password"));
        assert!(!form.pending);
        assert!(!app.session().is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_upload_redirects_after_delay() {
        let api = Arc::new(FakeApi::new());
        let (mut app, mut events) = app_with(&api, false);

        app.go_to(Route::Upload);
        assert!(matches!(app.view(), ViewState::Upload { guard: Guard::Redirecting, .. }));

        tokio::time::advance(DELAY - Duration::from_millis(1)).await;
        settle().await;
        assert!(events.try_recv().is_err());
        assert_eq!(app.route(), Route::Upload);

        tokio::time::advance(Duration::from_millis(1)).await;
        pump(&mut app, &mut events).await;
        assert_eq!(app.route(), Route::Login);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_guarded_view_cancels_redirect() {
        let api = Arc::new(FakeApi::new());
        let (mut app, mut events) = app_with(&api, false);

        app.go_to(Route::Result);
        tokio::time::advance(Duration::from_millis(1000)).await;
        app.go_to(Route::Login);
        type_text(&mut app, "al");

        tokio::time::advance(DELAY * 2).await;
        settle().await;
        assert!(events.try_recv().is_err());

        let ViewState::Login(form) = app.view() else {
            panic!("expected login view");
        };
        assert_eq!(form.identifier, "al");
    }

    #[test]
    fn test_events_of_closed_views_are_ignored() {
        let api = Arc::new(FakeApi::new());
        let (mut app, _events) = app_with(&api, true);
        app.go_to(Route::Upload);
        let stale = ViewId(app.view_id().0 - 1);

        app.handle_event(AppEvent::RedirectElapsed { view: stale });
        app.handle_event(AppEvent::UploadFinished {
            view: stale,
            generation: 1,
            result: Ok(CaptionResult::new("abc", "a dog")),
        });
        assert_eq!(app.route(), Route::Upload);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_without_file_makes_no_call() {
        let api = Arc::new(FakeApi::new());
        let (mut app, mut events) = app_with(&api, true);
        app.go_to(Route::Upload);

        app.submit_upload();
        settle().await;

        assert!(events.try_recv().is_err());
        assert_eq!(api.upload_count(), 0);
        let ViewState::Upload { upload, .. } = app.view() else {
            panic!("expected upload view");
        };
        assert_eq!(upload.error(), Some("Please select an image."));
        assert_eq!(upload.state(), UploadState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_result_feedback_flow() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::new());
        let (mut app, mut events) = app_with(&api, true);
        app.go_to(Route::Upload);

        type_text(&mut app, &write_image(&dir, "dog.png"));
        app.choose_file();
        app.submit_upload();
        app.submit_upload();
        let ViewState::Upload { upload, .. } = app.view() else {
            panic!("expected upload view");
        };
        assert_eq!(upload.state(), UploadState::Submitting);
        assert!(!upload.can_submit());

        pump(&mut app, &mut events).await;
        assert_eq!(api.upload_count(), 1);
        let ViewState::Result { result, .. } = app.view() else {
            panic!("expected result view");
        };
        let payload = result.payload().unwrap();
        assert_eq!(payload.caption_result.caption_text, "a dog");
        assert_eq!(payload.image_preview.file_name(), "dog.png");

        app.rate(3);
        app.rate(3);
        pump(&mut app, &mut events).await;
        settle().await;
        assert!(events.try_recv().is_err());

        let feedbacks = api.feedbacks.lock().unwrap().clone();
        assert_eq!(feedbacks.len(), 1);
        assert_eq!(
            serde_json::to_value(&feedbacks[0].1).unwrap(),
            serde_json::json!({"id_image": "abc", "feedback": 3})
        );

        let feedback = app.feedback().unwrap();
        assert!(feedback.is_sent());
        assert!(!feedback.controls_enabled());

        app.rate(4);
        settle().await;
        assert_eq!(api.feedback_count(), 1);

        app.new_upload();
        let ViewState::Upload { upload, .. } = app.view() else {
            panic!("expected upload view");
        };
        assert_eq!(upload.state(), UploadState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_upload_stays_on_upload() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::new());
        api.set_upload_result(Err(UploadError::Transport("Image invalide".to_string())));
        let (mut app, mut events) = app_with(&api, true);
        app.go_to(Route::Upload);

        type_text(&mut app, &write_image(&dir, "dog.png"));
        app.choose_file();
        app.submit_upload();
        pump(&mut app, &mut events).await;

        let ViewState::Upload { upload, .. } = app.view() else {
            panic!("expected upload view");
        };
        assert_eq!(upload.state(), UploadState::Failed);
        assert_eq!(upload.error(), Some("Upload failed: Image invalide"));
        assert!(upload.image().is_some());
        assert!(upload.can_submit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_view_without_payload_is_empty() {
        let api = Arc::new(FakeApi::new());
        let (mut app, _events) = app_with(&api, true);

        app.go_to(Route::Result);
        let ViewState::Result { guard, result } = app.view() else {
            panic!("expected result view");
        };
        assert!(guard.is_authorized());
        assert!(matches!(result, ResultView::Empty));

        app.rate(2);
        settle().await;
        assert_eq!(api.feedback_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_returns_to_login() {
        let api = Arc::new(FakeApi::new());
        let (mut app, _events) = app_with(&api, true);
        app.go_to(Route::Upload);

        app.logout();
        app.logout();
        assert_eq!(app.route(), Route::Login);
        assert!(!app.session().is_authenticated());
    }
}

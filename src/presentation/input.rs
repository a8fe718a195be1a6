use crate::application::{App, Route};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if Self::handle_global(app, key, modifiers) {
            return;
        }

        match app.route() {
            Route::Login => Self::handle_login(app, key),
            Route::Upload => Self::handle_upload(app, key, modifiers),
            Route::Result => Self::handle_result(app, key),
        }
    }

    /// Navbar and application shortcuts, available on every view.
    fn handle_global(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    app.quit();
                    return true;
                }
                KeyCode::Char('l') => {
                    app.logout();
                    return true;
                }
                _ => {}
            }
        }

        match key {
            KeyCode::F(1) => app.go_to(Route::Login),
            KeyCode::F(2) => app.go_to(Route::Upload),
            KeyCode::F(3) => app.go_to(Route::Result),
            _ => return false,
        }
        true
    }

    fn handle_login(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter if app.session().is_authenticated() => app.go_to(Route::Upload),
            KeyCode::Enter => app.submit_login(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => app.toggle_login_focus(),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_upload(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if key == KeyCode::Char('s') {
                app.submit_upload();
            }
            return;
        }

        match key {
            KeyCode::Enter => app.choose_file(),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_result(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(score) = c.to_digit(10) {
                    app.rate(score as u8);
                }
            }
            KeyCode::Char('n') => app.new_upload(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeApi, png, settle};
    use crate::application::{Navigation, SessionStore, TaskRunner, ViewState};
    use crate::domain::{CaptionResult, WorkflowPayload};
    use crate::infrastructure::MemoryStorage;
    use std::sync::Arc;
    use std::time::Duration;

    fn app(api: &Arc<FakeApi>, logged_in: bool) -> App {
        let mut session = SessionStore::new(MemoryStorage::new());
        if logged_in {
            session.establish("alice", "tok".to_string());
        }
        let (runner, _events) = TaskRunner::new();
        App::new(session, api.clone(), runner, Duration::from_millis(2500))
    }

    #[test]
    fn test_quit_key_binding() {
        let api = Arc::new(FakeApi::new());
        let mut app = app(&api, false);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.should_quit);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_login_form_typing() {
        let api = Arc::new(FakeApi::new());
        let mut app = app(&api, false);

        for c in "bob".chars() {
            InputHandler::handle_key_event(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        InputHandler::handle_key_event(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('p'), KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('w'), KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Backspace, KeyModifiers::NONE);

        let ViewState::Login(form) = app.view() else {
            panic!("expected login view");
        };
        assert_eq!(form.identifier, "bob");
        assert_eq!(form.secret, "p");
    }

    #[test]
    fn test_navbar_keys() {
        let api = Arc::new(FakeApi::new());
        let mut app = app(&api, true);

        InputHandler::handle_key_event(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        assert_eq!(app.route(), Route::Upload);
        InputHandler::handle_key_event(&mut app, KeyCode::F(3), KeyModifiers::NONE);
        assert_eq!(app.route(), Route::Result);
        InputHandler::handle_key_event(&mut app, KeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(app.route(), Route::Login);

        InputHandler::handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.route(), Route::Upload);
    }

    #[test]
    fn test_logout_key_binding() {
        let api = Arc::new(FakeApi::new());
        let mut app = app(&api, true);
        app.go_to(Route::Upload);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(app.route(), Route::Login);
        assert!(!app.session().is_authenticated());
    }

    #[test]
    fn test_upload_path_typing_and_empty_submit() {
        let api = Arc::new(FakeApi::new());
        let mut app = app(&api, true);
        app.go_to(Route::Upload);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('s'), KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);

        let ViewState::Upload { upload, path_input, .. } = app.view() else {
            panic!("expected upload view");
        };
        assert_eq!(path_input, "as");
        assert_eq!(upload.error(), Some("Please select an image."));
        assert_eq!(api.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_rating_keys() {
        let api = Arc::new(FakeApi::new());
        let mut app = app(&api, true);
        app.navigate(Navigation::Result(Some(WorkflowPayload {
            caption_result: CaptionResult::new("abc", "a dog"),
            image_preview: png("dog.png"),
        })));

        InputHandler::handle_key_event(&mut app, KeyCode::Char('9'), KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('2'), KeyModifiers::NONE);
        settle().await;
        assert_eq!(api.feedback_count(), 1);
        assert_eq!(api.feedbacks.lock().unwrap()[0].1.score.value(), 2);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.route(), Route::Upload);
    }
}

//! captui - Terminal client for an image-captioning service
//!
//! Log in against the captioning backend, upload an image, read the
//! generated caption and rate it. The session is kept on disk between runs.

use std::io;
use std::sync::Arc;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use captui::application::{App, AppEvent, SessionStore, TaskRunner};
use captui::infrastructure::{init_logging, ClientConfig, FileStorage, HttpCaptionApi};
use captui::presentation::{render_ui, InputHandler};

/// Entry point for the captui terminal client.
///
/// Loads the configuration, restores the saved session, sets up the
/// terminal and runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup fails. An unusable log file only
/// disables logging.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::load();
    init_logging(&config.log_path);
    info!(api_url = %config.api_url, storage = %config.storage_path.display(), "Starting captui");

    let mut session = SessionStore::new(FileStorage::new(&config.storage_path));
    session.restore();
    let api = Arc::new(HttpCaptionApi::new(config.api_url.clone()));
    let (runner, events) = TaskRunner::new();
    let mut app = App::new(session, api, runner, config.redirect_delay);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, events).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Redraws after every keyboard event and every completed background task
/// (login, upload, feedback, redirect timer). Runs until the user quits.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut events: UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    let mut input = EventStream::new();

    while !app.should_quit {
        terminal.draw(|f| render_ui(f, app))?;

        tokio::select! {
            Some(event) = events.recv() => app.handle_event(event),
            key = input.next() => match key {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    InputHandler::handle_key_event(app, key.code, key.modifiers);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
        }
    }

    info!("Exiting");
    Ok(())
}

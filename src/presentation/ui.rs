use crate::application::{App, FeedbackAck, Guard, LoginField, LoginForm, ResultView, Route, UploadCoordinator, UploadState, ViewState};
use crate::domain::{Score, WorkflowPayload};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_navbar(f, app, chunks[0]);
    match app.view() {
        ViewState::Login(form) => render_login(f, app, form, chunks[1]),
        ViewState::Upload { guard: Guard::Redirecting, .. } | ViewState::Result { guard: Guard::Redirecting, .. } => {
            render_redirect_notice(f, chunks[1])
        }
        ViewState::Upload { upload, path_input, .. } => render_upload(f, upload, path_input, chunks[1]),
        ViewState::Result { result, .. } => render_result(f, result, chunks[1]),
    }
    render_status_bar(f, app, chunks[2]);
}

fn render_navbar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for (index, route) in Route::ALL.into_iter().enumerate() {
        let style = if route == app.route() {
            Style::default().bg(Color::Cyan).fg(Color::Black)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(format!(" F{} {} ", index + 1, route.title()), style));
        spans.push(Span::raw(" "));
    }
    if let Some(name) = app.session().display_name() {
        spans.push(Span::styled(format!("| {} ", name), Style::default().fg(Color::Yellow)));
        spans.push(Span::raw("(Ctrl+L: logout)"));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_redirect_notice(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled("Access not authorized", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Redirecting to the login page...", Style::default().fg(Color::Gray))),
    ];
    let notice = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(notice, area);
}

fn render_login(f: &mut Frame, app: &App, form: &LoginForm, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Login");

    if let Some(name) = app.session().display_name() {
        let welcome = Paragraph::new(vec![
            Line::from(Span::styled(format!("Welcome {}", name), Style::default().fg(Color::Green))),
            Line::from(""),
            Line::from("Press Enter or F2 to upload an image."),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(welcome, area);
        return;
    }

    let field_style = |field: LoginField| {
        if form.focus == field {
            Style::default().fg(Color::Black).bg(Color::LightBlue)
        } else {
            Style::default()
        }
    };
    let masked: String = "*".repeat(form.secret.chars().count());

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Identifier: "),
            Span::styled(form.identifier.clone(), field_style(LoginField::Identifier)),
        ]),
        Line::from(vec![
            Span::raw("Password:   "),
            Span::styled(masked, field_style(LoginField::Password)),
        ]),
        Line::from(""),
    ];
    if form.pending {
        lines.push(Line::from(Span::styled("Logging in...", Style::default().fg(Color::Gray))));
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_upload(f: &mut Frame, upload: &UploadCoordinator, path_input: &str, area: Rect) {
    let mut lines = vec![Line::from(vec![Span::raw("Image path: "), Span::styled(path_input.to_string(), Style::default().fg(Color::Yellow))])];

    match upload.image() {
        Some(image) => lines.push(Line::from(format!("Preview: {}", image.summary()))),
        None => lines.push(Line::from(Span::styled("No image selected", Style::default().fg(Color::Gray)))),
    }
    lines.push(Line::from(""));

    if let Some(error) = upload.error() {
        lines.push(Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))));
    }

    let submit = if upload.state() == UploadState::Submitting {
        Span::styled("[ Sending... ]", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("[ Ctrl+S: Send to the API ]", Style::default().fg(Color::Black).bg(Color::Magenta))
    };
    lines.push(Line::from(submit));

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Upload an image"));
    f.render_widget(widget, area);
}

fn render_result(f: &mut Frame, result: &ResultView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Result");
    let ResultView::Loaded { payload, feedback } = result else {
        let empty = Paragraph::new(vec![
            Line::from("No result available."),
            Line::from(Span::styled("Press F2 to upload an image.", Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    let mut lines = caption_lines(payload);
    lines.push(Line::from(""));
    lines.push(Line::from("Rate this caption:"));

    let enabled = feedback.controls_enabled();
    let mut controls = Vec::new();
    for score in Score::all() {
        let style = if enabled {
            Style::default().fg(Color::Black).bg(Color::LightBlue)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        controls.push(Span::styled(format!("[{}] {}", score.value(), score.label()), style));
        controls.push(Span::raw("  "));
    }
    lines.push(Line::from(controls));

    if let Some(ack) = feedback.ack() {
        let color = match ack {
            FeedbackAck::Saved => Color::Green,
            FeedbackAck::Failed => Color::Red,
        };
        lines.push(Line::from(Span::styled(ack.message(), Style::default().fg(color))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("[ n: New image ]", Style::default().fg(Color::Black).bg(Color::Green))));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

fn caption_lines(payload: &WorkflowPayload) -> Vec<Line<'static>> {
    let caption = &payload.caption_result;
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Image: {}", payload.image_preview.summary()),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled("Generated caption:", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
        Line::from(caption.caption_text.clone()),
    ];
    if let Some(confidence) = caption.confidence {
        lines.push(Line::from(format!("Confidence: {:.0}%", confidence * 100.0)));
    }
    lines
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help = match app.view() {
        ViewState::Login(_) if app.session().is_authenticated() => "Enter: upload | F1-F3: views | Ctrl+Q: quit",
        ViewState::Login(_) => "Tab: switch field | Enter: log in | F1-F3: views | Ctrl+Q: quit",
        ViewState::Upload { guard: Guard::Authorized, .. } => {
            "Type a path, Enter: select image | Ctrl+S: send | F1-F3: views | Ctrl+Q: quit"
        }
        ViewState::Result { guard: Guard::Authorized, .. } => "1-4: rate | n: new image | F1-F3: views | Ctrl+Q: quit",
        _ => "F1-F3: views | Ctrl+Q: quit",
    };
    let status = Paragraph::new(help).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

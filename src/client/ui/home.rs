//! Home screen: pick a name, then create or join a session.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::client::state::{ClientApp, ClientState, HomeField};

use super::render::TITLE;

/// Render the home form.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let ClientState::Home {
        name,
        session_id,
        focus,
        error,
    } = &app.state
    else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(14),
        Constraint::Percentage(30),
    ])
    .split(area);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("Connected to {}", app.server_addr()),
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
        field_line("Your name:  ", name, *focus == HomeField::Name),
        field_line("Session id: ", session_id, *focus == HomeField::SessionId),
        Line::from(""),
        Line::from(Span::styled(
            "Leave the session id empty to create a new session",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    match error {
        Some(err) => content.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        ))),
        None => content.push(Line::from("")),
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "[Tab] switch field  ·  [Enter] go  ·  [Esc] quit",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if focused { "_" } else { " " };

    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::White)),
        Span::styled(value, value_style),
        Span::styled(cursor, Style::default().fg(Color::Yellow)),
    ])
}

//! Top-level client renderer and the connection status screens.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{ClientApp, ClientState};

use super::{home, session};

pub(super) const TITLE: &str = "TRIVIA ROOM";

/// Render the client UI based on current state.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.state {
        ClientState::Connecting => render_status(
            frame,
            area,
            Color::Yellow,
            vec![
                Line::from(format!("Dialing ws://{}", app.server_addr())),
                Line::from(Span::styled(
                    "waiting for the server to assign a connection id",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
        ),
        ClientState::Home { .. } => home::render(frame, area, app),
        ClientState::InSession(view) => session::render(frame, area, view),
        ClientState::Disconnected { message } => {
            render_status(frame, area, Color::Red, disconnected_lines(app, message))
        }
    }
}

fn disconnected_lines<'a>(app: &ClientApp, message: &'a str) -> Vec<Line<'a>> {
    let connection = match app.connection_id {
        Some(id) => format!("connection {id}"),
        None => "no connection was established".to_string(),
    };

    vec![
        Line::from(Span::styled(message, Style::default().bold())),
        Line::from(Span::styled(connection, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(Span::styled(
            "Scores are not kept across connections. To rejoin, run:",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            app.reconnect_command(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Q] / [Esc] / [Enter] exit",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// A bordered card in the middle of the screen, titled with the app name.
fn render_status(frame: &mut Frame, area: Rect, accent: Color, lines: Vec<Line>) {
    let height = lines.len() as u16 + 4;
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, card, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Max(72),
        Constraint::Fill(1),
    ])
    .areas(middle);

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .fg(accent)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(format!(" {TITLE} "))
                .title_alignment(Alignment::Center)
                .title_style(Style::default().fg(Color::Cyan).bold())
                .padding(Padding::uniform(1)),
        );

    frame.render_widget(widget, card);
}

//! Session screen: scoreboard, round question, event log and input line.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{LogKind, SessionView};

/// Render the session screen.
pub fn render(frame: &mut Frame, area: Rect, view: &SessionView) {
    let rows = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(4), // Question
        Constraint::Min(6),    // Log + scoreboard
        Constraint::Length(3), // Input
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    let middle = Layout::horizontal([Constraint::Min(30), Constraint::Length(28)]).split(rows[2]);

    render_header(frame, rows[0], view);
    render_question(frame, rows[1], view.question.as_deref());
    render_log(frame, middle[0], view);
    render_scoreboard(frame, middle[1], view);
    render_input(frame, rows[3], view);
    render_controls(frame, rows[4]);
}

fn render_header(frame: &mut Frame, area: Rect, view: &SessionView) {
    let line = Line::from(vec![
        Span::styled("Session ", Style::default().fg(Color::DarkGray)),
        Span::styled(&view.session_id, Style::default().fg(Color::Cyan).bold()),
        Span::styled("  ·  playing as ", Style::default().fg(Color::DarkGray)),
        Span::styled(&view.username, Style::default().fg(Color::Green).bold()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_question(frame: &mut Frame, area: Rect, question: Option<&str>) {
    let (text, style) = match question {
        Some(q) => (q, Style::default().fg(Color::White).bold()),
        None => (
            "Waiting for the game master to start a round...",
            Style::default().fg(Color::Yellow),
        ),
    };

    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Question ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_log(frame: &mut Frame, area: Rect, view: &SessionView) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = view.log.len().saturating_sub(visible);

    let lines: Vec<Line> = view
        .log
        .iter()
        .skip(skip)
        .map(|entry| {
            let color = match entry.kind {
                LogKind::Chat => Color::White,
                LogKind::Notice => Color::Gray,
                LogKind::Round => Color::Cyan,
                LogKind::Error => Color::Red,
            };
            Line::from(Span::styled(entry.text.as_str(), Style::default().fg(color)))
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Events ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_scoreboard(frame: &mut Frame, area: Rect, view: &SessionView) {
    let lines: Vec<Line> = view
        .players
        .iter()
        .map(|p| {
            let style = if p.username == view.username {
                Style::default().fg(Color::Green).bold()
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!("{:<18}", p.username), style),
                Span::styled(format!("{:>4}", p.score), Style::default().fg(Color::Yellow)),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Players ({}) ", view.player_count))
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_input(frame: &mut Frame, area: Rect, view: &SessionView) {
    let title = if view.round_active() { " Guess " } else { " Chat " };

    let widget = Paragraph::new(Line::from(vec![
        Span::styled(view.input.as_str(), Style::default().fg(Color::Yellow)),
        Span::styled("_", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget =
        Paragraph::new("/q <question> | <answer>  ·  /start  ·  /g guess  ·  /c chat  ·  Esc quit")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}

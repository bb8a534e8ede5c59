//! WebSocket client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

use crate::config::ClientArgs;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::terminal::TerminalGuard;

use super::state::{ClientApp, ClientState};
use super::ui;

/// Shared client app state.
type SharedApp = Arc<Mutex<ClientApp>>;

/// Run the trivia client.
pub async fn run(args: ClientArgs) -> anyhow::Result<()> {
    let app = Arc::new(Mutex::new(ClientApp::new(args.host.clone(), args.port)));

    let url = format!("ws://{}:{}", args.host, args.port);
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .with_context(|| format!("connecting to {url}"))?;

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientMessage>();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&msg) else {
                continue;
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Incoming messages
    let app_clone = Arc::clone(&app);
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text.to_string(),
                Ok(Message::Close(_)) => {
                    app_clone
                        .lock()
                        .await
                        .disconnect("Connection closed by server".to_string());
                    return;
                }
                Err(e) => {
                    app_clone
                        .lock()
                        .await
                        .disconnect(format!("Connection error: {e}"));
                    return;
                }
                _ => continue,
            };

            let Ok(server_msg) = serde_json::from_str::<ServerMessage>(&text) else {
                continue;
            };
            app_clone.lock().await.apply(server_msg);
        }
        app_clone
            .lock()
            .await
            .disconnect("Connection closed by server".to_string());
    });

    let result = run_tui(app, tx).await;

    recv_task.abort();
    send_task.abort();

    result
}

/// Run the client TUI.
async fn run_tui(app: SharedApp, tx: mpsc::UnboundedSender<ClientMessage>) -> anyhow::Result<()> {
    let mut guard = TerminalGuard::enter().context("setting up terminal")?;

    loop {
        {
            let app = app.lock().await;
            if app.should_quit {
                break;
            }
            guard.terminal().draw(|frame| ui::render(frame, &app))?;
        }

        // Handle input with timeout so server messages still redraw
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_input(&app, &tx, key.code).await;
            }
        }
    }

    Ok(())
}

/// Handle keyboard input.
async fn handle_input(app: &SharedApp, tx: &mpsc::UnboundedSender<ClientMessage>, key: KeyCode) {
    let mut app = app.lock().await;

    match &app.state {
        ClientState::Connecting | ClientState::Disconnected { .. } => {
            if matches!(
                key,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter
            ) {
                app.should_quit = true;
            }
        }
        ClientState::Home { .. } | ClientState::InSession(_) => match key {
            KeyCode::Char(c) => app.input_push(c),
            KeyCode::Backspace => app.input_pop(),
            KeyCode::Tab => app.toggle_focus(),
            KeyCode::Enter => {
                if let Some(msg) = app.submit() {
                    let _ = tx.send(msg);
                }
            }
            KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
    }
}

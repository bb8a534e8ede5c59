//! WebSocket server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

use crate::config::ServerArgs;
use crate::protocol::{ClientMessage, ServerMessage};

use super::handlers::handle_client_message;
use super::session::ConnectionId;
use super::state::{ServerState, SharedState};

type WsSender = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsReceiver = SplitStream<WebSocketStream<TcpStream>>;

/// Run the trivia server until Ctrl-C.
pub async fn run(args: ServerArgs) -> anyhow::Result<()> {
    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, round_secs = args.round_secs, "trivia server listening");

    let state = Arc::new(Mutex::new(ServerState::new(args.rules())));

    tokio::select! {
        _ = serve(listener, state) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("waiting for Ctrl-C")?;
            info!("shutting down");
        }
    }

    Ok(())
}

/// Accept connections on `listener` forever.
pub async fn serve(listener: TcpListener, state: SharedState) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tokio::spawn(handle_connection(stream, addr, Arc::clone(&state)));
            }
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, state: SharedState) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(addr = %addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (ws_sender, ws_receiver) = ws_stream.split();

    // Create channel for sending messages to this client
    let (tx, rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = state.lock().await.register_connection(tx.clone());
    info!(connection = %connection_id, addr = %addr, "client connected");

    handle_messages(connection_id, ws_sender, ws_receiver, rx, tx, &state).await;

    state.lock().await.disconnect(connection_id);
    info!(connection = %connection_id, "client disconnected");
}

/// Pump messages for a connected client until it goes away.
async fn handle_messages(
    connection_id: ConnectionId,
    mut ws_sender: WsSender,
    mut ws_receiver: WsReceiver,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    tx: mpsc::UnboundedSender<ServerMessage>,
    state: &SharedState,
) {
    // Forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "failed to serialize server message");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!(connection = %connection_id, error = %e, "read failed");
                break;
            }
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                warn!(connection = %connection_id, error = %e, "malformed client message");
                let _ = tx.send(ServerMessage::ErrorMsg {
                    msg: "Malformed message".to_string(),
                });
                continue;
            }
        };

        handle_client_message(connection_id, client_msg, state).await;
    }

    send_task.abort();
}

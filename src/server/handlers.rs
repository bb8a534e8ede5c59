//! Dispatch of decoded client messages.

use std::sync::Arc;

use tracing::debug;

use crate::protocol::ClientMessage;

use super::session::ConnectionId;
use super::state::SharedState;
use super::timer::RoundTimer;

/// Handle a single client message.
///
/// The state lock is held for the whole request, so handlers run one at a
/// time. A rejected request is reported to the sender only.
pub async fn handle_client_message(connection: ConnectionId, msg: ClientMessage, state: &SharedState) {
    let mut guard = state.lock().await;
    debug!(connection = %connection, ?msg, "client message");

    let result = match msg {
        ClientMessage::CreateSession { username } => {
            guard.create_session(connection, &username).map(|_| ())
        }
        ClientMessage::JoinSession {
            session_id,
            username,
        } => guard.join_session(connection, &session_id, &username),
        ClientMessage::SetQuestion { question, answer } => {
            guard.set_question(connection, &question, &answer)
        }
        ClientMessage::StartGame => match guard.start_game(connection) {
            Ok(ticket) => {
                let after = guard.rules().round_duration;
                let timer = RoundTimer::arm(Arc::clone(state), ticket.clone(), after);
                guard.attach_timer(&ticket, timer);
                Ok(())
            }
            Err(err) => Err(err),
        },
        ClientMessage::Guess { guess } => guard.guess(connection, &guess),
        ClientMessage::ChatMessage { msg } => guard.chat_message(connection, &msg),
    };

    if let Err(err) = result {
        guard.report_error(connection, err);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::{mpsc, Mutex};

    use super::*;
    use crate::config::GameRules;
    use crate::protocol::ServerMessage;
    use crate::server::state::ServerState;

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_round_through_dispatch() {
        let rules = GameRules {
            round_duration: Duration::from_secs(5),
            ..GameRules::default()
        };
        let state: SharedState = Arc::new(Mutex::new(ServerState::new(rules)));

        let mut clients = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            let id = state.lock().await.register_connection(tx);
            clients.push((id, rx));
        }
        let (alice, bob, carol) = (clients[0].0, clients[1].0, clients[2].0);

        handle_client_message(
            alice,
            ClientMessage::CreateSession {
                username: "Alice".to_string(),
            },
            &state,
        )
        .await;
        let session_id = state
            .lock()
            .await
            .session_of(alice)
            .map(|s| s.id().to_string())
            .unwrap();

        for (id, name) in [(bob, "Bob"), (carol, "Carol")] {
            handle_client_message(
                id,
                ClientMessage::JoinSession {
                    session_id: session_id.clone(),
                    username: name.to_string(),
                },
                &state,
            )
            .await;
        }
        handle_client_message(
            alice,
            ClientMessage::SetQuestion {
                question: "2+2".to_string(),
                answer: "4".to_string(),
            },
            &state,
        )
        .await;
        handle_client_message(alice, ClientMessage::StartGame, &state).await;
        assert!(state
            .lock()
            .await
            .session(&session_id)
            .unwrap()
            .has_pending_timer());

        handle_client_message(bob, ClientMessage::Guess { guess: "4".to_string() }, &state).await;

        let carol_messages = drain(&mut clients[2].1);
        assert!(carol_messages.contains(&ServerMessage::GameStarted {
            question: "2+2".to_string()
        }));
        assert!(carol_messages.iter().any(|m| matches!(
            m,
            ServerMessage::GameEnded { winner: Some(w), .. } if w == "Bob"
        )));

        // The cancelled timer never reports a timeout.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut clients[2].1).is_empty());
    }

    #[tokio::test]
    async fn test_rejection_goes_to_sender_only() {
        let state: SharedState = Arc::new(Mutex::new(ServerState::new(GameRules::default())));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = state.lock().await.register_connection(tx);
        drain(&mut rx);

        handle_client_message(id, ClientMessage::StartGame, &state).await;

        assert_eq!(
            drain(&mut rx),
            vec![ServerMessage::ErrorMsg {
                msg: "You are not a game master".to_string()
            }]
        );
    }
}

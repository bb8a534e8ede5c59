//! Server state management.
//!
//! [`ServerState`] owns the session registry and the outbound channel of
//! every connected client. Every client request is one method call on it,
//! made while holding the shared lock, so requests and timer expiries never
//! interleave.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GameRules;
use crate::protocol::{validate_username, ServerMessage};

use super::error::GameError;
use super::registry::SessionRegistry;
use super::session::{ConnectionId, GameSession, GuessOutcome};
use super::timer::{RoundTicket, RoundTimer};

/// Shared server state wrapped in Arc<Mutex> for async access.
pub type SharedState = Arc<Mutex<ServerState>>;

/// Outbound half of a client connection.
type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// Main server state.
pub struct ServerState {
    rules: GameRules,
    registry: SessionRegistry,
    connections: HashMap<ConnectionId, Outbox>,
}

impl ServerState {
    pub fn new(rules: GameRules) -> Self {
        Self {
            rules,
            registry: SessionRegistry::new(),
            connections: HashMap::new(),
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn session(&self, session_id: &str) -> Option<&GameSession> {
        self.registry.get(session_id)
    }

    /// The session `connection` plays in, if any.
    pub fn session_of(&self, connection: ConnectionId) -> Option<&GameSession> {
        self.registry.session_of(connection)
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Accept a new connection and acknowledge it with its id.
    pub fn register_connection(&mut self, outbox: Outbox) -> ConnectionId {
        let id = Uuid::new_v4();
        let _ = outbox.send(ServerMessage::ConnectionAck { connection_id: id });
        self.connections.insert(id, outbox);
        id
    }

    /// Forget a closed connection and remove it from its session.
    pub fn disconnect(&mut self, connection: ConnectionId) {
        self.connections.remove(&connection);
        self.teardown(connection);
    }

    /// Send a message to one connection. Fire-and-forget.
    pub fn send(&self, connection: ConnectionId, msg: ServerMessage) {
        send_to(&self.connections, connection, msg);
    }

    /// Push the public snapshot of a session to all of its players.
    pub fn update_session(&self, session_id: &str) {
        if let Some(session) = self.registry.get(session_id) {
            broadcast_to(&self.connections, session, session.snapshot());
        }
    }

    /// Tell a connection its request was rejected.
    pub fn report_error(&self, connection: ConnectionId, err: GameError) {
        debug!(connection = %connection, error = %err, "request rejected");
        self.send(connection, ServerMessage::ErrorMsg { msg: err.to_string() });
    }

    /// Create a session with `connection` as its master and only player.
    pub fn create_session(
        &mut self,
        connection: ConnectionId,
        username: &str,
    ) -> Result<String, GameError> {
        let username = validate_username(username).map_err(GameError::validation)?;
        if self.registry.session_of(connection).is_some() {
            return Err(GameError::conflict("You are already in a session"));
        }

        let session_id = format!("session-{connection}");
        let session = GameSession::new(
            session_id.clone(),
            connection,
            username.to_string(),
            self.rules.attempts_per_round,
        );
        self.registry.insert(session);
        info!(session_id = %session_id, master = username, "session created");

        self.send(
            connection,
            ServerMessage::SessionCreated {
                session_id: session_id.clone(),
            },
        );
        self.update_session(&session_id);
        Ok(session_id)
    }

    /// Seat `connection` in an existing, idle session.
    pub fn join_session(
        &mut self,
        connection: ConnectionId,
        session_id: &str,
        username: &str,
    ) -> Result<(), GameError> {
        let username = validate_username(username).map_err(GameError::validation)?;
        if self.registry.session_of(connection).is_some() {
            return Err(GameError::conflict("You are already in a session"));
        }

        let session = self
            .registry
            .get_mut(session_id.trim())
            .ok_or_else(|| GameError::not_found("Session does not exist"))?;
        if session.is_in_progress() {
            return Err(GameError::conflict("Game already in progress"));
        }
        if session.has_username(username) {
            return Err(GameError::conflict("Username is already taken in this session"));
        }

        session.add_player(connection, username.to_string(), self.rules.attempts_per_round);
        let session_id = session.id().to_string();
        self.registry.add_member(connection, &session_id);
        info!(session_id = %session_id, player = username, "player joined");

        self.send(
            connection,
            ServerMessage::SessionJoined {
                session_id: session_id.clone(),
            },
        );
        self.update_session(&session_id);
        Ok(())
    }

    /// Store the next round's question and answer. Master only.
    pub fn set_question(
        &mut self,
        connection: ConnectionId,
        question: &str,
        answer: &str,
    ) -> Result<(), GameError> {
        let session = self
            .registry
            .mastered_by_mut(connection)
            .ok_or_else(not_a_master)?;
        if session.is_in_progress() {
            return Err(GameError::conflict("Cannot change the question during a round"));
        }
        if answer.trim().is_empty() {
            return Err(GameError::validation("Answer is required"));
        }

        session.set_question(question, answer);
        debug!(session_id = %session.id(), "question set");

        self.send(
            connection,
            ServerMessage::Message {
                msg: "Question and answer set. Ready to start the game.".to_string(),
            },
        );
        Ok(())
    }

    /// Start a round and broadcast its question. Master only.
    ///
    /// The caller arms the round timer for the returned ticket and hands it
    /// back through [`ServerState::attach_timer`].
    pub fn start_game(&mut self, connection: ConnectionId) -> Result<RoundTicket, GameError> {
        let rules = self.rules;
        let session = self
            .registry
            .mastered_by_mut(connection)
            .ok_or_else(not_a_master)?;
        if session.is_in_progress() {
            return Err(GameError::conflict("Game already in progress"));
        }
        if session.player_count() < rules.min_players {
            return Err(GameError::precondition(format!(
                "At least {} players (including game master) required to start game",
                rules.min_players
            )));
        }
        if session.answer().trim().is_empty() {
            return Err(GameError::precondition(
                "Set a question and answer before starting the game",
            ));
        }

        let round = session.begin_round(rules.attempts_per_round);
        info!(
            session_id = %session.id(),
            round,
            players = session.player_count(),
            "round started"
        );

        broadcast_to(
            &self.connections,
            session,
            ServerMessage::GameStarted {
                question: session.question().to_string(),
            },
        );
        Ok(RoundTicket {
            session_id: session.id().to_string(),
            round,
        })
    }

    /// Give the armed timer to its round. A timer for a round that is
    /// already over is cancelled on the spot.
    pub fn attach_timer(&mut self, ticket: &RoundTicket, timer: RoundTimer) {
        match self.registry.get_mut(&ticket.session_id) {
            Some(session) if session.is_in_progress() && session.round() == ticket.round => {
                session.set_timer(timer);
            }
            _ => timer.cancel(),
        }
    }

    /// Timer expiry: end the ticket's round if it is still running.
    pub fn expire_round(&mut self, ticket: &RoundTicket) {
        let attempts = self.rules.attempts_per_round;
        let Some(session) = self.registry.get_mut(&ticket.session_id) else {
            return;
        };
        if !session.is_in_progress() || session.round() != ticket.round {
            return;
        }

        session.end_round(attempts);
        info!(session_id = %ticket.session_id, round = ticket.round, "round expired");

        broadcast_to(
            &self.connections,
            session,
            ServerMessage::GameEnded {
                msg: "Time expired".to_string(),
                answer: session.answer().to_string(),
                winner: None,
            },
        );
        broadcast_to(&self.connections, session, session.snapshot());
    }

    /// Apply a guess to the sender's active round.
    pub fn guess(&mut self, connection: ConnectionId, guess: &str) -> Result<(), GameError> {
        let rules = self.rules;
        let session = self
            .registry
            .session_of_mut(connection)
            .filter(|session| session.is_in_progress())
            .ok_or_else(|| GameError::conflict("No active game session for you"))?;

        let outcome = session
            .guess(connection, guess, rules.attempts_per_round, rules.points_per_win)
            .ok_or_else(|| GameError::conflict("No active game session for you"))?;

        match outcome {
            GuessOutcome::NoAttemptsLeft => {
                send_to(
                    &self.connections,
                    connection,
                    ServerMessage::Message {
                        msg: "You have no attempts left this round".to_string(),
                    },
                );
            }
            GuessOutcome::Wrong { attempts_left } => {
                send_to(
                    &self.connections,
                    connection,
                    ServerMessage::Message {
                        msg: format!("Wrong guess. Attempts left: {attempts_left}"),
                    },
                );
                broadcast_to(&self.connections, session, session.snapshot());
            }
            GuessOutcome::Correct { winner } => {
                info!(session_id = %session.id(), round = session.round(), winner = %winner, "round won");
                broadcast_to(
                    &self.connections,
                    session,
                    ServerMessage::GameEnded {
                        msg: format!("{winner} has won!"),
                        answer: session.answer().to_string(),
                        winner: Some(winner),
                    },
                );
                broadcast_to(&self.connections, session, session.snapshot());
            }
        }
        Ok(())
    }

    /// Relay a chat line to the sender's session.
    pub fn chat_message(&self, connection: ConnectionId, msg: &str) -> Result<(), GameError> {
        let session = self
            .registry
            .session_of(connection)
            .ok_or_else(|| GameError::unauthorized("You are not in a session"))?;
        let username = session
            .player(connection)
            .map(|p| p.username.clone())
            .ok_or_else(|| GameError::unauthorized("You are not in a session"))?;

        broadcast_to(
            &self.connections,
            session,
            ServerMessage::ChatMessage {
                username,
                msg: msg.to_string(),
            },
        );
        Ok(())
    }

    /// Remove `connection` from its session, promoting a new master or
    /// deleting the session as needed.
    pub fn teardown(&mut self, connection: ConnectionId) {
        let Some(session_id) = self.registry.remove_member(connection) else {
            return;
        };
        let Some(session) = self.registry.get_mut(&session_id) else {
            return;
        };
        let Some(player) = session.remove_player(connection) else {
            return;
        };
        info!(session_id = %session_id, player = %player.username, "player left");

        if session.is_master(connection) {
            if let Some(master) = session.promote_first() {
                let msg = format!("{} is the new game master.", master.username);
                info!(session_id = %session_id, master = %master.username, "game master promoted");
                broadcast_to(&self.connections, session, ServerMessage::Message { msg });
            }
        }

        if session.player_count() == 0 {
            self.registry.remove(&session_id);
            info!(session_id = %session_id, "session closed");
        } else {
            broadcast_to(&self.connections, session, session.snapshot());
        }
    }
}

fn not_a_master() -> GameError {
    GameError::unauthorized("You are not a game master")
}

fn send_to(connections: &HashMap<ConnectionId, Outbox>, connection: ConnectionId, msg: ServerMessage) {
    if let Some(outbox) = connections.get(&connection) {
        let _ = outbox.send(msg);
    }
}

/// Send to every player of `session`: the session's room.
fn broadcast_to(
    connections: &HashMap<ConnectionId, Outbox>,
    session: &GameSession,
    msg: ServerMessage,
) {
    for connection in session.players().keys() {
        send_to(connections, *connection, msg.clone());
    }
}

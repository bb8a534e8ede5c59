//! Client state management.

use std::collections::VecDeque;

use uuid::Uuid;

use crate::protocol::{ClientMessage, PlayerSummary, ServerMessage, USERNAME_MAX_LENGTH};

/// Keep at most this many lines in the session log.
const LOG_CAPACITY: usize = 200;

/// Which field of the home form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeField {
    #[default]
    Name,
    SessionId,
}

/// Kind of a line in the session log, used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Chat,
    Notice,
    Round,
    Error,
}

/// One line of the session log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: LogKind,
    pub text: String,
}

/// What the player sees while seated in a session.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub session_id: String,
    pub username: String,
    pub players: Vec<PlayerSummary>,
    pub player_count: usize,
    /// Question of the running round; `None` between rounds.
    pub question: Option<String>,
    pub log: VecDeque<LogEntry>,
    pub input: String,
}

impl SessionView {
    fn new(session_id: String, username: String) -> Self {
        Self {
            session_id,
            username,
            ..Self::default()
        }
    }

    pub fn round_active(&self) -> bool {
        self.question.is_some()
    }

    pub fn push_log(&mut self, kind: LogKind, text: impl Into<String>) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            kind,
            text: text.into(),
        });
    }
}

/// Current state of the client.
#[derive(Debug, Clone, Default)]
pub enum ClientState {
    /// Connecting to server.
    #[default]
    Connecting,

    /// Entering a name and, to join, a session id.
    Home {
        name: String,
        session_id: String,
        focus: HomeField,
        error: Option<String>,
    },

    /// Seated in a session.
    InSession(SessionView),

    /// Disconnected from server.
    Disconnected { message: String },
}

impl ClientState {
    /// Create a fresh home form.
    pub fn home() -> Self {
        Self::Home {
            name: String::new(),
            session_id: String::new(),
            focus: HomeField::Name,
            error: None,
        }
    }
}

/// Client application state.
pub struct ClientApp {
    /// Current state.
    pub state: ClientState,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Id the server assigned to this connection.
    pub connection_id: Option<Uuid>,
    /// Whether the client should quit.
    pub should_quit: bool,
}

impl ClientApp {
    /// Create a new client app.
    pub fn new(host: String, port: u16) -> Self {
        Self {
            state: ClientState::Connecting,
            host,
            port,
            connection_id: None,
            should_quit: false,
        }
    }

    /// Get the server address string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Shell command that opens a fresh connection to the same server.
    pub fn reconnect_command(&self) -> String {
        format!("trivia-room play --host {} --port {}", self.host, self.port)
    }

    /// Move to disconnected state.
    pub fn disconnect(&mut self, message: String) {
        self.state = ClientState::Disconnected { message };
    }

    /// Fold a message from the server into the client state.
    pub fn apply(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::ConnectionAck { connection_id } => {
                self.connection_id = Some(connection_id);
                if matches!(self.state, ClientState::Connecting) {
                    self.state = ClientState::home();
                }
            }
            ServerMessage::SessionCreated { session_id } => {
                self.enter_session(session_id.clone());
                self.log(
                    LogKind::Notice,
                    format!("Session {session_id} created. You are the game master."),
                );
                self.log(LogKind::Notice, "Set a question with /q <question> | <answer>");
            }
            ServerMessage::SessionJoined { session_id } => {
                self.enter_session(session_id.clone());
                self.log(LogKind::Notice, format!("Joined session {session_id}"));
            }
            ServerMessage::SessionUpdate {
                players,
                player_count,
            } => {
                if let ClientState::InSession(view) = &mut self.state {
                    view.players = players;
                    view.player_count = player_count;
                }
            }
            ServerMessage::GameStarted { question } => {
                if let ClientState::InSession(view) = &mut self.state {
                    view.push_log(LogKind::Round, format!("Round started: {question}"));
                    view.question = Some(question);
                }
            }
            ServerMessage::GameEnded { msg, answer, .. } => {
                if let ClientState::InSession(view) = &mut self.state {
                    view.question = None;
                    view.push_log(LogKind::Round, format!("{msg} The answer was: {answer}"));
                }
            }
            ServerMessage::Message { msg } => self.log(LogKind::Notice, msg),
            ServerMessage::ChatMessage { username, msg } => {
                self.log(LogKind::Chat, format!("{username}: {msg}"));
            }
            ServerMessage::ErrorMsg { msg } => match &mut self.state {
                ClientState::Home { error, .. } => *error = Some(msg),
                _ => self.log(LogKind::Error, msg),
            },
        }
    }

    fn enter_session(&mut self, session_id: String) {
        let username = match &self.state {
            ClientState::Home { name, .. } => name.trim().to_string(),
            _ => String::new(),
        };
        self.state = ClientState::InSession(SessionView::new(session_id, username));
    }

    fn log(&mut self, kind: LogKind, text: impl Into<String>) {
        if let ClientState::InSession(view) = &mut self.state {
            view.push_log(kind, text);
        }
    }

    /// Type a character into the focused field.
    pub fn input_push(&mut self, c: char) {
        match &mut self.state {
            ClientState::Home {
                name,
                session_id,
                focus,
                error,
            } => {
                *error = None;
                match focus {
                    HomeField::Name if name.chars().count() < USERNAME_MAX_LENGTH => name.push(c),
                    HomeField::SessionId => session_id.push(c),
                    _ => {}
                }
            }
            ClientState::InSession(view) => view.input.push(c),
            _ => {}
        }
    }

    /// Delete the last character of the focused field.
    pub fn input_pop(&mut self) {
        match &mut self.state {
            ClientState::Home {
                name,
                session_id,
                focus,
                error,
            } => {
                *error = None;
                match focus {
                    HomeField::Name => name.pop(),
                    HomeField::SessionId => session_id.pop(),
                };
            }
            ClientState::InSession(view) => {
                view.input.pop();
            }
            _ => {}
        }
    }

    /// Switch focus between the home form fields.
    pub fn toggle_focus(&mut self) {
        if let ClientState::Home { focus, .. } = &mut self.state {
            *focus = match focus {
                HomeField::Name => HomeField::SessionId,
                HomeField::SessionId => HomeField::Name,
            };
        }
    }

    /// Handle Enter: build the message to send, if any.
    pub fn submit(&mut self) -> Option<ClientMessage> {
        match &mut self.state {
            ClientState::Home {
                name,
                session_id,
                error,
                ..
            } => {
                if name.trim().is_empty() {
                    *error = Some("Enter a name first".to_string());
                    return None;
                }
                let username = name.trim().to_string();
                if session_id.trim().is_empty() {
                    Some(ClientMessage::CreateSession { username })
                } else {
                    Some(ClientMessage::JoinSession {
                        session_id: session_id.trim().to_string(),
                        username,
                    })
                }
            }
            ClientState::InSession(view) => {
                let line = std::mem::take(&mut view.input);
                match parse_input(&line, view.round_active()) {
                    Ok(msg) => msg,
                    Err(reason) => {
                        view.push_log(LogKind::Error, reason);
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

/// Turn an input line into a message.
///
/// `/q <question> | <answer>`, `/start`, `/g <guess>` and `/c <text>` are
/// explicit; plain text guesses during a round and chats otherwise. A blank
/// line sends nothing.
pub fn parse_input(line: &str, round_active: bool) -> Result<Option<ClientMessage>, &'static str> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let msg = match command {
        "/q" => {
            let (question, answer) = rest
                .split_once('|')
                .ok_or("Usage: /q <question> | <answer>")?;
            ClientMessage::SetQuestion {
                question: question.trim().to_string(),
                answer: answer.trim().to_string(),
            }
        }
        "/start" => ClientMessage::StartGame,
        "/g" => ClientMessage::Guess {
            guess: rest.to_string(),
        },
        "/c" => ClientMessage::ChatMessage {
            msg: rest.to_string(),
        },
        _ if command.starts_with('/') => return Err("Unknown command. Try /q, /start, /g or /c"),
        _ if round_active => ClientMessage::Guess {
            guess: line.to_string(),
        },
        _ => ClientMessage::ChatMessage {
            msg: line.to_string(),
        },
    };

    Ok(Some(msg))
}

//! Trivia session server.
//!
//! Hosts any number of sessions over WebSocket. Each session has a game
//! master who sets a question and starts timed rounds; players guess and
//! chat.

mod error;
mod handlers;
mod registry;
mod server;
mod session;
mod state;
mod timer;

pub use error::GameError;
pub use handlers::handle_client_message;
pub use registry::SessionRegistry;
pub use server::{run, serve};
pub use session::{answers_match, ConnectionId, GameSession, GuessOutcome, Player};
pub use state::{ServerState, SharedState};
pub use timer::{RoundTicket, RoundTimer};

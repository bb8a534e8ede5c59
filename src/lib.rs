//! # trivia-room
//!
//! A small real-time multiplayer trivia server and terminal client.
//!
//! A game master creates a session and sets a question and answer. Once at
//! least three players are seated the master starts a timed round; the first
//! player to guess the answer scores. Players can chat throughout.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tokio::net::TcpListener;
//! use tokio::sync::Mutex;
//! use trivia_room::config::GameRules;
//! use trivia_room::server::{self, ServerState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:4040").await?;
//!     let state = Arc::new(Mutex::new(ServerState::new(GameRules::default())));
//!
//!     // Serve sessions until the process is stopped
//!     server::serve(listener, state).await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod protocol;
pub mod server;
pub mod terminal;

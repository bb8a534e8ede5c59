//! Trivia terminal client.
//!
//! Connects to a trivia server over WebSocket and drives a session from
//! the terminal.

mod client;
mod state;
mod ui;

pub use client::run;
pub use state::{parse_input, ClientApp, ClientState, HomeField, LogEntry, LogKind, SessionView};

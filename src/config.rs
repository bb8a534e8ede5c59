//! Runtime configuration: game rules and command-line arguments.

use std::time::Duration;

use clap::Args;

use crate::protocol::{DEFAULT_HOST, DEFAULT_PORT};

/// Rules applied to every session on a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// How long a round runs before it expires.
    pub round_duration: Duration,
    /// Guesses each player gets per round.
    pub attempts_per_round: u32,
    /// Points awarded for a correct guess.
    pub points_per_win: u32,
    /// Players (including the game master) needed to start a round.
    pub min_players: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(60),
            attempts_per_round: 3,
            points_per_win: 10,
            min_players: 3,
        }
    }
}

/// Arguments for `trivia-room serve`.
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "TRIVIA_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "TRIVIA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds a round runs before it expires
    #[arg(long, env = "TRIVIA_ROUND_SECS", default_value_t = 60)]
    pub round_secs: u64,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,
}

impl ServerArgs {
    /// Game rules with the configured round duration.
    pub fn rules(&self) -> GameRules {
        GameRules {
            round_duration: Duration::from_secs(self.round_secs),
            ..GameRules::default()
        }
    }
}

/// Arguments for `trivia-room play`.
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Server host to connect to
    #[arg(long, env = "TRIVIA_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Server port to connect to
    #[arg(short, long, env = "TRIVIA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

//! Per-session data and round transitions.
//!
//! A [`GameSession`] knows nothing about connections or delivery; the
//! server state drives it and broadcasts whatever it reports back.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::protocol::{PlayerSummary, ServerMessage};

use super::timer::RoundTimer;

/// Identity the transport assigns to a connection.
pub type ConnectionId = Uuid;

/// A player seated in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Trimmed, non-empty display name.
    pub username: String,
    /// Points won so far.
    pub score: u32,
    /// Guesses left in the current round.
    pub attempts: u32,
}

impl Player {
    fn new(username: String, attempts: u32) -> Self {
        Self {
            username,
            score: 0,
            attempts,
        }
    }
}

/// What happened to a single guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The player had already used every attempt; nothing changed.
    NoAttemptsLeft,
    /// Wrong answer, one attempt consumed.
    Wrong { attempts_left: u32 },
    /// Right answer; the round is over.
    Correct { winner: String },
}

/// One trivia session: its players, the current question and round state.
#[derive(Debug)]
pub struct GameSession {
    id: String,
    master_id: ConnectionId,
    players: IndexMap<ConnectionId, Player>,
    question: String,
    answer: String,
    in_progress: bool,
    round: u64,
    timer: Option<RoundTimer>,
}

impl GameSession {
    /// Create a session with its game master as the only player.
    pub fn new(id: String, master_id: ConnectionId, master_name: String, attempts: u32) -> Self {
        let mut players = IndexMap::new();
        players.insert(master_id, Player::new(master_name, attempts));

        Self {
            id,
            master_id,
            players,
            question: String::new(),
            answer: String::new(),
            in_progress: false,
            round: 0,
            timer: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn master_id(&self) -> ConnectionId {
        self.master_id
    }

    pub fn is_master(&self, connection: ConnectionId) -> bool {
        self.master_id == connection
    }

    /// Players in join order.
    pub fn players(&self) -> &IndexMap<ConnectionId, Player> {
        &self.players
    }

    pub fn player(&self, connection: ConnectionId) -> Option<&Player> {
        self.players.get(&connection)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Number of the latest round started, 0 before the first one.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether some player already goes by `username`.
    pub fn has_username(&self, username: &str) -> bool {
        self.players.values().any(|p| p.username == username)
    }

    pub(crate) fn add_player(&mut self, connection: ConnectionId, username: String, attempts: u32) {
        self.players
            .insert(connection, Player::new(username, attempts));
    }

    /// Remove a player, keeping the join order of the others.
    pub(crate) fn remove_player(&mut self, connection: ConnectionId) -> Option<Player> {
        self.players.shift_remove(&connection)
    }

    /// Hand the master role to the earliest-joined remaining player.
    pub(crate) fn promote_first(&mut self) -> Option<&Player> {
        let (&next, player) = self.players.first()?;
        self.master_id = next;
        Some(player)
    }

    pub(crate) fn set_question(&mut self, question: &str, answer: &str) {
        self.question = question.to_string();
        self.answer = answer.to_string();
    }

    /// Idle to Active. Returns the new round number.
    pub(crate) fn begin_round(&mut self, attempts: u32) -> u64 {
        self.in_progress = true;
        self.round += 1;
        self.reset_attempts(attempts);
        self.round
    }

    /// Active to Idle: cancel the timer and give everyone fresh attempts.
    pub(crate) fn end_round(&mut self, attempts: u32) {
        self.in_progress = false;
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.reset_attempts(attempts);
    }

    pub(crate) fn set_timer(&mut self, timer: RoundTimer) {
        self.timer = Some(timer);
    }

    /// Apply one guess from `connection`.
    ///
    /// Returns `None` if the connection is not a player here. A correct
    /// guess awards `points` and ends the round.
    pub(crate) fn guess(
        &mut self,
        connection: ConnectionId,
        guess: &str,
        attempts: u32,
        points: u32,
    ) -> Option<GuessOutcome> {
        let correct = answers_match(guess, &self.answer);
        let player = self.players.get_mut(&connection)?;

        if player.attempts == 0 {
            return Some(GuessOutcome::NoAttemptsLeft);
        }
        player.attempts -= 1;

        if !correct {
            return Some(GuessOutcome::Wrong {
                attempts_left: player.attempts,
            });
        }

        player.score += points;
        let winner = player.username.clone();
        self.end_round(attempts);
        Some(GuessOutcome::Correct { winner })
    }

    /// Public view pushed to the room after every state change.
    pub fn snapshot(&self) -> ServerMessage {
        ServerMessage::SessionUpdate {
            players: self
                .players
                .values()
                .map(|p| PlayerSummary {
                    username: p.username.clone(),
                    score: p.score,
                })
                .collect(),
            player_count: self.players.len(),
        }
    }

    fn reset_attempts(&mut self, attempts: u32) {
        for player in self.players.values_mut() {
            player.attempts = attempts;
        }
    }
}

/// Case-insensitive comparison ignoring surrounding whitespace.
pub fn answers_match(guess: &str, answer: &str) -> bool {
    guess.trim().to_lowercase() == answer.trim().to_lowercase()
}

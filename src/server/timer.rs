//! Round timer: a cancellable task that expires a round after a delay.

use std::time::Duration;

use tokio::task::JoinHandle;

use super::state::SharedState;

/// Names one round of one session.
///
/// A timer only ends the round it was armed for, so a late firing after a
/// winning guess or a new round is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTicket {
    pub session_id: String,
    pub round: u64,
}

/// Pending round expiry. Dropping the timer cancels it.
#[derive(Debug)]
pub struct RoundTimer {
    handle: JoinHandle<()>,
}

impl RoundTimer {
    /// Spawn a task that expires `ticket`'s round after `after`.
    pub fn arm(state: SharedState, ticket: RoundTicket, after: Duration) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            state.lock().await.expire_round(&ticket);
        });

        Self { handle }
    }

    /// Cancel the expiry. Safe to call more than once or after it fired.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

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

    /// Three players, question set, round started with an armed timer.
    async fn started_round() -> (
        SharedState,
        Vec<crate::server::ConnectionId>,
        Vec<mpsc::UnboundedReceiver<ServerMessage>>,
        RoundTicket,
    ) {
        let state: SharedState = Arc::new(Mutex::new(ServerState::new(GameRules::default())));
        let mut guard = state.lock().await;

        let mut ids = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            ids.push(guard.register_connection(tx));
            receivers.push(rx);
        }

        let session_id = guard.create_session(ids[0], "Alice").unwrap();
        guard.join_session(ids[1], &session_id, "Bob").unwrap();
        guard.join_session(ids[2], &session_id, "Carol").unwrap();
        guard.set_question(ids[0], "2+2", "4").unwrap();
        let ticket = guard.start_game(ids[0]).unwrap();
        let timer = RoundTimer::arm(Arc::clone(&state), ticket.clone(), Duration::from_secs(60));
        guard.attach_timer(&ticket, timer);
        drop(guard);

        for rx in receivers.iter_mut() {
            drain(rx);
        }
        (state, ids, receivers, ticket)
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_expires_round_after_duration() {
        let (state, ids, mut receivers, ticket) = started_round().await;

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(state
            .lock()
            .await
            .session(&ticket.session_id)
            .unwrap()
            .is_in_progress());

        tokio::time::sleep(Duration::from_secs(2)).await;

        let guard = state.lock().await;
        let session = guard.session(&ticket.session_id).unwrap();
        assert!(!session.is_in_progress());
        assert!(!session.has_pending_timer());
        assert!(session.players().values().all(|p| p.attempts == 3));
        assert_eq!(session.player(ids[1]).map(|p| p.score), Some(0));

        for rx in receivers.iter_mut() {
            let messages = drain(rx);
            assert!(messages.contains(&ServerMessage::GameEnded {
                msg: "Time expired".to_string(),
                answer: "4".to_string(),
                winner: None,
            }));
            assert!(matches!(
                messages.last(),
                Some(ServerMessage::SessionUpdate { player_count: 3, .. })
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_correct_guess_cancels_timer() {
        let (state, ids, mut receivers, ticket) = started_round().await;

        state.lock().await.guess(ids[1], "4").unwrap();
        assert!(!state
            .lock()
            .await
            .session(&ticket.session_id)
            .unwrap()
            .has_pending_timer());
        drain(&mut receivers[0]);

        tokio::time::sleep(Duration::from_secs(120)).await;

        let timeouts = drain(&mut receivers[0])
            .into_iter()
            .filter(|m| matches!(m, ServerMessage::GameEnded { winner: None, .. }))
            .count();
        assert_eq!(timeouts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_does_not_end_next_round() {
        let (state, ids, _receivers, first) = started_round().await;

        // Keep the first round's timer alive past its round.
        let stale = RoundTimer::arm(Arc::clone(&state), first.clone(), Duration::from_secs(30));
        state.lock().await.guess(ids[1], "4").unwrap();
        let second = state.lock().await.start_game(ids[0]).unwrap();
        assert_eq!(second.round, first.round + 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(stale.is_finished());
        assert!(state
            .lock()
            .await
            .session(&second.session_id)
            .unwrap()
            .is_in_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_outlives_master_disconnect() {
        let (state, ids, mut receivers, ticket) = started_round().await;

        state.lock().await.disconnect(ids[0]);
        for rx in receivers.iter_mut() {
            drain(rx);
        }
        assert!(state
            .lock()
            .await
            .session(&ticket.session_id)
            .unwrap()
            .has_pending_timer());

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(drain(&mut receivers[0]).is_empty());
        for rx in receivers.iter_mut().skip(1) {
            let messages = drain(rx);
            assert_eq!(messages.len(), 2);
            assert_eq!(
                messages[0],
                ServerMessage::GameEnded {
                    msg: "Time expired".to_string(),
                    answer: "4".to_string(),
                    winner: None,
                }
            );
            assert!(matches!(
                messages[1],
                ServerMessage::SessionUpdate { player_count: 2, .. }
            ));
        }
        assert!(!state
            .lock()
            .await
            .session(&ticket.session_id)
            .unwrap()
            .is_in_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_session_mid_round_stops_timer() {
        let (state, ids, mut receivers, _ticket) = started_round().await;

        {
            let mut guard = state.lock().await;
            for id in &ids {
                guard.disconnect(*id);
            }
            assert_eq!(guard.session_count(), 0);
        }
        for rx in receivers.iter_mut() {
            drain(rx);
        }

        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(state.lock().await.session_count(), 0);
        for rx in receivers.iter_mut() {
            assert!(drain(rx).is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let state: SharedState = Arc::new(Mutex::new(ServerState::new(GameRules::default())));
        let ticket = RoundTicket {
            session_id: "session-missing".to_string(),
            round: 1,
        };

        let timer = RoundTimer::arm(Arc::clone(&state), ticket.clone(), Duration::from_secs(1));
        timer.cancel();
        timer.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(timer.is_finished());

        let fired = RoundTimer::arm(state, ticket, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.is_finished());
        fired.cancel();
    }
}

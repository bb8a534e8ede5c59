//! Session registry with a connection-to-session membership index.

use std::collections::HashMap;

use super::session::{ConnectionId, GameSession};

/// All live sessions, keyed by session id.
///
/// `memberships` maps every seated connection to its session so lookups by
/// connection never scan the registry. A connection sits in at most one
/// session at a time.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, GameSession>,
    memberships: HashMap<ConnectionId, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn get(&self, session_id: &str) -> Option<&GameSession> {
        self.sessions.get(session_id)
    }

    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut GameSession> {
        self.sessions.get_mut(session_id)
    }

    /// Insert a new session and index its master as a member.
    pub fn insert(&mut self, session: GameSession) {
        let id = session.id().to_string();
        self.memberships.insert(session.master_id(), id.clone());
        self.sessions.insert(id, session);
    }

    /// Drop a session and every membership pointing at it.
    pub fn remove(&mut self, session_id: &str) -> Option<GameSession> {
        let session = self.sessions.remove(session_id)?;
        self.memberships.retain(|_, id| id != session_id);
        Some(session)
    }

    pub fn add_member(&mut self, connection: ConnectionId, session_id: &str) {
        self.memberships.insert(connection, session_id.to_string());
    }

    /// Forget a connection's membership, returning the session it was in.
    pub fn remove_member(&mut self, connection: ConnectionId) -> Option<String> {
        self.memberships.remove(&connection)
    }

    pub fn session_id_of(&self, connection: ConnectionId) -> Option<&str> {
        self.memberships.get(&connection).map(String::as_str)
    }

    /// The session `connection` plays in.
    pub fn session_of(&self, connection: ConnectionId) -> Option<&GameSession> {
        let id = self.memberships.get(&connection)?;
        self.sessions.get(id)
    }

    pub fn session_of_mut(&mut self, connection: ConnectionId) -> Option<&mut GameSession> {
        let id = self.memberships.get(&connection)?;
        self.sessions.get_mut(id)
    }

    /// The session `connection` is game master of.
    pub fn mastered_by_mut(&mut self, connection: ConnectionId) -> Option<&mut GameSession> {
        self.session_of_mut(connection)
            .filter(|session| session.is_master(connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn new_session(master: ConnectionId) -> GameSession {
        GameSession::new(format!("session-{master}"), master, "Alice".to_string(), 3)
    }

    #[test]
    fn test_insert_indexes_master() {
        let mut registry = SessionRegistry::new();
        let master = Uuid::new_v4();
        registry.insert(new_session(master));

        let expected = format!("session-{master}");
        assert_eq!(registry.session_id_of(master), Some(expected.as_str()));
        assert!(registry.mastered_by_mut(master).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_members_are_not_masters() {
        let mut registry = SessionRegistry::new();
        let master = Uuid::new_v4();
        let member = Uuid::new_v4();
        registry.insert(new_session(master));
        let id = format!("session-{master}");
        registry.add_member(member, &id);

        assert!(registry.session_of(member).is_some());
        assert!(registry.mastered_by_mut(member).is_none());
    }

    #[test]
    fn test_remove_clears_memberships() {
        let mut registry = SessionRegistry::new();
        let master = Uuid::new_v4();
        let member = Uuid::new_v4();
        registry.insert(new_session(master));
        let id = format!("session-{master}");
        registry.add_member(member, &id);

        assert!(registry.remove(&id).is_some());
        assert!(registry.is_empty());
        assert!(registry.session_of(master).is_none());
        assert!(registry.session_of(member).is_none());
        assert!(!registry.contains(&id));
    }
}

//! Explicit "who is logged in" bookkeeping.
//!
//! The current user is a `SessionId` handed to the caller at login and
//! resolved on every request, never a process-global.

use std::collections::HashMap;

use thiserror::Error;

use minibank_core::SessionId;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("not logged in")]
    NotLoggedIn,
}

/// Open sessions keyed by id, each bound to one principal `P`.
#[derive(Debug, Clone)]
pub struct SessionRegistry<P> {
    sessions: HashMap<SessionId, P>,
}

impl<P> Default for SessionRegistry<P> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl<P> SessionRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `principal` and return its handle.
    pub fn open(&mut self, principal: P) -> SessionId {
        let id = SessionId::new();
        self.sessions.insert(id, principal);
        id
    }

    pub fn resolve(&self, id: &SessionId) -> Result<&P, SessionError> {
        self.sessions.get(id).ok_or(SessionError::NotLoggedIn)
    }

    /// End a session; the id is unusable afterwards.
    pub fn close(&mut self, id: &SessionId) -> Result<P, SessionError> {
        self.sessions.remove(id).ok_or(SessionError::NotLoggedIn)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

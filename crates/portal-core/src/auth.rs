//! Token-based auth context
//!
//! One opaque token, kept in memory and mirrored to session storage. There
//! is no expiry, refresh or server-side check; the token only gates routes.

use std::fmt;
use std::rc::Rc;

use tracing::info;

use crate::storage::{KeyValueStore, StorageError, SESSION_KEYS, TOKEN_KEY, USER_EMAIL_KEY};

#[derive(Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { token: String },
}

// Keeps tokens out of logs and panic messages
impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Anonymous => f.write_str("Anonymous"),
            AuthState::Authenticated { .. } => f.write_str("Authenticated { token: <redacted> }"),
        }
    }
}

pub struct AuthContext {
    store: Rc<dyn KeyValueStore>,
    state: AuthState,
}

impl AuthContext {
    /// Start anonymous without reading storage
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: AuthState::Anonymous,
        }
    }

    /// Rehydrate from the token left in storage, if any
    pub fn restore(store: Rc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let state = match store.get(TOKEN_KEY)? {
            Some(token) if !token.is_empty() => AuthState::Authenticated { token },
            _ => AuthState::Anonymous,
        };
        Ok(Self { store, state })
    }

    pub fn login(&mut self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        self.store.set(TOKEN_KEY, &token)?;
        self.state = AuthState::Authenticated { token };
        info!("Logged in");
        Ok(())
    }

    /// Clears the token and every session identifier
    pub fn logout(&mut self) -> Result<(), StorageError> {
        for key in SESSION_KEYS {
            self.store.remove(key)?;
        }
        self.state = AuthState::Anonymous;
        info!("Logged out");
        Ok(())
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn token(&self) -> Option<&str> {
        match &self.state {
            AuthState::Authenticated { token } => Some(token),
            AuthState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { .. })
    }

    pub fn user_email(&self) -> Result<Option<String>, StorageError> {
        self.store.get(USER_EMAIL_KEY)
    }

    pub fn remember_email(&self, email: &str) -> Result<(), StorageError> {
        self.store.set(USER_EMAIL_KEY, email)
    }

    pub fn store(&self) -> &Rc<dyn KeyValueStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SESSION_ID_KEY};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_login_stores_token() {
        let store = Rc::new(MemoryStore::new());
        let mut auth = AuthContext::new(store.clone());

        auth.login("tok123").unwrap();

        assert_eq!(auth.token(), Some("tok123"));
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok123"));
    }

    #[test]
    fn test_logout_clears_session_keys() {
        let store = Rc::new(MemoryStore::new());
        store.set(SESSION_ID_KEY, "abc").unwrap();
        let mut auth = AuthContext::new(store.clone());
        auth.login("tok123").unwrap();
        auth.remember_email("a@b.in").unwrap();

        auth.logout().unwrap();

        assert!(!auth.is_authenticated());
        assert!(store.is_empty());
    }

    #[test]
    fn test_restore() {
        let store = Rc::new(MemoryStore::new());
        assert!(!AuthContext::restore(store.clone()).unwrap().is_authenticated());

        store.set(TOKEN_KEY, "persisted").unwrap();
        let auth = AuthContext::restore(store).unwrap();
        assert_eq!(auth.token(), Some("persisted"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let state = AuthState::Authenticated {
            token: "secret".to_string(),
        };
        assert!(!format!("{:?}", state).contains("secret"));
    }
}

//! Shared session context
//!
//! One [`Session`] is handed to every resource client. It holds the bearer
//! token with its decoded claims and publishes [`AuthState`] changes on a
//! watch channel, so views can send the user back to login when it flips to
//! [`AuthState::LoggedOut`].

use std::sync::RwLock;

use tokio::sync::watch;

use super::{
    claims::{decode_claims, Capabilities, TokenClaims},
    store::TokenStore,
    ClientResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    LoggedIn { username: String, is_admin: bool },
}

struct Credentials {
    token: String,
    claims: TokenClaims,
}

pub struct Session {
    store: Box<dyn TokenStore>,
    current: RwLock<Option<Credentials>>,
    state: watch::Sender<AuthState>,
}

impl Session {
    /// Logged-out session persisting tokens in `store`
    pub fn new(store: impl TokenStore + 'static) -> Self {
        let (state, _) = watch::channel(AuthState::LoggedOut);
        Self {
            store: Box::new(store),
            current: RwLock::new(None),
            state,
        }
    }

    /// Session resumed from a persisted token
    ///
    /// A token that cannot be decoded is removed from the store and the
    /// session starts logged out.
    pub fn restore(store: impl TokenStore + 'static) -> Self {
        let session = Self::new(store);
        match session.store.load() {
            Ok(Some(token)) => {
                if let Err(e) = session.start(token) {
                    tracing::warn!("Discarding stored token: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not read stored token: {}", e),
        }
        session
    }

    /// Adopt a freshly issued token
    ///
    /// On a decode failure the session is logged out and the stored token
    /// cleared.
    pub fn start(&self, token: String) -> ClientResult<()> {
        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::error!("Token decode failed: {}", e);
                self.clear();
                return Err(e);
            }
        };

        self.store.save(&token)?;
        let state = AuthState::LoggedIn {
            username: claims.sub.clone(),
            is_admin: claims.is_admin,
        };
        if let Ok(mut current) = self.current.write() {
            *current = Some(Credentials { token, claims });
        }
        self.state.send_replace(state);
        Ok(())
    }

    /// Log out explicitly
    pub fn logout(&self) -> ClientResult<()> {
        self.clear();
        Ok(())
    }

    /// Handle a 401 on a call made with `token`
    ///
    /// Only the first call failing with the current token logs out; later
    /// ones, or ones carrying a token that was already replaced, are ignored.
    /// Returns whether this call logged the session out.
    pub fn expire_token(&self, token: &str) -> bool {
        let expired = match self.current.write() {
            Ok(mut current) => {
                if current.as_ref().map(|c| c.token.as_str()) == Some(token) {
                    *current = None;
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        };

        if expired {
            tracing::info!("Session expired, logging out");
            if let Err(e) = self.store.clear() {
                tracing::warn!("Could not clear stored token: {}", e);
            }
            self.state.send_replace(AuthState::LoggedOut);
        }
        expired
    }

    fn clear(&self) {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!("Could not clear stored token: {}", e);
        }
        self.state.send_replace(AuthState::LoggedOut);
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .ok()
            .and_then(|c| c.as_ref().map(|c| c.token.clone()))
    }

    pub fn claims(&self) -> Option<TokenClaims> {
        self.current
            .read()
            .ok()
            .and_then(|c| c.as_ref().map(|c| c.claims.clone()))
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::from_claims(self.claims().as_ref())
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{claims::unsigned_token, store::MemoryTokenStore};
    use serde_json::json;
    use std::sync::Arc;

    fn admin_token() -> String {
        unsigned_token(&json!({ "sub": "cadre", "user_id": 1, "is_admin": true }))
    }

    #[test]
    fn test_start_publishes_login() {
        let session = Session::new(MemoryTokenStore::new());
        let rx = session.subscribe();
        session.start(admin_token()).unwrap();

        assert_eq!(
            *rx.borrow(),
            AuthState::LoggedIn {
                username: "cadre".to_string(),
                is_admin: true
            }
        );
        assert!(session.capabilities().manage_users);
    }

    #[test]
    fn test_restore_discards_undecodable_token() {
        let session = Session::restore(MemoryTokenStore::with_token("garbage"));
        assert!(!session.is_logged_in());
        assert_eq!(session.state(), AuthState::LoggedOut);
        assert_eq!(session.store.load().unwrap(), None);
    }

    #[test]
    fn test_restore_resumes_valid_token() {
        let session = Session::restore(MemoryTokenStore::with_token(&admin_token()));
        assert!(session.is_logged_in());
        assert!(session.capabilities().direct_request);
    }

    #[test]
    fn test_decode_failure_logs_out() {
        let session = Session::new(MemoryTokenStore::new());
        session.start(admin_token()).unwrap();
        assert!(session.start("not-a-token".to_string()).is_err());
        assert_eq!(session.state(), AuthState::LoggedOut);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_stale_token_does_not_expire_new_login() {
        let session = Session::new(MemoryTokenStore::new());
        let old = admin_token();
        session.start(old.clone()).unwrap();
        let new = unsigned_token(&json!({ "sub": "cadre", "is_admin": false }));
        session.start(new).unwrap();

        assert!(!session.expire_token(&old));
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn test_concurrent_expiry_logs_out_once() {
        let session = Arc::new(Session::new(MemoryTokenStore::new()));
        let token = admin_token();
        session.start(token.clone()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = session.clone();
                let token = token.clone();
                tokio::spawn(async move { session.expire_token(&token) })
            })
            .collect();

        let mut fired = 0;
        for handle in handles {
            if handle.await.unwrap() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert_eq!(session.state(), AuthState::LoggedOut);
    }
}

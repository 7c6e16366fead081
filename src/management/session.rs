//! Per-user session: OAuth login state, access token and lookup caches.
//!
//! The login follows the authorization-code grant:
//!
//! ```text
//! Unauthenticated --begin_login--> PendingCode --complete_login--> Authenticated
//!                                       |                              |
//!                                       +--> Failed --take_failure--> Unauthenticated
//!                                                                      ^
//!                 Authenticated --logout / invalidate------------------+
//! ```
//!
//! The pending code verifier is taken out of the session before the exchange,
//! so an authorization code is sent to the token endpoint at most once even if
//! the browser reloads the callback URL.

use std::{collections::HashMap, future::Future, sync::Arc};

use tokio::sync::{Mutex, RwLock};

use crate::{
    Res,
    error::{AppError, AuthError},
    management::LookupCache,
    spotify::AuthorizationServer,
    types::{AccessToken, Artist, Coordinates, Token},
    utils,
};

#[derive(Debug)]
pub enum AuthState {
    Unauthenticated,
    PendingCode { state: String, code_verifier: String },
    Authenticated { token: Token },
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    /// The session already held a token; no exchange happened.
    AlreadyAuthenticated,
}

/// Caches living as long as the session that owns them.
#[derive(Clone, Default)]
pub struct SessionCaches {
    /// Artist metadata by Spotify artist id.
    pub artists: Arc<LookupCache<String, Artist>>,
    /// Origin city by artist name.
    pub origins: Arc<LookupCache<String, Option<String>>>,
    /// Coordinates by city name.
    pub coordinates: Arc<LookupCache<String, Option<Coordinates>>>,
}

pub struct Session {
    auth: AuthState,
    caches: SessionCaches,
}

pub type SharedSession = Arc<Mutex<Session>>;

impl Session {
    pub fn new() -> Self {
        Self {
            auth: AuthState::Unauthenticated,
            caches: SessionCaches::default(),
        }
    }

    pub fn shared() -> SharedSession {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn state(&self) -> &AuthState {
        &self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated { .. })
    }

    /// Starts a login and returns the provider URL to show the user.
    ///
    /// Returns `None` when the session is already authenticated. A login that
    /// is still pending is replaced, its code can no longer be redeemed.
    pub fn begin_login(&mut self, server: &dyn AuthorizationServer) -> Res<Option<String>> {
        if self.is_authenticated() {
            return Ok(None);
        }

        let state = utils::generate_state();
        let code_verifier = utils::generate_code_verifier();
        let url = server.authorize_url(&state, &utils::generate_code_challenge(&code_verifier))?;

        self.auth = AuthState::PendingCode {
            state,
            code_verifier,
        };
        Ok(Some(url))
    }

    /// Redeems the authorization code the provider redirected back with.
    pub async fn complete_login(
        &mut self,
        server: &dyn AuthorizationServer,
        code: &str,
        state: &str,
    ) -> Res<LoginOutcome> {
        let (expected_state, code_verifier) =
            match std::mem::replace(&mut self.auth, AuthState::Unauthenticated) {
                AuthState::PendingCode {
                    state,
                    code_verifier,
                } => (state, code_verifier),
                AuthState::Authenticated { token } => {
                    self.auth = AuthState::Authenticated { token };
                    return Ok(LoginOutcome::AlreadyAuthenticated);
                }
                other => {
                    self.auth = other;
                    return Err(AuthError::NoPendingLogin.into());
                }
            };

        if expected_state != state {
            let err = AuthError::StateMismatch;
            tracing::warn!("Login callback carried an unexpected state");
            self.auth = AuthState::Failed {
                reason: err.to_string(),
            };
            return Err(err.into());
        }

        match server.exchange_code(code, &code_verifier).await {
            Ok(token) => {
                tracing::info!(scope = %token.scope, "Login completed");
                self.auth = AuthState::Authenticated { token };
                Ok(LoginOutcome::Authenticated)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token exchange failed");
                self.auth = AuthState::Failed {
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Records a login the provider refused, e.g. `error=access_denied`.
    ///
    /// A session that already holds a token keeps it.
    pub fn reject_login(&mut self, reason: &str) -> AuthError {
        let err = AuthError::Denied(reason.to_string());
        if !self.is_authenticated() {
            self.auth = AuthState::Failed {
                reason: err.to_string(),
            };
        }
        err
    }

    /// Returns the reason of a failed login once and resets the session.
    pub fn take_failure(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.auth, AuthState::Unauthenticated) {
            AuthState::Failed { reason } => Some(reason),
            other => {
                self.auth = other;
                None
            }
        }
    }

    pub fn logout(&mut self) {
        self.auth = AuthState::Unauthenticated;
        self.caches = SessionCaches::default();
        tracing::info!("Session logged out");
    }

    /// Drops the token after the provider rejected it.
    pub fn invalidate(&mut self) {
        if self.is_authenticated() {
            tracing::warn!("Access token rejected, session reset");
        }
        self.auth = AuthState::Unauthenticated;
    }

    pub fn access_token(&self) -> Result<AccessToken, AuthError> {
        match &self.auth {
            AuthState::Authenticated { token } => Ok(token.access_token.clone()),
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    /// Unix timestamp the token expires at, informational only.
    pub fn expires_at(&self) -> Option<u64> {
        match &self.auth {
            AuthState::Authenticated { token } => Some(token.expires_at()),
            _ => None,
        }
    }

    pub fn caches(&self) -> SessionCaches {
        self.caches.clone()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `op` with the session's token and caches.
///
/// The session lock is only held to read the token, not during the calls. If
/// `op` fails with an authorization error the session is invalidated, so every
/// later call is refused until the user logs in again. A token obtained while
/// `op` was running is left alone; only the token `op` used is dropped.
pub async fn run_authorized<T, F, Fut>(session: &SharedSession, op: F) -> Res<T>
where
    F: FnOnce(AccessToken, SessionCaches) -> Fut,
    Fut: Future<Output = Res<T>>,
{
    let (token, caches) = {
        let session = session.lock().await;
        (session.access_token()?, session.caches())
    };

    let used = token.clone();
    let result = op(token, caches).await;
    if let Err(AppError::Auth(_)) = &result {
        let mut session = session.lock().await;
        if session.access_token().is_ok_and(|current| current == used) {
            session.invalidate();
        }
    }
    result
}

/// All live sessions keyed by the id stored in the browser cookie.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn create(&self) -> (String, SharedSession) {
        let id = utils::generate_session_id();
        let session = Session::shared();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::clone(&session));
        (id, session)
    }

    /// Returns the session for `id`, creating a fresh one if it is unknown.
    /// The returned flag is `true` when a new session was created.
    pub async fn get_or_create(&self, id: Option<&str>) -> (String, SharedSession, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                return (id.to_string(), session, false);
            }
        }
        let (id, session) = self.create().await;
        (id, session, true)
    }

    pub async fn remove(&self, id: &str) -> Option<SharedSession> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

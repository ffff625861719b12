//! Session manager: the single source of truth for who is logged in.
//!
//! State starts as `Unknown` and settles on the first `hydrate()`.
//! `hydrate`, `login` and `establish` are serialized behind an async
//! lock. `logout` is synchronous and may land while one of them is in
//! flight; every commit bumps a generation counter, and a request that
//! started under an older generation throws its result away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::{LoginCredentials, LoginResponse, User};

use super::{AuthError, IdentityService, TokenStore};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Startup, before the first hydrate settles
    #[default]
    Unknown,
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SessionState::Unknown)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Result of reconciling the stored token with the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// Nothing stored; no request was made
    NoCredential,
    Restored(User),
    /// The token was dropped; the reason is informational only
    Invalidated(AuthError),
}

/// Clears the in-flight flag when an operation finishes or is dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    identity: Arc<dyn IdentityService>,
    state: watch::Sender<SessionState>,
    /// Serializes hydrate/login/establish
    op_lock: tokio::sync::Mutex<()>,
    /// Session generation. Held for the duration of every commit.
    generation: Mutex<u64>,
    busy: AtomicBool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>, identity: Arc<dyn IdentityService>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            store,
            identity,
            state,
            op_lock: tokio::sync::Mutex::new(()),
            generation: Mutex::new(0),
            busy: AtomicBool::new(false),
        }
    }

    // ===== Accessors =====

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Cached account, without touching the network
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Receiver that observes every transition
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// True while a hydrate or login request is outstanding
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Wait for the first hydrate to settle.
    pub async fn wait_until_known(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let settled = rx.wait_for(SessionState::is_known).await.map(|s| s.clone());
        // The sender lives in `self`, so the channel cannot close here.
        settled.unwrap_or_else(|_| self.state())
    }

    // ===== Transitions =====

    /// Reconcile the stored token with the server.
    ///
    /// With nothing stored this settles on `Anonymous` without a request.
    /// Otherwise it makes exactly one identity fetch; any failure clears
    /// the stored token and settles on `Anonymous`.
    pub async fn hydrate(&self) -> HydrateOutcome {
        let _op = self.op_lock.lock().await;
        let _busy = BusyGuard::set(&self.busy);
        let started = *self.generation.lock();

        let Some(token) = self.store.read() else {
            debug!("No stored token");
            let mut generation = self.generation.lock();
            *generation += 1;
            self.state.send_replace(SessionState::Anonymous);
            return HydrateOutcome::NoCredential;
        };

        let fetched = self.identity.fetch_current_user(&token).await;
        drop(token);

        let mut generation = self.generation.lock();
        if *generation != started {
            debug!("Session changed during hydrate, discarding result");
            return HydrateOutcome::Invalidated(AuthError::Superseded);
        }
        *generation += 1;

        match fetched {
            Ok(user) => {
                debug!(user_id = %user.id, "Session restored");
                self.state.send_replace(SessionState::Authenticated(user.clone()));
                HydrateOutcome::Restored(user)
            }
            Err(e) => {
                let reason = AuthError::from_identity_fetch(e);
                warn!(reason = %reason, "Stored token invalid, logging out");
                self.clear_store();
                self.state.send_replace(SessionState::Anonymous);
                HydrateOutcome::Invalidated(reason)
            }
        }
    }

    /// Log in with email and password.
    ///
    /// On success the token is stored and the returned account cached
    /// together. On failure nothing changes. Refused without a request
    /// when a session is already authenticated.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, AuthError> {
        let _op = self.op_lock.lock().await;
        if self.state.borrow().is_authenticated() {
            warn!("Login attempted while authenticated");
            return Err(AuthError::AlreadyAuthenticated);
        }

        let _busy = BusyGuard::set(&self.busy);
        let started = *self.generation.lock();

        let response = match self.identity.login(credentials).await {
            Ok(response) => response,
            Err(e) => {
                let err = AuthError::from_login(e);
                warn!(error = %err, "Login failed");
                return Err(err);
            }
        };

        self.commit(started, response)
    }

    /// Adopt a token and account obtained outside `login`.
    pub async fn establish(&self, response: LoginResponse) -> Result<User, AuthError> {
        let _op = self.op_lock.lock().await;
        let started = *self.generation.lock();
        self.commit(started, response)
    }

    /// Replace the cached account while authenticated (e.g. after a
    /// profile edit). Returns false and changes nothing otherwise.
    pub fn update_user(&self, user: User) -> bool {
        let _generation = self.generation.lock();
        let replaced = self.state.send_if_modified(|state| match state {
            SessionState::Authenticated(current) if current.id == user.id => {
                *current = user;
                true
            }
            _ => false,
        });
        if !replaced {
            debug!("Ignoring user update outside of a matching session");
        }
        replaced
    }

    /// Forget the session. Never fails and makes no request.
    pub fn logout(&self) {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.clear_store();
        self.state.send_replace(SessionState::Anonymous);
        info!("Logged out");
    }

    fn commit(&self, started: u64, response: LoginResponse) -> Result<User, AuthError> {
        let mut generation = self.generation.lock();
        if *generation != started {
            debug!("Logged out during login, discarding result");
            return Err(AuthError::Superseded);
        }
        if self.state.borrow().is_authenticated() {
            return Err(AuthError::AlreadyAuthenticated);
        }

        self.store
            .save(&response.token)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        *generation += 1;
        let user = response.user;
        info!(user_id = %user.id, "Logged in");
        self.state.send_replace(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use tokio::sync::Notify;

    use super::*;
    use crate::api::ApiError;
    use crate::auth::MemoryTokenStore;

    /// Identity service that replays scripted answers and counts calls.
    #[derive(Default)]
    struct FakeIdentity {
        logins: Mutex<VecDeque<Result<LoginResponse, ApiError>>>,
        lookups: Mutex<VecDeque<Result<User, ApiError>>>,
        login_calls: AtomicUsize,
        lookup_calls: AtomicUsize,
        seen_tokens: Mutex<Vec<String>>,
        /// When set, login waits here until released
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
        /// Same, for the identity fetch
        lookup_gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl FakeIdentity {
        fn login_ok(self, token: &str, user: User) -> Self {
            self.logins.lock().push_back(Ok(LoginResponse {
                token: token.to_string(),
                user,
            }));
            self
        }

        fn login_err(self, err: ApiError) -> Self {
            self.logins.lock().push_back(Err(err));
            self
        }

        fn lookup_ok(self, user: User) -> Self {
            self.lookups.lock().push_back(Ok(user));
            self
        }

        fn lookup_err(self, err: ApiError) -> Self {
            self.lookups.lock().push_back(Err(err));
            self
        }

        fn logins(&self) -> usize {
            self.login_calls.load(Ordering::SeqCst)
        }

        fn lookups(&self) -> usize {
            self.lookup_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityService for FakeIdentity {
        async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            self.logins
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::InvalidResponse("unscripted login".into())))
        }

        async fn fetch_current_user(&self, token: &str) -> Result<User, ApiError> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_tokens.lock().push(token.to_string());
            if let Some((entered, release)) = &self.lookup_gate {
                entered.notify_one();
                release.notified().await;
            }
            self.lookups
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::InvalidResponse("unscripted lookup".into())))
        }
    }

    fn user_a() -> User {
        User::new("u1", "A")
    }

    fn creds() -> LoginCredentials {
        LoginCredentials::new("a@b.com", "x")
    }

    fn rejected() -> ApiError {
        ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"Invalid credentials"}"#)
    }

    fn manager(store: &MemoryTokenStore, identity: &Arc<FakeIdentity>) -> SessionManager {
        SessionManager::new(Arc::new(store.clone()), identity.clone())
    }

    /// Token present exactly when a user is cached.
    fn assert_consistent(session: &SessionManager, store: &MemoryTokenStore) {
        assert_eq!(store.read().is_some(), session.current_user().is_some());
    }

    #[tokio::test]
    async fn test_hydrate_without_token_makes_no_request() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default());
        let session = manager(&store, &identity);

        assert_eq!(session.state(), SessionState::Unknown);
        assert_eq!(session.hydrate().await, HydrateOutcome::NoCredential);
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(identity.lookups(), 0);
        assert_consistent(&session, &store);
    }

    #[tokio::test]
    async fn test_hydrate_restores_user_with_stored_token() {
        let store = MemoryTokenStore::with_token("t1");
        let identity = Arc::new(FakeIdentity::default().lookup_ok(user_a()));
        let session = manager(&store, &identity);

        assert_eq!(session.hydrate().await, HydrateOutcome::Restored(user_a()));
        assert_eq!(session.current_user(), Some(user_a()));
        assert_eq!(identity.lookups(), 1);
        assert_eq!(*identity.seen_tokens.lock(), vec!["t1".to_string()]);
        assert_consistent(&session, &store);
    }

    #[tokio::test]
    async fn test_hydrate_rejected_token_clears_store() {
        let store = MemoryTokenStore::with_token("stale");
        let identity = Arc::new(FakeIdentity::default().lookup_err(ApiError::Unauthorized(None)));
        let session = manager(&store, &identity);

        assert_eq!(
            session.hydrate().await,
            HydrateOutcome::Invalidated(AuthError::SessionExpired)
        );
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.read(), None);

        // Second hydrate looks like a fresh install.
        assert_eq!(session.hydrate().await, HydrateOutcome::NoCredential);
        assert_eq!(identity.lookups(), 1);
        assert_consistent(&session, &store);
    }

    #[tokio::test]
    async fn test_hydrate_unreachable_server_also_logs_out() {
        let offline = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("relative URL should not build");
        let store = MemoryTokenStore::with_token("t1");
        let identity = Arc::new(
            FakeIdentity::default()
                .lookup_err(ApiError::NetworkError(offline))
                .lookup_err(ApiError::ServerError("down".into())),
        );
        let session = manager(&store, &identity);

        let outcome = session.hydrate().await;
        assert!(matches!(outcome, HydrateOutcome::Invalidated(AuthError::Network(_))));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.read(), None);

        store.save("t2").unwrap();
        let outcome = session.hydrate().await;
        assert!(matches!(outcome, HydrateOutcome::Invalidated(AuthError::Service(_))));
        assert_eq!(store.read(), None);
    }

    #[tokio::test]
    async fn test_rehydrate_while_authenticated_revalidates() {
        let store = MemoryTokenStore::with_token("t1");
        let identity = Arc::new(
            FakeIdentity::default()
                .lookup_ok(user_a())
                .lookup_err(ApiError::Unauthorized(None)),
        );
        let session = manager(&store, &identity);

        session.hydrate().await;
        assert!(session.state().is_authenticated());

        session.hydrate().await;
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(identity.lookups(), 2);
        assert_consistent(&session, &store);
    }

    #[tokio::test]
    async fn test_login_logout_hydrate_cycle() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default().login_ok("t1", user_a()));
        let session = manager(&store, &identity);

        session.hydrate().await;
        let user = session.login(&creds()).await.unwrap();
        assert_eq!(user, user_a());
        assert_eq!(session.state(), SessionState::Authenticated(user_a()));
        assert_eq!(store.read().as_deref(), Some("t1"));
        // The login payload is cached as-is, no follow-up lookup.
        assert_eq!(identity.lookups(), 0);

        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.read(), None);

        assert_eq!(session.hydrate().await, HydrateOutcome::NoCredential);
        assert_eq!(identity.lookups(), 0);
        assert_consistent(&session, &store);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_untouched() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default().login_err(rejected()));
        let session = manager(&store, &identity);
        session.hydrate().await;

        let err = session.login(&creds()).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials("Invalid credentials".to_string()));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.read(), None);
        assert_eq!(identity.logins(), 1);
    }

    #[tokio::test]
    async fn test_failed_login_before_hydrate_stays_unknown() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default().login_err(rejected()));
        let session = manager(&store, &identity);

        assert!(session.login(&creds()).await.is_err());
        assert_eq!(session.state(), SessionState::Unknown);
    }

    #[tokio::test]
    async fn test_login_refuses_to_replace_authenticated_session() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(
            FakeIdentity::default()
                .login_ok("t1", user_a())
                .login_ok("t2", User::new("u2", "B")),
        );
        let session = manager(&store, &identity);
        session.hydrate().await;
        session.login(&creds()).await.unwrap();

        let err = session.login(&creds()).await.unwrap_err();
        assert_eq!(err, AuthError::AlreadyAuthenticated);
        assert_eq!(identity.logins(), 1);
        assert_eq!(session.current_user(), Some(user_a()));
        assert_eq!(store.read().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_reload_restores_session_without_relogin() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default().login_ok("t1", user_a()));
        let first = manager(&store, &identity);
        first.hydrate().await;
        first.login(&creds()).await.unwrap();
        drop(first);

        let identity = Arc::new(FakeIdentity::default().lookup_ok(user_a()));
        let reloaded = manager(&store, &identity);
        assert_eq!(reloaded.state(), SessionState::Unknown);
        assert_eq!(reloaded.hydrate().await, HydrateOutcome::Restored(user_a()));
        assert_eq!(reloaded.state(), SessionState::Authenticated(user_a()));
        assert_eq!(identity.logins(), 0);
    }

    #[tokio::test]
    async fn test_logout_during_login_wins() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut fake = FakeIdentity::default().login_ok("t1", user_a());
        fake.gate = Some((entered.clone(), release.clone()));
        let identity = Arc::new(fake);
        let store = MemoryTokenStore::new();
        let session = Arc::new(manager(&store, &identity));
        session.hydrate().await;

        let task = {
            let session = session.clone();
            tokio::spawn(async move { session.login(&creds()).await })
        };
        entered.notified().await;
        assert!(session.is_busy());

        session.logout();
        release.notify_one();

        let result = task.await.unwrap();
        assert_eq!(result, Err(AuthError::Superseded));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.read(), None);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_logout_during_hydrate_wins() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut fake = FakeIdentity::default().lookup_ok(user_a());
        fake.lookup_gate = Some((entered.clone(), release.clone()));
        let identity = Arc::new(fake);
        let store = MemoryTokenStore::with_token("t1");
        let session = Arc::new(manager(&store, &identity));

        let task = {
            let session = session.clone();
            tokio::spawn(async move { session.hydrate().await })
        };
        entered.notified().await;
        assert!(session.is_busy());

        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
        release.notify_one();

        // The late user must not resurrect the session or the token.
        let outcome = task.await.unwrap();
        assert_eq!(outcome, HydrateOutcome::Invalidated(AuthError::Superseded));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.read(), None);
        assert!(!session.is_busy());
        assert_consistent(&session, &store);
    }

    #[tokio::test]
    async fn test_login_waits_for_inflight_hydrate() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let user_b = User::new("u2", "B");
        let mut fake = FakeIdentity::default()
            .lookup_err(ApiError::Unauthorized(None))
            .login_ok("t2", user_b.clone());
        fake.lookup_gate = Some((entered.clone(), release.clone()));
        let identity = Arc::new(fake);
        let store = MemoryTokenStore::with_token("stale");
        let session = Arc::new(manager(&store, &identity));

        let hydrating = {
            let session = session.clone();
            tokio::spawn(async move { session.hydrate().await })
        };
        entered.notified().await;

        let logging_in = {
            let session = session.clone();
            tokio::spawn(async move { session.login(&creds()).await })
        };
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        // Login is parked on the operation lock, not on the network.
        assert_eq!(identity.logins(), 0);
        assert_eq!(session.state(), SessionState::Unknown);

        release.notify_one();
        assert_eq!(
            hydrating.await.unwrap(),
            HydrateOutcome::Invalidated(AuthError::SessionExpired)
        );
        assert_eq!(logging_in.await.unwrap(), Ok(user_b.clone()));

        // The hydrate's clear ran before the login's save.
        assert_eq!(store.read().as_deref(), Some("t2"));
        assert_eq!(session.state(), SessionState::Authenticated(user_b));
        assert_eq!(identity.logins(), 1);
        assert_eq!(identity.lookups(), 1);
        assert!(!session.is_busy());
        assert_consistent(&session, &store);
    }

    #[tokio::test]
    async fn test_logout_is_safe_when_anonymous() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default());
        let session = manager(&store, &identity);

        session.logout();
        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(identity.logins() + identity.lookups(), 0);
    }

    #[tokio::test]
    async fn test_logout_before_hydrate_clears_token_offline() {
        let store = MemoryTokenStore::with_token("t1");
        let identity = Arc::new(FakeIdentity::default().lookup_ok(user_a()));
        let session = manager(&store, &identity);

        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.read(), None);
        assert_eq!(identity.logins() + identity.lookups(), 0);

        assert_eq!(session.hydrate().await, HydrateOutcome::NoCredential);
        assert_eq!(identity.lookups(), 0);
    }

    #[tokio::test]
    async fn test_establish_adopts_token_and_user() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default());
        let session = manager(&store, &identity);
        session.hydrate().await;

        let response = LoginResponse {
            token: "t9".to_string(),
            user: user_a(),
        };
        assert_eq!(session.establish(response.clone()).await, Ok(user_a()));
        assert_eq!(store.read().as_deref(), Some("t9"));
        assert_eq!(session.establish(response).await, Err(AuthError::AlreadyAuthenticated));
        assert_consistent(&session, &store);
    }

    #[tokio::test]
    async fn test_update_user_only_while_authenticated() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default().login_ok("t1", user_a()));
        let session = manager(&store, &identity);
        session.hydrate().await;

        let mut edited = user_a();
        edited.bio = Some("hello".to_string());
        assert!(!session.update_user(edited.clone()));
        assert_eq!(session.current_user(), None);

        session.login(&creds()).await.unwrap();
        assert!(session.update_user(edited.clone()));
        assert_eq!(session.current_user(), Some(edited));
        assert!(!session.update_user(User::new("someone-else", "C")));
        assert_eq!(store.read().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(FakeIdentity::default().login_ok("t1", user_a()));
        let session = Arc::new(manager(&store, &identity));
        let mut rx = session.subscribe();
        assert_eq!(*rx.borrow_and_update(), SessionState::Unknown);

        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_until_known().await })
        };

        session.hydrate().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);
        assert_eq!(waiter.await.unwrap(), SessionState::Anonymous);

        session.login(&creds()).await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionState::Authenticated(user_a()));

        session.logout();
        assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_mixed_sequence_keeps_token_and_user_in_step() {
        let store = MemoryTokenStore::new();
        let identity = Arc::new(
            FakeIdentity::default()
                .login_err(rejected())
                .login_ok("t1", user_a())
                .lookup_ok(user_a())
                .lookup_err(ApiError::Unauthorized(None))
                .login_ok("t2", user_a()),
        );
        let session = manager(&store, &identity);

        session.hydrate().await;
        assert_consistent(&session, &store);
        let _ = session.login(&creds()).await;
        assert_consistent(&session, &store);
        session.login(&creds()).await.unwrap();
        assert_consistent(&session, &store);
        session.hydrate().await;
        assert_consistent(&session, &store);
        session.hydrate().await;
        assert_consistent(&session, &store);
        session.login(&creds()).await.unwrap();
        assert_consistent(&session, &store);
        session.logout();
        assert_consistent(&session, &store);
    }
}

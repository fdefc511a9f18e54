//! Session state machine and login protocol driver.
//!
//! `LoginManager` owns the authentication status and the active session
//! list, serializes their transitions, and drives the backend protocol for
//! login, create-account, and logout. Dependent components observe it
//! through `status()` / `subscribe_status()` / `wait_for_login()` and never
//! mutate state directly.
//!
//! Operations never return errors: the outcome of every call is observable
//! through status, sessions, and the one-shot error notifications on the
//! injected [`UserInterface`]. Only the connectivity gate can abort a call
//! early, and it does so before any backend round trip.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::{paths, ApiError, AuthResponse, ErrorKind, LoginRequest, LogoutRequest, Transport};
use crate::auth::{Session, Status};
use crate::config::ConfigStore;
use crate::connectivity::{ConnectivityMonitor, OfflineCancelled};
use crate::input::UserInterface;

/// Message shown while the connectivity gate is blocking an operation.
const OFFLINE_MESSAGE: &str =
    "Unable to reach the DevGate backend. Keep waiting for connectivity, or cancel the operation.";

/// Owns the authentication state for one backend. Hosts compose exactly one
/// instance and hand it (by reference or `Arc`) to every dependent
/// component; there is no process-wide singleton.
pub struct LoginManager {
    base_url: String,
    transport: Arc<dyn Transport>,
    connectivity: ConnectivityMonitor,
    ui: Arc<dyn UserInterface>,
    config: Arc<dyn ConfigStore>,
    status_tx: watch::Sender<Status>,
    sessions_tx: watch::Sender<Vec<Session>>,
}

impl LoginManager {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        connectivity: ConnectivityMonitor,
        ui: Arc<dyn UserInterface>,
        config: Arc<dyn ConfigStore>,
    ) -> Self {
        let (status_tx, _) = watch::channel(Status::Initializing);
        let (sessions_tx, _) = watch::channel(Vec::new());
        Self {
            base_url: base_url.into(),
            transport,
            connectivity,
            ui,
            config,
            status_tx,
            sessions_tx,
        }
    }

    /// Settle the start state. Called once by the host after composing the
    /// manager; until then status is `Initializing` and waiters suspend.
    pub fn initialize(&self) {
        self.settle();
    }

    // =========================================================================
    // Observable state
    // =========================================================================

    /// Current status.
    pub fn status(&self) -> Status {
        *self.status_tx.borrow()
    }

    /// Subscribe to status changes. A notification fires exactly when the
    /// status actually changes value; the receiver always reads the latest
    /// settled value.
    pub fn subscribe_status(&self) -> watch::Receiver<Status> {
        self.status_tx.subscribe()
    }

    /// Snapshot of the active sessions. At most one entry.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions_tx.borrow().clone()
    }

    /// Subscribe to session-list changes.
    pub fn subscribe_sessions(&self) -> watch::Receiver<Vec<Session>> {
        self.sessions_tx.subscribe()
    }

    /// Bearer token of the first session, if any.
    pub fn token(&self) -> Option<String> {
        self.sessions_tx.borrow().first().map(|s| s.token.clone())
    }

    /// Block until status settles, returning `true` iff it settled to
    /// `LoggedIn`. Resolves immediately when no operation is in flight, so
    /// callers always observe the final outcome of an attempt rather than
    /// an intermediate state.
    pub async fn wait_for_login(&self) -> bool {
        let mut rx = self.status_tx.subscribe();
        loop {
            match *rx.borrow_and_update() {
                Status::LoggedIn => return true,
                Status::LoggedOut => return false,
                Status::Initializing | Status::LoggingIn => {}
            }
            if rx.changed().await.is_err() {
                return false;
            }
        }
    }

    // =========================================================================
    // State machine internals
    // =========================================================================

    fn set_status(&self, next: Status) {
        self.status_tx.send_if_modified(|status| {
            if *status == next {
                return false;
            }
            debug!(from = %status, to = %next, "status changed");
            *status = next;
            true
        });
    }

    /// Force status to `LoggingIn` for the duration of an attempt.
    fn begin_logging_in(&self) {
        self.set_status(Status::LoggingIn);
    }

    /// Install `session` as the only active session.
    fn replace_session(&self, session: Session) {
        self.sessions_tx.send_replace(vec![session]);
    }

    fn clear_sessions(&self) {
        self.sessions_tx.send_replace(Vec::new());
    }

    /// Recompute status from the session list. The only way status leaves
    /// `LoggingIn`.
    fn settle(&self) {
        let next = if self.sessions_tx.borrow().is_empty() {
            Status::LoggedOut
        } else {
            Status::LoggedIn
        };
        self.set_status(next);
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Run the login flow: connectivity gate, credential gathering, backend
    /// call, and the single two-factor retry when the backend asks for a
    /// code.
    pub async fn login(&self) {
        if self.wait_online().await.is_err() {
            return;
        }
        self.begin_logging_in();
        let remembered = self.config.remembered_email();
        let Some(request) = self.ui.for_login(remembered.as_deref()).await else {
            debug!("login input cancelled");
            self.settle();
            return;
        };
        match self.post_json::<_, AuthResponse>(paths::LOGIN, &request).await {
            Ok(response) => self.complete_login(&request.email, response),
            Err(err) if err.kind() == ErrorKind::TwoFactorRequired => {
                // First failure with the two-factor code demand: no error
                // notification, one retry through the code prompt.
                debug!("backend requested a two-factor code");
                self.clear_sessions();
                self.retry_with_two_factor(request).await;
            }
            Err(err) => self.fail_attempt(err),
        }
        self.settle();
    }

    /// Exactly one retry with a user-supplied two-factor code. Any failure
    /// here is terminal for the attempt.
    async fn retry_with_two_factor(&self, request: LoginRequest) {
        let Some(request) = self.ui.for_two_factor(request).await else {
            debug!("two-factor input cancelled");
            return;
        };
        match self.post_json::<_, AuthResponse>(paths::LOGIN, &request).await {
            Ok(response) => self.complete_login(&request.email, response),
            Err(err) => self.fail_attempt(err),
        }
    }

    /// Register a new developer account; a successful registration logs the
    /// new identity in directly.
    pub async fn create_account(&self) {
        if self.wait_online().await.is_err() {
            return;
        }
        self.begin_logging_in();
        let Some(request) = self.ui.for_create_account().await else {
            debug!("create-account input cancelled");
            self.settle();
            return;
        };
        match self
            .post_json::<_, AuthResponse>(paths::CREATE_ACCOUNT, &request)
            .await
        {
            Ok(response) => self.complete_login(&request.email, response),
            Err(err) => self.fail_attempt(err),
        }
        self.settle();
    }

    /// Log out of the backend and drop the session. The session is cleared
    /// no matter what the backend replies.
    pub async fn logout(&self) {
        // Let any in-flight login settle first so we tear down the session
        // it produced rather than racing it.
        self.wait_for_login().await;
        if self.wait_online().await.is_err() {
            return;
        }
        let request = LogoutRequest {
            token: self.token().unwrap_or_default(),
        };
        if let Err(err) = self.post_json::<_, Value>(paths::LOGOUT, &request).await {
            warn!(error = %err, "logout request failed");
            self.ui.show_error(&err.to_string());
        }
        self.clear_sessions();
        self.settle();
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Connectivity gate shared by every operation. A cancelled wait aborts
    /// the caller before any backend round trip.
    async fn wait_online(&self) -> Result<(), OfflineCancelled> {
        let result = self
            .connectivity
            .wait_for_online(self.ui.as_ref(), OFFLINE_MESSAGE)
            .await;
        if result.is_err() {
            warn!("operation aborted: backend unreachable and wait cancelled");
        }
        result
    }

    /// Install the authenticated session and remember the login id.
    fn complete_login(&self, email: &str, response: AuthResponse) {
        info!(user = %email, "authenticated");
        self.replace_session(Session::new(email, response.token));
        self.config.remember_email(email);
    }

    /// Terminal failure for a login / create-account attempt.
    fn fail_attempt(&self, err: ApiError) {
        error!(error = %err, "authentication failed");
        self.clear_sessions();
        self.ui.show_error(&err.to_string());
    }

    async fn post_json<T, R>(&self, path: &str, request: &T) -> Result<R, ApiError>
    where
        T: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(request)
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        let reply = self.transport.post(&self.base_url, path, body).await?;
        serde_json::from_value(reply).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

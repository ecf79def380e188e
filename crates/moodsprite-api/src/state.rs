//! Shared application state for the API server.
//!
//! [`AppState`] holds the character store every endpoint reads from, the
//! optional loader behind the reload endpoint, the session parameters and
//! the root shutdown token that every streaming session derives from.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use moodsprite_core::session::SessionConfig;
use moodsprite_core::store::{CharacterLoader, CharacterStore};
use tokio_util::sync::CancellationToken;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// The published character snapshot.
    pub store: Arc<CharacterStore>,
    /// Rebuilds the store on demand (absent in read-only deployments).
    pub loader: Option<CharacterLoader>,
    /// Parameters for new streaming sessions.
    pub session: SessionConfig,
    /// Cancelled on shutdown; session tokens are children of it.
    pub shutdown: CancellationToken,
    active_sessions: AtomicUsize,
}

impl AppState {
    /// Create state over `store` with default session settings.
    pub fn new(store: Arc<CharacterStore>) -> Self {
        Self {
            store,
            loader: None,
            session: SessionConfig::default(),
            shutdown: CancellationToken::new(),
            active_sessions: AtomicUsize::new(0),
        }
    }

    /// Attach a loader, enabling `POST /api/operator/reload`.
    #[must_use]
    pub fn with_loader(mut self, loader: CharacterLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Replace the session parameters.
    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Use `token` as the root shutdown token.
    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Number of sessions currently streaming.
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Acquire)
    }

    /// Count a session as active until the returned guard is dropped.
    pub fn track_session(self: &Arc<Self>) -> ActiveSession {
        self.active_sessions.fetch_add(1, Ordering::AcqRel);
        ActiveSession {
            state: Arc::clone(self),
        }
    }
}

/// Keeps a session in [`AppState::active_sessions`] while alive.
#[derive(Debug)]
pub struct ActiveSession {
    state: Arc<AppState>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.state.active_sessions.fetch_sub(1, Ordering::AcqRel);
    }
}

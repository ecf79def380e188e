//! Error types for the Moodsprite service binary.
//!
//! [`ServiceError`] is the top-level error type that wraps every failure
//! that can stop the service. A failed character build is not one of
//! them: it is logged and the server starts without a snapshot.

/// Top-level error for the Moodsprite service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: moodsprite_core::config::ConfigError,
    },

    /// The HTTP server could not be started.
    #[error("server error: {source}")]
    Startup {
        /// The underlying startup error.
        #[from]
        source: moodsprite_api::StartupError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The server task panicked.
    #[error("server task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}

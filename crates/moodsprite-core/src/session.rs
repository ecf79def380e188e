//! Live cue streaming sessions.
//!
//! A [`CueSession`] walks one mood's keyframes in order, emitting a
//! [`Cue`] per tick into an mpsc channel:
//!
//! ```text
//! Idle --run--> Streaming --last cue sent--> Completed
//!                   |--token fired / receiver gone--> Cancelled
//!                   '--cue could not be prepared--> Failed
//! ```
//!
//! The cadence is server-driven. Every send and every sleep is raced
//! against the session's [`CancellationToken`], so a cancelled session
//! stops within one tick. Sessions share nothing mutable: each owns its
//! own copy of the keyframe sequence and its cursor.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use moodsprite_types::{CharacterSnapshot, Cue, Keyframe, Mood, SessionId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::SessionSettings;
use crate::store::CharacterStore;

/// Why a session could not start or could not continue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No character snapshot has been published yet.
    #[error("no character snapshot is loaded")]
    NoSnapshot,

    /// No mood description matches the entry keyword.
    #[error("no mood matches {keyword:?}")]
    MoodNotFound {
        /// The keyword that was searched for.
        keyword: String,
    },

    /// The cursor points past the end of the keyframe sequence.
    #[error("cursor {cursor} is beyond {len} keyframes")]
    CursorOutOfRange {
        /// Cursor position.
        cursor: usize,
        /// Sequence length.
        len: usize,
    },
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet running.
    Idle,
    /// Emitting cues.
    Streaming,
    /// Every keyframe was emitted.
    Completed,
    /// Stopped by the client or by shutdown.
    Cancelled,
    /// Stopped by an internal fault.
    Failed,
}

impl SessionState {
    /// Lowercase label used in logs and close frames.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Whether the state is final.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime session parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Delay between consecutive cues.
    pub tick_interval: Duration,
    /// Validity window stamped on every cue.
    pub duration_valid_ms: u32,
    /// Substring selecting the mood to stream.
    pub entry_mood_keyword: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&SessionSettings::default())
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            tick_interval: settings.tick_interval(),
            duration_valid_ms: settings.duration_valid_ms,
            entry_mood_keyword: settings.entry_mood_keyword.clone(),
        }
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// The session's id.
    pub session_id: SessionId,
    /// Terminal state.
    pub state: SessionState,
    /// Cues handed to the channel.
    pub cues_emitted: u64,
    /// Error text when `state` is [`SessionState::Failed`].
    pub error: Option<String>,
}

/// The mood a new session streams: the first one whose description
/// contains `keyword`, ignoring case.
pub fn entry_mood<'a>(snapshot: &'a CharacterSnapshot, keyword: &str) -> Option<&'a Mood> {
    snapshot.character.mood_by_description(keyword)
}

/// One streaming session over a single mood.
#[derive(Debug)]
pub struct CueSession {
    id: SessionId,
    state: SessionState,
    mood_description: String,
    keyframes: Vec<Keyframe>,
    cursor: usize,
    config: SessionConfig,
}

impl CueSession {
    /// Open a session against whatever the store currently holds.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSnapshot`] if the store is empty, or
    /// [`SessionError::MoodNotFound`] if no mood matches the entry keyword.
    pub fn open(store: &CharacterStore, config: SessionConfig) -> Result<Self, SessionError> {
        let snapshot = store.current().ok_or(SessionError::NoSnapshot)?;
        Self::from_snapshot(&snapshot, config)
    }

    /// Open a session against a specific snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MoodNotFound`] if no mood matches the entry
    /// keyword.
    pub fn from_snapshot(snapshot: &CharacterSnapshot, config: SessionConfig) -> Result<Self, SessionError> {
        let mood = entry_mood(snapshot, &config.entry_mood_keyword).ok_or_else(|| {
            SessionError::MoodNotFound {
                keyword: config.entry_mood_keyword.clone(),
            }
        })?;

        // Cues only carry ids and descriptions, so the image payloads stay
        // with the snapshot.
        let keyframes = mood
            .keyframes
            .iter()
            .map(Keyframe::without_asset_data)
            .collect();

        Ok(Self {
            id: SessionId::new(),
            state: SessionState::Idle,
            mood_description: mood.description.clone(),
            keyframes,
            cursor: 0,
            config,
        })
    }

    /// The session's id.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Current state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Number of cues this session will emit if it runs to completion.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the session has nothing to stream.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Build the cue for the keyframe under the cursor.
    ///
    /// Returns `Ok(None)` once the cursor has reached the end.
    fn prepare_cue(&self) -> Result<Option<Cue>, SessionError> {
        let len = self.keyframes.len();
        if self.cursor == len {
            return Ok(None);
        }
        let keyframe = self
            .keyframes
            .get(self.cursor)
            .ok_or(SessionError::CursorOutOfRange {
                cursor: self.cursor,
                len,
            })?;
        Ok(Some(Cue {
            timestamp: Utc::now(),
            duration_valid_ms: self.config.duration_valid_ms,
            keyframe_id: keyframe.id,
            explanation: format!(
                "Streaming {} from {}",
                keyframe.description, self.mood_description
            ),
            alt_cue_text: None,
        }))
    }

    /// Stream every cue into `tx`, one per tick, until done or cancelled.
    ///
    /// Cancellation comes from `cancel` firing or from the receiving half
    /// of `tx` being dropped. No sleep follows the last cue.
    pub async fn run(mut self, tx: mpsc::Sender<Cue>, cancel: CancellationToken) -> SessionOutcome {
        self.state = SessionState::Streaming;
        info!(
            session_id = %self.id,
            mood = self.mood_description,
            keyframes = self.keyframes.len(),
            "Session streaming"
        );

        let mut cues_emitted: u64 = 0;
        let mut error = None;

        self.state = loop {
            if cancel.is_cancelled() {
                break SessionState::Cancelled;
            }

            let cue = match self.prepare_cue() {
                Ok(Some(cue)) => cue,
                Ok(None) => break SessionState::Completed,
                Err(e) => {
                    warn!(session_id = %self.id, error = %e, "Session failed");
                    error = Some(e.to_string());
                    break SessionState::Failed;
                }
            };

            let delivered = tokio::select! {
                biased;
                () = cancel.cancelled() => false,
                sent = tx.send(cue) => sent.is_ok(),
            };
            if !delivered {
                break SessionState::Cancelled;
            }
            cues_emitted = cues_emitted.saturating_add(1);
            self.cursor = self.cursor.saturating_add(1);

            if self.cursor >= self.keyframes.len() {
                break SessionState::Completed;
            }

            let slept = tokio::select! {
                biased;
                () = cancel.cancelled() => false,
                () = tokio::time::sleep(self.config.tick_interval) => true,
            };
            if !slept {
                break SessionState::Cancelled;
            }
        };

        info!(
            session_id = %self.id,
            state = %self.state,
            cues_emitted,
            "Session finished"
        );

        SessionOutcome {
            session_id: self.id,
            state: self.state,
            cues_emitted,
            error,
        }
    }
}

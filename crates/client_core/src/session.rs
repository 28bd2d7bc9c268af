//! Conversation session controller.
//!
//! Owns the transcript, the recommended movie list and the in-flight flags,
//! issues the three remote operations, and folds their settlements back into
//! state. Every mutation is published as an immutable [`SessionSnapshot`].

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::{
    domain::{Message, Movie, SessionId},
    error::RemoteError,
};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::{
    phrases::{Locale, Phrasebook},
    remote::RemoteService,
};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub locale: Locale,
    pub call_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// How a controller operation ended. Failures are already folded into the
/// transcript; this is informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Precondition not met; nothing changed and no call was issued.
    Skipped,
    Completed,
    Failed,
    /// Settled after a reset; the result was discarded.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub epoch: u64,
    pub messages: Vec<Message>,
    pub movies: Vec<Movie>,
    pub pending_input: String,
    pub is_recommending: bool,
}

struct SessionState {
    messages: Vec<Message>,
    movies: Vec<Movie>,
    pending_input: String,
    is_recommending: bool,
    epoch: u64,
}

impl SessionState {
    fn seeded(greeting: &str) -> Self {
        Self {
            messages: vec![Message::bot(greeting)],
            movies: Vec::new(),
            pending_input: String::new(),
            is_recommending: false,
            epoch: 0,
        }
    }

    fn snapshot(&self, session_id: SessionId) -> SessionSnapshot {
        SessionSnapshot {
            session_id,
            epoch: self.epoch,
            messages: self.messages.clone(),
            movies: self.movies.clone(),
            pending_input: self.pending_input.clone(),
            is_recommending: self.is_recommending,
        }
    }
}

pub struct SessionController {
    id: SessionId,
    remote: Arc<dyn RemoteService>,
    phrases: Phrasebook,
    call_timeout: Duration,
    // Never held across an await point.
    state: Mutex<SessionState>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    pub fn new(remote: Arc<dyn RemoteService>) -> Arc<Self> {
        Self::with_options(remote, SessionOptions::default())
    }

    pub fn with_options(remote: Arc<dyn RemoteService>, options: SessionOptions) -> Arc<Self> {
        let id = SessionId::random();
        let phrases = Phrasebook::new(options.locale);
        let state = SessionState::seeded(phrases.greeting());
        let (snapshots, _) = watch::channel(state.snapshot(id));
        info!(session_id = %id, locale = %options.locale, "session: created");
        Arc::new(Self {
            id,
            remote,
            phrases,
            call_timeout: options.call_timeout,
            state: Mutex::new(state),
            snapshots,
        })
    }

    pub fn session_id(&self) -> SessionId {
        self.id
    }

    pub fn phrases(&self) -> &Phrasebook {
        &self.phrases
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Stream that yields the current snapshot first, then every change.
    pub fn snapshot_stream(&self) -> WatchStream<SessionSnapshot> {
        WatchStream::new(self.subscribe())
    }

    pub fn is_recommending(&self) -> bool {
        self.lock_state().is_recommending
    }

    pub fn update_pending_input(&self, text: impl Into<String>) {
        let mut state = self.lock_state();
        state.pending_input = text.into();
        self.publish(&state);
    }

    /// Sends one chat message. Blank input is ignored.
    pub async fn submit(&self, text: &str) -> Outcome {
        let text = text.trim();
        if text.is_empty() {
            debug!(session_id = %self.id, "session: ignoring blank submit");
            return Outcome::Skipped;
        }

        let epoch = {
            let mut state = self.lock_state();
            state.messages.push(Message::user(text));
            state.pending_input.clear();
            self.publish(&state);
            state.epoch
        };

        let result = self.settle(self.remote.send_message(text)).await;

        let mut state = self.lock_state();
        if state.epoch != epoch {
            debug!(session_id = %self.id, epoch, "session: discarding stale chat reply");
            return Outcome::Stale;
        }
        let outcome = match result {
            Ok(response) => {
                state.messages.push(Message::bot(response.reply));
                Outcome::Completed
            }
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "session: chat message failed");
                let notice = self.failure_notice(&err, self.phrases.chat_failed());
                state.messages.push(Message::bot(notice));
                Outcome::Failed
            }
        };
        self.publish(&state);
        outcome
    }

    /// Requests recommendations. Ignored while a recommend call is in flight.
    pub async fn recommend(&self) -> Outcome {
        let epoch = {
            let mut state = self.lock_state();
            if state.is_recommending {
                debug!(session_id = %self.id, "session: recommend already in flight");
                return Outcome::Skipped;
            }
            state.is_recommending = true;
            state.messages.push(Message::bot(self.phrases.searching()));
            self.publish(&state);
            state.epoch
        };
        let flag = RecommendingFlag::armed(self);

        let result = self.settle(self.remote.recommend()).await;

        let mut state = self.lock_state();
        state.is_recommending = false;
        flag.disarm();

        let outcome = if state.epoch != epoch {
            debug!(session_id = %self.id, epoch, "session: discarding stale recommendations");
            Outcome::Stale
        } else {
            match result {
                Ok(response) => {
                    let count = response.movies.len();
                    info!(session_id = %self.id, count, "session: recommendations received");
                    state.movies = response.movies;
                    state.messages.push(Message::bot(self.phrases.found(count)));
                    Outcome::Completed
                }
                Err(err) => {
                    warn!(session_id = %self.id, error = %err, "session: recommend failed");
                    let notice = match err.detail() {
                        Some(detail) => detail.to_string(),
                        None => self.failure_notice(&err, self.phrases.recommend_fallback()),
                    };
                    state.messages.push(Message::bot(notice));
                    Outcome::Failed
                }
            }
        };
        self.publish(&state);
        outcome
    }

    /// Clears local state eagerly, then asks the backend to discard its
    /// session. Results of calls issued before this point are discarded.
    pub async fn reset(&self) -> Outcome {
        let epoch = {
            let mut state = self.lock_state();
            state.epoch += 1;
            state.messages = vec![Message::bot(self.phrases.resetting())];
            state.movies.clear();
            self.publish(&state);
            state.epoch
        };
        info!(session_id = %self.id, epoch, "session: reset issued");

        let result = self.settle(self.remote.reset_session()).await;

        let mut state = self.lock_state();
        if state.epoch != epoch {
            debug!(session_id = %self.id, epoch, "session: discarding superseded reset");
            return Outcome::Stale;
        }
        let outcome = match result {
            Ok(response) => {
                state.messages = vec![Message::bot(response.reply)];
                Outcome::Completed
            }
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "session: reset failed");
                let notice = self.failure_notice(&err, self.phrases.reset_failed());
                state.messages = vec![Message::bot(notice)];
                Outcome::Failed
            }
        };
        self.publish(&state);
        outcome
    }

    async fn settle<T, F>(&self, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.call_timeout)),
        }
    }

    fn failure_notice(&self, err: &RemoteError, fallback: &str) -> String {
        if err.is_timeout() {
            self.phrases.timed_out().to_string()
        } else {
            fallback.to_string()
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.snapshots.send_replace(state.snapshot(self.id));
    }
}

/// Clears `is_recommending` if a recommend future is dropped before its call
/// settles.
struct RecommendingFlag<'a> {
    controller: Option<&'a SessionController>,
}

impl<'a> RecommendingFlag<'a> {
    fn armed(controller: &'a SessionController) -> Self {
        Self {
            controller: Some(controller),
        }
    }

    fn disarm(mut self) {
        self.controller = None;
    }
}

impl Drop for RecommendingFlag<'_> {
    fn drop(&mut self) {
        if let Some(controller) = self.controller.take() {
            warn!(session_id = %controller.id, "session: recommend abandoned before settling");
            let mut state = controller.lock_state();
            state.is_recommending = false;
            controller.publish(&state);
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

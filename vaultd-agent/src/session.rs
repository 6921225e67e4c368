//! Per-sender conversation state.
//!
//! The dispatcher is stateless; whatever a chat front end wants to remember
//! about a sender lives behind [`SessionStore`]. The bundled
//! [`InMemorySessionStore`] forgets everything on restart.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::TxHash;
use dashmap::DashMap;
use vaultd::ActionResponse;

/// Outcomes kept per sender.
pub const HISTORY_LIMIT: usize = 20;

/// One recorded dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Action name as the sender requested it.
    pub action: String,
    /// What the sender was told.
    pub response: ActionResponse,
}

/// A sender's recent history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    history: VecDeque<Outcome>,
    last_tx: Option<TxHash>,
}

impl Session {
    /// Appends an outcome, dropping the oldest past [`HISTORY_LIMIT`].
    pub fn record(&mut self, action: &str, response: ActionResponse) {
        if let (true, Some(hash)) = (response.success, response.tx_hash) {
            self.last_tx = Some(hash);
        }
        self.history.push_back(Outcome {
            action: action.to_owned(),
            response,
        });
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    /// Hash of the most recent successful submission.
    #[must_use]
    pub const fn last_tx(&self) -> Option<TxHash> {
        self.last_tx
    }

    /// Most recent outcome.
    #[must_use]
    pub fn last(&self) -> Option<&Outcome> {
        self.history.back()
    }

    /// Outcomes, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Outcome> {
        self.history.iter()
    }
}

/// Storage for [`Session`]s keyed by sender.
pub trait SessionStore: Send + Sync {
    /// Returns a snapshot of `sender`'s session.
    fn get(&self, sender: &str) -> Option<Session>;

    /// Replaces `sender`'s session.
    fn put(&self, sender: &str, session: Session);

    /// Records an outcome for `sender`.
    ///
    /// The default reads, modifies, and writes back; stores that can
    /// update in place should override it.
    fn record(&self, sender: &str, action: &str, response: ActionResponse) {
        let mut session = self.get(sender).unwrap_or_default();
        session.record(action, response);
        self.put(sender, session);
    }
}

/// Senders an [`InMemorySessionStore`] keeps by default.
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct Tracked {
    session: Session,
    touched: u64,
}

/// Process-local [`SessionStore`].
///
/// Holds at most `capacity` senders. Adding a sender past that evicts the
/// one whose session was written least recently.
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Tracked>,
    capacity: usize,
    clock: AtomicU64,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl InMemorySessionStore {
    /// Creates an empty store holding up to [`DEFAULT_SESSION_CAPACITY`]
    /// senders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store holding up to `capacity` senders (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
        }
    }

    /// Maximum number of senders kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of senders with a session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sender has a session yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Must not be called while holding a guard into `sessions`.
    fn evict_excess(&self) {
        while self.sessions.len() > self.capacity {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.touched)
                .map(|entry| entry.key().clone());
            let Some(sender) = oldest else { break };
            self.sessions.remove(&sender);
            tracing::debug!(capacity = self.capacity, "Evicted least recent chat session");
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, sender: &str) -> Option<Session> {
        self.sessions.get(sender).map(|t| t.session.clone())
    }

    fn put(&self, sender: &str, session: Session) {
        let touched = self.tick();
        let previous = self
            .sessions
            .insert(sender.to_owned(), Tracked { session, touched });
        if previous.is_none() {
            self.evict_excess();
        }
    }

    fn record(&self, sender: &str, action: &str, response: ActionResponse) {
        let touched = self.tick();
        let mut inserted = false;
        {
            let mut entry = self.sessions.entry(sender.to_owned()).or_insert_with(|| {
                inserted = true;
                Tracked::default()
            });
            entry.touched = touched;
            entry.session.record(action, response);
        }
        if inserted {
            self.evict_excess();
        }
    }
}

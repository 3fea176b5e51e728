//! Per-owner cancellation of superseded inline queries.
//!
//! Interactive search only ever shows the latest answer, so starting a new
//! inline query for an owner cancels the lookup still running for their
//! previous one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Handle for one running inline query.
#[derive(Debug)]
pub struct InlineTicket {
    pub owner: i64,
    generation: u64,
    token: CancellationToken,
}

impl InlineTicket {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Default)]
struct TrackerState {
    next_generation: u64,
    running: HashMap<i64, (u64, CancellationToken)>,
}

#[derive(Clone, Default)]
pub struct InlineQueryTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl InlineQueryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new query for `owner`, cancelling the one it supersedes.
    pub async fn begin(&self, owner: i64) -> InlineTicket {
        let mut state = self.state.lock().await;
        state.next_generation += 1;
        let generation = state.next_generation;
        let token = CancellationToken::new();
        if let Some((_, previous)) = state.running.insert(owner, (generation, token.clone())) {
            trace!(
                subsystem = "api",
                component = "inline_tracker",
                owner_id = owner,
                "Cancelling superseded inline query"
            );
            previous.cancel();
        }
        InlineTicket {
            owner,
            generation,
            token,
        }
    }

    /// Forget `ticket` unless a newer query has already replaced it.
    pub async fn finish(&self, ticket: InlineTicket) {
        let mut state = self.state.lock().await;
        if matches!(state.running.get(&ticket.owner), Some((g, _)) if *g == ticket.generation) {
            state.running.remove(&ticket.owner);
        }
    }

    /// Number of owners with a query in flight.
    pub async fn running(&self) -> usize {
        self.state.lock().await.running.len()
    }
}

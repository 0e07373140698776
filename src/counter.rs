use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::Session;
use crate::directory::Identity;
use crate::traits::TallyStore;

/// Who is visiting.
///
/// Authenticated callers are counted in the shared tally under their login;
/// anonymous callers carry their own count inside their session.
#[derive(Debug)]
pub enum Caller<'a> {
    Authenticated(&'a Identity),
    Anonymous(&'a mut Session),
}

/// Process-lifetime tally: a mutex-guarded map, reset only by restart.
#[derive(Debug, Default)]
pub struct MemoryTally {
    counts: Mutex<HashMap<String, u64>>,
}

impl MemoryTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TallyStore for MemoryTally {
    fn increment(&self, key: &str) -> u64 {
        let mut counts = self.counts.lock();
        let count = counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

/// Counts visits to the counter page.
#[derive(Clone)]
pub struct VisitCounter {
    tally: Arc<dyn TallyStore>,
}

impl VisitCounter {
    #[must_use]
    pub fn new(tally: Arc<dyn TallyStore>) -> Self {
        Self { tally }
    }

    /// Record one visit and return the caller's new count.
    ///
    /// Not idempotent: every call adds exactly one. An anonymous session is
    /// marked permanent so the count outlives the browser session.
    pub fn record_visit(&self, caller: Caller<'_>) -> u64 {
        match caller {
            Caller::Authenticated(identity) => self.tally.increment(&identity.login),
            Caller::Anonymous(session) => {
                let count = session.visits.unwrap_or(0) + 1;
                session.visits = Some(count);
                session.permanent = true;
                count
            }
        }
    }
}

impl Default for VisitCounter {
    fn default() -> Self {
        Self::new(Arc::new(MemoryTally::new()))
    }
}

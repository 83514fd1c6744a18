//! Spec §7/§9: "the database is now quarantined and requires
//! administrator intervention" after a failed compensating write, and
//! spec §9's design note that the source's mutable global availability
//! flag "becomes an explicit context struct threaded through
//! constructors" rather than a process-wide singleton.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Process-wide "database available" flag (spec §6 CLI/exit codes: "readable
/// by the administrator"), but modeled as an explicit, shareable struct
/// instead of a bare global so it can be constructed per-database in tests.
#[derive(Clone)]
pub struct DatabaseAvailability {
    available: Arc<AtomicBool>,
    reason: Arc<Mutex<Option<String>>>,
}

impl DatabaseAvailability {
    pub fn new() -> Self {
        DatabaseAvailability {
            available: Arc::new(AtomicBool::new(true)),
            reason: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Quarantine the database. Called when a compensating rollback write
    /// itself fails (spec §7 propagation policy).
    pub fn mark_unavailable(&self, reason: impl Into<String>) {
        *self.reason.lock() = Some(reason.into());
        self.available.store(false, Ordering::SeqCst);
    }

    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }
}

impl Default for DatabaseAvailability {
    fn default() -> Self {
        Self::new()
    }
}

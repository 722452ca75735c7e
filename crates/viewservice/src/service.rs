//! Lock-guarded view service shell.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use viewservice_types::{ServerId, View, ViewNumber};

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::state::{TickOutcome, ViewState};

/// The view service: one [`ViewState`] behind one mutex.
///
/// Every entry point holds the lock for its whole critical section, so
/// heartbeats and detector ticks are totally ordered. Logging happens after
/// the lock is released.
#[derive(Debug)]
pub struct ViewService {
    state: Mutex<ViewState>,
    config: ServiceConfig,
}

impl ViewService {
    /// Creates a service with an empty view.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(ViewState::new(config.dead_pings)),
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Heartbeat from `from`, which last saw view `viewnum`.
    pub fn ping(&self, from: ServerId, viewnum: ViewNumber) -> View {
        let (reply, newly_acknowledged) = {
            let mut state = self.lock();
            let was_acknowledged = state.is_acknowledged();
            let reply = state.ping(from.clone(), viewnum);
            (reply, !was_acknowledged && state.is_acknowledged())
        };

        debug!(server = %from, %viewnum, reply = %reply, "ping");
        if reply.viewnum.is_zero() {
            info!(primary = %from, "bootstrapped view 1");
        }
        if newly_acknowledged {
            info!(primary = %from, %viewnum, "view acknowledged");
        }
        reply
    }

    /// Returns the current view.
    pub fn get(&self) -> View {
        self.lock().view().clone()
    }

    /// Runs one failure-detector period.
    pub fn tick(&self) -> TickOutcome {
        let outcome = self.lock().tick();

        if let Some(primary) = &outcome.primary_timed_out {
            warn!(%primary, "primary presumed dead");
        }
        if let Some(backup) = &outcome.backup_timed_out {
            warn!(%backup, "backup presumed dead");
        }
        if let Some(view) = &outcome.advanced {
            info!(view = %view, "view changed");
        }
        outcome
    }

    /// Runs `f` against the state under the lock. Intended for diagnostics.
    pub fn inspect<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.lock())
    }

    // A panic cannot leave a half-applied transition: every mutation runs to
    // completion before the guard is dropped.
    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! View assignment state machine.
//!
//! This module defines [`ViewState`], the authoritative state of the view
//! service. The state machine is pure: heartbeats and detector ticks are
//! its only inputs, and it performs no I/O, locking or timekeeping. The
//! [`ViewService`](crate::ViewService) shell serializes access to it.
//!
//! # Transitions
//!
//! ```text
//! ping(from, n) ──► liveness bookkeeping only (never advances the view,
//!                   except the bootstrap of view 1)
//!
//! tick() ──► age_liveness ──► acknowledged? ──no──► done
//!                                  │
//!                                 yes
//!                                  ▼
//!            replace_dead_primary ─► replace_dead_backup ─► fill_vacant_backup
//!                                  │
//!                          any change? ──► commit (viewnum + 1, unacknowledged)
//! ```

use viewservice_types::{Role, ServerId, View, ViewNumber};

// ============================================================================
// Liveness
// ============================================================================

/// Heartbeat bookkeeping for one role slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Liveness {
    /// Consecutive detector ticks without a heartbeat from the slot holder.
    misses: u32,
    /// Set when the slot holder missed too many heartbeats, or (primary
    /// only) restarted and lost its state.
    presumed_dead: bool,
}

impl Liveness {
    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn is_presumed_dead(&self) -> bool {
        self.presumed_dead
    }

    fn heard(&mut self) {
        self.misses = 0;
    }

    /// Counts one silent tick. Returns true when this tick crossed the
    /// threshold.
    fn age(&mut self, dead_pings: u32) -> bool {
        self.misses += 1;
        if self.misses >= dead_pings {
            self.misses = 0;
            self.presumed_dead = true;
            return true;
        }
        false
    }
}

// ============================================================================
// Tick outcome
// ============================================================================

/// What a single detector tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Primary that crossed the dead threshold on this tick.
    pub primary_timed_out: Option<ServerId>,
    /// Backup that crossed the dead threshold on this tick.
    pub backup_timed_out: Option<ServerId>,
    /// False when the current view was still waiting for acknowledgment,
    /// in which case no transition was attempted.
    pub gate_open: bool,
    /// The newly committed view, if the view advanced.
    pub advanced: Option<View>,
}

// ============================================================================
// View state
// ============================================================================

/// Authoritative view service state.
#[derive(Debug, Clone)]
pub struct ViewState {
    view: View,
    /// The primary of `view` has reported `view.viewnum` in a heartbeat.
    acknowledged: bool,
    /// Most recently seen server holding no role.
    idle: Option<ServerId>,
    primary: Liveness,
    backup: Liveness,
    /// The backup has heartbeated at the current view number.
    backup_ready: bool,
    dead_pings: u32,
}

impl ViewState {
    /// Creates the empty state every service starts from.
    pub fn new(dead_pings: u32) -> Self {
        Self {
            view: View::initial(),
            acknowledged: false,
            idle: None,
            primary: Liveness::default(),
            backup: Liveness::default(),
            backup_ready: false,
            dead_pings,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// The transition gate: the view may only advance once its primary has
    /// reported it in a heartbeat.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn idle_candidate(&self) -> Option<&ServerId> {
        self.idle.as_ref()
    }

    pub fn is_backup_ready(&self) -> bool {
        self.backup_ready
    }

    pub fn primary_liveness(&self) -> Liveness {
        self.primary
    }

    pub fn backup_liveness(&self) -> Liveness {
        self.backup
    }

    // ------------------------------------------------------------------------
    // Heartbeats
    // ------------------------------------------------------------------------

    /// Processes one heartbeat and returns the view to report to the caller.
    ///
    /// The cases are evaluated in a fixed priority order: bootstrap, then the
    /// primary slot, then the backup slot, then idle.
    pub fn ping(&mut self, from: ServerId, viewnum: ViewNumber) -> View {
        if self.view.viewnum.is_zero() {
            return self.bootstrap(from);
        }

        match self.view.role_of(&from) {
            Role::Primary => self.primary_heartbeat(viewnum),
            Role::Backup => self.backup_heartbeat(viewnum),
            Role::Idle => self.idle = Some(from),
        }

        self.view.clone()
    }

    /// The first caller ever becomes the primary of view 1. It is answered
    /// with view 0 naming itself, before it has seen the real view.
    fn bootstrap(&mut self, from: ServerId) -> View {
        let reply = View::new(ViewNumber::ZERO, Some(from.clone()), None);
        self.view = View::new(ViewNumber::ZERO.next(), Some(from), None);
        self.acknowledged = false;
        reply
    }

    fn primary_heartbeat(&mut self, viewnum: ViewNumber) {
        self.primary.heard();

        // View 1 is exempt: its primary keeps reporting 0 until it has seen
        // the bootstrap reply.
        if viewnum.is_zero() && self.view.viewnum != ViewNumber::new(1) {
            self.primary.presumed_dead = true;
        }

        if viewnum == self.view.viewnum && !self.acknowledged {
            self.acknowledged = true;
        }
    }

    fn backup_heartbeat(&mut self, viewnum: ViewNumber) {
        self.backup.heard();

        if viewnum.is_zero() {
            self.backup_ready = false;
        } else if viewnum == self.view.viewnum {
            self.backup_ready = true;
        }
    }

    // ------------------------------------------------------------------------
    // Detector tick
    // ------------------------------------------------------------------------

    /// Runs one failure-detector period: ages liveness counters and, if the
    /// current view has been acknowledged, computes the next view.
    pub fn tick(&mut self) -> TickOutcome {
        let (primary_timed_out, backup_timed_out) = self.age_liveness();

        let mut outcome = TickOutcome {
            primary_timed_out,
            backup_timed_out,
            gate_open: self.is_acknowledged(),
            advanced: None,
        };
        if !outcome.gate_open {
            return outcome;
        }

        // All three triggers run on every gated tick; a promotion in the
        // first leaves a vacancy the third fills.
        let mut changed = false;
        changed |= self.replace_dead_primary();
        changed |= self.replace_dead_backup();
        changed |= self.fill_vacant_backup();

        if changed {
            outcome.advanced = Some(self.commit());
        }
        outcome
    }

    /// Step 1: counts a missed heartbeat for every filled slot. Returns the
    /// holders that crossed the dead threshold on this tick.
    fn age_liveness(&mut self) -> (Option<ServerId>, Option<ServerId>) {
        let dead_pings = self.dead_pings;

        let primary = match &self.view.primary {
            Some(p) if self.primary.age(dead_pings) => Some(p.clone()),
            _ => None,
        };
        let backup = match &self.view.backup {
            Some(b) if self.backup.age(dead_pings) => Some(b.clone()),
            _ => None,
        };
        (primary, backup)
    }

    /// Step a: clears a dead primary's slot and promotes a ready backup.
    ///
    /// Without a ready backup the primary slot stays empty; that alone does
    /// not count as a change.
    fn replace_dead_primary(&mut self) -> bool {
        if !self.primary.presumed_dead {
            return false;
        }

        self.view.primary = None;
        if !self.backup_ready {
            return false;
        }
        let Some(backup) = self.view.backup.take() else {
            return false;
        };

        self.view.primary = Some(backup);
        self.primary = Liveness {
            misses: self.backup.misses,
            presumed_dead: false,
        };
        self.backup = Liveness::default();
        self.backup_ready = false;
        true
    }

    /// Step b: clears a dead backup's slot and refills it from the idle
    /// candidate, if there is one.
    fn replace_dead_backup(&mut self) -> bool {
        if !self.backup.presumed_dead {
            return false;
        }

        self.view.backup = None;
        match self.idle.take() {
            Some(idle) => {
                self.install_backup(idle);
                true
            }
            None => false,
        }
    }

    /// Step c: fills an empty backup slot from the idle candidate.
    fn fill_vacant_backup(&mut self) -> bool {
        if self.view.backup.is_some() {
            return false;
        }
        match self.idle.take() {
            Some(idle) => {
                self.install_backup(idle);
                true
            }
            None => false,
        }
    }

    /// A freshly installed backup starts with clean liveness and is not
    /// ready until it reports the new view.
    fn install_backup(&mut self, server: ServerId) {
        self.view.backup = Some(server);
        self.backup = Liveness::default();
        self.backup_ready = false;
    }

    /// Step d: publishes the next view, which needs its own acknowledgment.
    fn commit(&mut self) -> View {
        self.view.viewnum = self.view.viewnum.next();
        self.acknowledged = false;
        self.view.clone()
    }
}

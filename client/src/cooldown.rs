//! Client-side placement cooldown.
//!
//! The gate is advisory only. It saves the service from requests that are
//! certain to be rejected, but the service remains the authority and may
//! reject a placement while the gate reports idle.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Cooldown after a placement by a registered user.
pub const USER_COOLDOWN: Duration = Duration::from_secs(5);
/// Cooldown after a placement by a guest.
pub const GUEST_COOLDOWN: Duration = Duration::from_secs(10);

pub fn cooldown_for(user_id: Option<u64>) -> Duration {
    if user_id.is_some() {
        USER_COOLDOWN
    } else {
        GUEST_COOLDOWN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    Idle,
    Active { ends_at: Instant },
}

type TickCallback = Box<dyn FnMut(u64)>;

pub struct CooldownGate {
    state: CooldownState,
    subscribers: Vec<TickCallback>,
    last_reported: Option<u64>,
    ticking: bool,
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CooldownGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownGate")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .field("ticking", &self.ticking)
            .finish()
    }
}

impl CooldownGate {
    pub fn new() -> Self {
        Self {
            state: CooldownState::Idle,
            subscribers: Vec::new(),
            last_reported: None,
            ticking: false,
        }
    }

    pub fn start(&mut self, duration: Duration) {
        self.start_at(Instant::now(), duration);
    }

    pub fn start_at(&mut self, now: Instant, duration: Duration) {
        if duration.is_zero() {
            self.state = CooldownState::Idle;
            return;
        }
        self.state = CooldownState::Active {
            ends_at: now + duration,
        };
        self.last_reported = None;
    }

    pub fn is_active(&mut self) -> bool {
        self.is_active_at(Instant::now())
    }

    pub fn is_active_at(&mut self, now: Instant) -> bool {
        self.observe(now);
        matches!(self.state, CooldownState::Active { .. })
    }

    /// Whole seconds left, rounded up. 0 when idle.
    pub fn remaining_seconds(&mut self) -> u64 {
        self.remaining_seconds_at(Instant::now())
    }

    pub fn remaining_seconds_at(&mut self, now: Instant) -> u64 {
        self.observe(now);
        match self.state {
            CooldownState::Idle => 0,
            CooldownState::Active { ends_at } => ceil_secs(ends_at.saturating_duration_since(now)),
        }
    }

    pub fn state(&self) -> CooldownState {
        self.state
    }

    /// Register a display callback. It receives the remaining whole seconds
    /// every time that value changes while a cooldown runs, ending with `0`
    /// when the gate returns to idle. Callbacks run while the gate is
    /// borrowed and must not reach back into it.
    pub fn on_tick(&mut self, callback: impl FnMut(u64) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Recompute state at `now` and notify subscribers if the displayed value
    /// changed. Returns whether the gate is still active.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let remaining = self.remaining_seconds_at(now);
        if self.last_reported != Some(remaining) {
            self.last_reported = Some(remaining);
            for callback in &mut self.subscribers {
                callback(remaining);
            }
        }
        remaining > 0
    }

    fn observe(&mut self, now: Instant) {
        if let CooldownState::Active { ends_at } = self.state
            && ends_at <= now
        {
            self.state = CooldownState::Idle;
        }
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_nanos().div_ceil(1_000_000_000);
    u64::try_from(secs).unwrap_or(u64::MAX)
}

/// Start a display timer for `gate` that re-runs every `period` while the
/// cooldown is active and stops once it is idle. A timer already running for
/// the gate is reused.
pub fn spawn_ticker(gate: Rc<RefCell<CooldownGate>>, period: Duration) {
    {
        let mut guard = gate.borrow_mut();
        if guard.ticking {
            return;
        }
        guard.ticking = true;
    }

    let weak = Rc::downgrade(&gate);
    drop(gate);
    tokio::task::spawn_local(async move {
        loop {
            let Some(gate) = weak.upgrade() else {
                return;
            };
            let still_active = gate.borrow_mut().tick_at(Instant::now());
            if !still_active {
                gate.borrow_mut().ticking = false;
                debug!("cooldown finished");
                return;
            }
            drop(gate);
            tokio::time::sleep(period).await;
        }
    });
}

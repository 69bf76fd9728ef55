//! Run state machine and cross-thread control signals.
//!
//! ```text
//! Idle ──start──▶ Running ──pause──▶ Paused
//!                  │  ▲                 │
//!                  │  └─────resume──────┘
//!                  ├──(termination)──▶ Completed(reason)
//!                  └──stop (also from Paused)──▶ Stopped
//! Completed | Stopped ──reset──▶ Idle
//! ```
//!
//! Pause and stop are honored between generations only.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use super::progress::TerminationReason;
use crate::error::EngineError;

/// Lifecycle state of an evolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed(TerminationReason),
    Stopped,
}

impl RunState {
    /// Whether a run is in progress (running or paused).
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

/// Shared state between the controller and the evolution loop.
#[derive(Debug)]
pub(crate) struct ControlSignals {
    state: Mutex<RunState>,
    resumed: Condvar,
    stop: AtomicBool,
}

impl ControlSignals {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RunState::Idle),
            resumed: Condvar::new(),
            stop: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> RunState {
        *self.lock()
    }

    pub(crate) fn set(&self, state: RunState) {
        *self.lock() = state;
        self.resumed.notify_all();
    }

    /// Idle → Running, clearing any stale stop request.
    pub(crate) fn begin(&self) -> Result<(), EngineError> {
        let mut state = self.lock();
        if *state != RunState::Idle {
            return Err(EngineError::InvalidTransition {
                action: "start",
                state: *state,
            });
        }
        self.stop.store(false, Ordering::SeqCst);
        *state = RunState::Running;
        Ok(())
    }

    pub(crate) fn pause(&self) -> Result<(), EngineError> {
        let mut state = self.lock();
        if *state != RunState::Running {
            return Err(EngineError::InvalidTransition {
                action: "pause",
                state: *state,
            });
        }
        *state = RunState::Paused;
        Ok(())
    }

    pub(crate) fn resume(&self) -> Result<(), EngineError> {
        let mut state = self.lock();
        if *state != RunState::Paused {
            return Err(EngineError::InvalidTransition {
                action: "resume",
                state: *state,
            });
        }
        *state = RunState::Running;
        self.resumed.notify_all();
        Ok(())
    }

    pub(crate) fn stop(&self) -> Result<(), EngineError> {
        let state = self.lock();
        if !state.is_active() {
            return Err(EngineError::InvalidTransition {
                action: "stop",
                state: *state,
            });
        }
        self.stop.store(true, Ordering::SeqCst);
        self.resumed.notify_all();
        Ok(())
    }

    /// Completed | Stopped → Idle.
    pub(crate) fn reset(&self) -> Result<(), EngineError> {
        let mut state = self.lock();
        if state.is_active() {
            return Err(EngineError::InvalidTransition {
                action: "reset",
                state: *state,
            });
        }
        self.stop.store(false, Ordering::SeqCst);
        *state = RunState::Idle;
        Ok(())
    }

    /// Generation boundary: blocks while paused.
    ///
    /// Returns `true` if the run must stop.
    pub(crate) fn checkpoint(&self) -> bool {
        let mut state = self.lock();
        while *state == RunState::Paused && !self.stop.load(Ordering::SeqCst) {
            state = self
                .resumed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.stop.load(Ordering::SeqCst)
    }
}

/// Cloneable handle for steering a run from another thread.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    pub(crate) signals: Arc<ControlSignals>,
}

impl ControlHandle {
    pub fn state(&self) -> RunState {
        self.signals.state()
    }

    /// Requests a pause at the next generation boundary.
    pub fn pause(&self) -> Result<(), EngineError> {
        self.signals.pause()
    }

    pub fn resume(&self) -> Result<(), EngineError> {
        self.signals.resume()
    }

    /// Requests a stop at the next generation boundary.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.signals.stop()
    }
}

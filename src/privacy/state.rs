//! Overall Privacy State.
//!
//! Tracks the manager-level state and enforces its transitions.
//!
//! # States
//! - **Init**: Not yet initialised; bond events and triggers are ignored.
//! - **Idle**: Table and resolving list agree, nothing outstanding.
//! - **Busy**: At least one entry or a clear is pending or in flight.

use super::PrivacyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Init,
    Idle,
    Busy,
}

pub struct StateMachine {
    current_state: ManagerState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current_state: ManagerState::Init,
        }
    }

    pub fn state(&self) -> ManagerState {
        self.current_state
    }

    /// Returns `(from, to)` if the state actually changed.
    fn transition(&mut self, new_state: ManagerState) -> Option<(ManagerState, ManagerState)> {
        let from = self.current_state;
        if from == new_state {
            return None;
        }
        log::info!("[PRIVACY] state {:?} -> {:?}", from, new_state);
        self.current_state = new_state;
        Some((from, new_state))
    }

    /// Leaves Init. Only allowed once.
    pub fn start(&mut self) -> Result<Option<(ManagerState, ManagerState)>, PrivacyError> {
        match self.current_state {
            ManagerState::Init => Ok(self.transition(ManagerState::Idle)),
            _ => Err(PrivacyError::AlreadyInitialized),
        }
    }

    /// Work was queued.
    pub fn set_busy(&mut self) -> Option<(ManagerState, ManagerState)> {
        match self.current_state {
            ManagerState::Init => None,
            _ => self.transition(ManagerState::Busy),
        }
    }

    /// Nothing left to do.
    pub fn set_idle(&mut self) -> Option<(ManagerState, ManagerState)> {
        match self.current_state {
            ManagerState::Init => None,
            _ => self.transition(ManagerState::Idle),
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

//! LE Privacy Management.
//!
//! Keeps the controller resolving list in step with the bond store, one
//! command at a time.
//!
//! # Components
//! - `entry` / `table`: per-identity lifecycle records in a fixed-size table.
//! - `processor`: issues at most one resolving list command per pass.
//! - `response`: consumes controller completions and re-triggers the processor.
//! - `mode`: privacy mode requested for a freshly added peer.
//! - `whitelist`: best-effort whitelist shadow of resolving list changes.
//! - `events`: notifications for the application.
//! - `state` / `manager`: overall state and the public entry points.
//!
//! # Concurrency
//! Everything runs on the host stack's event task. The single in-flight slot
//! is the only serialisation mechanism; no locking is needed.

pub mod entry;
pub mod events;
pub mod manager;
pub mod mode;
mod processor;
mod response;
pub mod state;
pub mod table;
pub mod whitelist;

#[cfg(test)]
pub(crate) mod mock;

pub use entry::{EntryLifecycle, PrivacyEntry};
pub use events::{
    EventGateway, PendingReason, PrivacyEvent, PrivacyEventObserver, ResolutionStatus, ResolvedEntry,
};
pub use manager::PrivacyManager;
pub use state::ManagerState;
pub use table::{PrivacyTable, RemoveOutcome};

use crate::gap::Cause;
use core::fmt;

/// Errors related to privacy management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyError {
    /// The identity is already tracked.
    AlreadyExists,
    /// Every slot of the table is occupied.
    NoFreeSlot,
    /// The identity is not tracked.
    NotFound,
    /// `init` has not completed.
    NotInitialized,
    /// `init` was already called.
    AlreadyInitialized,
    /// A parameter is outside its allowed range.
    InvalidParameter,
    /// Privacy modes are managed internally (`mode_manage` is on).
    ModeManaged,
    /// The controller refused the request.
    Controller(Cause),
}

impl fmt::Display for PrivacyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivacyError::AlreadyExists => write!(f, "Identity already in privacy table"),
            PrivacyError::NoFreeSlot => write!(f, "Privacy table is full"),
            PrivacyError::NotFound => write!(f, "Identity not in privacy table"),
            PrivacyError::NotInitialized => write!(f, "Privacy manager not initialized"),
            PrivacyError::AlreadyInitialized => write!(f, "Privacy manager already initialized"),
            PrivacyError::InvalidParameter => write!(f, "Invalid parameter"),
            PrivacyError::ModeManaged => write!(f, "Privacy mode is managed internally"),
            PrivacyError::Controller(cause) => write!(f, "Controller refused request: {}", cause),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PrivacyError {}

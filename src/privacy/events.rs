//! Event Gateway.
//!
//! Notifications delivered to the owning application. The observer is called
//! synchronously from inside the manager; it must not block and has no way to
//! call back into the manager.

use alloc::boxed::Box;

use super::state::ManagerState;
use crate::gap::{BdAddr, Cause, IdentityAddress, ResolvedAddressKind, ResolvingListOp};

/// Resolution status reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionStatus {
    #[default]
    Disabled,
    Disabling,
    Enabling,
    Enabled,
}

/// Why pending resolving list work is being held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingReason {
    pub advertising: bool,
    pub connecting: bool,
    pub scanning: bool,
}

/// Identity affected by a resolving list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub identity: IdentityAddress,
    pub device_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyEvent {
    OverallStateChanged {
        from: ManagerState,
        to: ManagerState,
    },
    ResolutionStatusChanged(ResolutionStatus),
    ModeSetResult(Cause),
    ReadResolvedAddressResult {
        kind: ResolvedAddressKind,
        addr: BdAddr,
        cause: Cause,
    },
    ResolvingListModified {
        op: ResolvingListOp,
        entry: Option<ResolvedEntry>,
        cause: Cause,
    },
    ResolvingListPending(PendingReason),
}

/// Observer trait for privacy notifications.
pub trait PrivacyEventObserver {
    fn on_privacy_event(&self, event: &PrivacyEvent);
}

/// Holds the single registered observer.
#[derive(Default)]
pub struct EventGateway {
    observer: Option<Box<dyn PrivacyEventObserver>>,
}

impl EventGateway {
    pub fn new() -> Self {
        Self { observer: None }
    }

    /// Registers the observer, replacing any previous one.
    pub fn register(&mut self, observer: Box<dyn PrivacyEventObserver>) {
        self.observer = Some(observer);
    }

    pub fn unregister(&mut self) {
        self.observer = None;
    }

    pub fn emit(&self, event: PrivacyEvent) {
        log::debug!("[PRIVACY] event {:?}", event);
        if let Some(obs) = &self.observer {
            obs.on_privacy_event(&event);
        }
    }
}

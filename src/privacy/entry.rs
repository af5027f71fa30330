//! Privacy table entries.

use crate::gap::{BdAddr, IdentityAddrType, IdentityAddress};

/// Where an entry stands relative to the controller resolving list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryLifecycle {
    /// Slot unused.
    #[default]
    Free,
    /// Waiting to be added; never confirmed by the controller. `sent` once an
    /// Add was accepted, after which the controller may hold the entry even
    /// though no Success has been seen.
    AddPending { sent: bool },
    /// Confirmed present in the resolving list.
    Added,
    /// Waiting to be removed.
    RemovePending,
}

impl EntryLifecycle {
    /// The entry still needs a resolving list command.
    pub fn is_pending(&self) -> bool {
        matches!(self, EntryLifecycle::AddPending { .. } | EntryLifecycle::RemovePending)
    }

    /// True if removing this entry needs a controller command.
    pub fn may_be_in_controller(&self) -> bool {
        matches!(
            self,
            EntryLifecycle::AddPending { sent: true } | EntryLifecycle::Added | EntryLifecycle::RemovePending
        )
    }
}

/// One slot of the privacy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacyEntry {
    pub identity: IdentityAddress,
    /// Request Device privacy mode once the entry is in the resolving list.
    pub device_mode: bool,
    pub lifecycle: EntryLifecycle,
}

impl PrivacyEntry {
    pub(crate) const FREE: Self = Self {
        identity: IdentityAddress::new(IdentityAddrType::Public, BdAddr::ZERO),
        device_mode: false,
        lifecycle: EntryLifecycle::Free,
    };

    pub(crate) fn new(identity: IdentityAddress, device_mode: bool) -> Self {
        Self {
            identity,
            device_mode,
            lifecycle: EntryLifecycle::AddPending { sent: false },
        }
    }

    pub fn is_free(&self) -> bool {
        self.lifecycle == EntryLifecycle::Free
    }
}

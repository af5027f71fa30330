//! Fixed-capacity privacy table.
//!
//! One slot per possible bond. Slots are allocated first-free and keyed by
//! identity address; no two occupied slots share an identity.

use alloc::vec::Vec;

use super::entry::{EntryLifecycle, PrivacyEntry};
use super::PrivacyError;
use crate::gap::IdentityAddress;

/// Result of a remove request against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The controller may hold the entry; a Remove command is now pending.
    Scheduled(usize),
    /// The entry never reached the controller and was freed locally.
    Dropped(usize),
}

pub struct PrivacyTable {
    slots: Vec<PrivacyEntry>,
}

impl PrivacyTable {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize(capacity, PrivacyEntry::FREE);
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|e| !e.is_free()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(PrivacyEntry::is_free)
    }

    /// Occupied entry at `slot`.
    pub fn get(&self, slot: usize) -> Option<&PrivacyEntry> {
        self.slots.get(slot).filter(|e| !e.is_free())
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut PrivacyEntry> {
        self.slots.get_mut(slot).filter(|e| !e.is_free())
    }

    pub fn lifecycle(&self, slot: usize) -> EntryLifecycle {
        self.slots.get(slot).map_or(EntryLifecycle::Free, |e| e.lifecycle)
    }

    pub fn find(&self, identity: &IdentityAddress) -> Option<usize> {
        self.slots
            .iter()
            .position(|e| !e.is_free() && e.identity == *identity)
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PrivacyEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_free())
    }

    /// Allocates the first free slot for `identity` in `AddPending`.
    pub fn insert(&mut self, identity: IdentityAddress, device_mode: bool) -> Result<usize, PrivacyError> {
        if self.find(&identity).is_some() {
            return Err(PrivacyError::AlreadyExists);
        }
        let slot = self
            .slots
            .iter()
            .position(PrivacyEntry::is_free)
            .ok_or(PrivacyError::NoFreeSlot)?;
        self.slots[slot] = PrivacyEntry::new(identity, device_mode);
        Ok(slot)
    }

    /// Marks `identity` for removal, or frees it outright if the controller
    /// can't be holding it.
    pub fn mark_remove(&mut self, identity: &IdentityAddress) -> Result<RemoveOutcome, PrivacyError> {
        let slot = self.find(identity).ok_or(PrivacyError::NotFound)?;
        let entry = &mut self.slots[slot];
        if entry.lifecycle.may_be_in_controller() {
            entry.lifecycle = EntryLifecycle::RemovePending;
            Ok(RemoveOutcome::Scheduled(slot))
        } else {
            *entry = PrivacyEntry::FREE;
            Ok(RemoveOutcome::Dropped(slot))
        }
    }

    pub fn free(&mut self, slot: usize) {
        if let Some(e) = self.slots.get_mut(slot) {
            *e = PrivacyEntry::FREE;
        }
    }

    pub fn clear(&mut self) {
        self.slots.fill(PrivacyEntry::FREE);
    }

    /// First slot, in index order, that still needs a controller command.
    pub fn next_pending(&self) -> Option<usize> {
        self.iter().find(|(_, e)| e.lifecycle.is_pending()).map(|(i, _)| i)
    }

    pub fn has_pending(&self) -> bool {
        self.next_pending().is_some()
    }
}

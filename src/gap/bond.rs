//! Bond store seam.
//!
//! The key store itself lives in the host stack; the privacy manager only needs
//! to enumerate existing bonds and learn which identity each one maps to.

use alloc::vec::Vec;

use super::address::{BdAddr, IdentityAddrType, IdentityAddress, RemoteAddrType};

/// What the privacy manager needs to know about one bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondRecord {
    /// Index of the bond in the key store.
    pub slot: usize,
    pub remote_addr_type: RemoteAddrType,
    pub remote_addr: BdAddr,
    /// Identity address distributed during pairing, if any.
    pub identity: Option<IdentityAddress>,
    /// Peer distributed its IRK.
    pub has_remote_irk: bool,
    /// Peer was discoverable when bonded.
    pub discoverable: bool,
    /// Peer advertised the Resolvable Private Address Only characteristic.
    pub resolvable_addr_only: bool,
}

impl BondRecord {
    /// Identity to place in the resolving list, or `None` if the bond cannot
    /// be resolved (random private address without an IRK).
    pub fn resolving_identity(&self) -> Option<IdentityAddress> {
        let usable_as_is = match self.remote_addr_type {
            RemoteAddrType::Public => true,
            RemoteAddrType::Random => self.remote_addr.is_static_random(),
        };
        if usable_as_is {
            return Some(IdentityAddress::new(
                IdentityAddrType::from(self.remote_addr_type),
                self.remote_addr,
            ));
        }
        if self.has_remote_irk {
            return self.identity;
        }
        None
    }

    /// Identity to remove from the resolving list when this bond is deleted.
    pub fn removal_identity(&self) -> IdentityAddress {
        match (self.has_remote_irk, self.identity) {
            (true, Some(identity)) => identity,
            _ => IdentityAddress::new(IdentityAddrType::from(self.remote_addr_type), self.remote_addr),
        }
    }

    /// Device privacy mode is wanted unless the peer only ever uses resolvable
    /// addresses and was discoverable when bonded.
    pub fn wants_device_mode(&self) -> bool {
        !(self.discoverable && self.resolvable_addr_only)
    }
}

/// Read access to the host's bond store.
pub trait BondStore {
    /// Maximum number of LE bonds the store can hold; sizes the privacy table.
    fn max_bonded_count(&self) -> usize;

    /// All bonds currently stored.
    fn enumerate_all(&self) -> Vec<BondRecord>;
}

/// Bond store change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondEvent {
    Added(BondRecord),
    Deleted(BondRecord),
    Cleared,
}

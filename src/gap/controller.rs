//! The controller-side port the privacy manager drives.
//!
//! Every request returns a synchronous [`Cause`]. Resolving-list, privacy-mode
//! and read requests complete later with a separate response event that the
//! host stack feeds back into [`crate::privacy::PrivacyManager`].

use super::address::{BdAddr, IdentityAddrType, RemoteAddrType};
use super::cause::Cause;

/// Resolving list modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvingListOp {
    Add,
    Remove,
    Clear,
}

/// Whitelist (filter accept list) modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistOp {
    Add,
    Remove,
    Clear,
}

/// Per-peer privacy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyMode {
    /// Accept identity and resolvable addresses from the peer.
    Network,
    /// Accept only resolvable private addresses from the peer.
    Device,
}

/// Which side's resolvable address a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAddressKind {
    Peer,
    Local,
}

/// Radio activity that blocks resolving list changes while address
/// resolution is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceActivity {
    pub advertising: bool,
    pub connecting: bool,
    pub scanning: bool,
}

impl DeviceActivity {
    pub const IDLE: Self = Self {
        advertising: false,
        connecting: false,
        scanning: false,
    };

    pub fn is_idle(&self) -> bool {
        !self.advertising && !self.connecting && !self.scanning
    }
}

/// Commands issued towards the controller.
pub trait ControllerPort {
    fn modify_resolving_list(
        &mut self,
        op: ResolvingListOp,
        addr_type: IdentityAddrType,
        addr: &BdAddr,
    ) -> Cause;

    /// Adds the all-zero identity with an all-zero IRK so RPA advertising works
    /// before anything is bonded. Completes without a response event.
    fn add_placeholder_entry(&mut self) -> Cause;

    fn set_privacy_mode(
        &mut self,
        addr_type: IdentityAddrType,
        addr: &BdAddr,
        mode: PrivacyMode,
    ) -> Cause;

    fn set_address_resolution(&mut self, enable: bool) -> Cause;

    fn read_resolved_address(
        &mut self,
        kind: ResolvedAddressKind,
        addr_type: IdentityAddrType,
        addr: &BdAddr,
    ) -> Cause;

    fn set_rpa_timeout(&mut self, timeout_secs: u16) -> Cause;

    /// Fire-and-forget; no completion is tracked.
    fn modify_whitelist(&mut self, op: WhitelistOp, addr: &BdAddr, addr_type: RemoteAddrType)
        -> Cause;

    fn query_device_activity(&self) -> DeviceActivity;
}

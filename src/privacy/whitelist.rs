//! Whitelist Mirror.
//!
//! Best-effort shadow of resolving list changes into the controller whitelist.
//! Calls are fire-and-forget: a refused whitelist command is logged and never
//! retried, so the whitelist can drift from the resolving list after a
//! failure. `shadow` records what was requested, not what the controller holds.

use alloc::vec::Vec;

use crate::gap::{BdAddr, ControllerPort, IdentityAddress, RemoteAddrType, WhitelistOp};

pub struct WhitelistMirror {
    enabled: bool,
    shadow: Vec<IdentityAddress>,
}

impl WhitelistMirror {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            shadow: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Identities we asked the controller to whitelist.
    pub fn mirrored(&self) -> &[IdentityAddress] {
        &self.shadow
    }

    pub fn add<C: ControllerPort + ?Sized>(&mut self, ctrl: &mut C, identity: &IdentityAddress) {
        if !self.enabled {
            return;
        }
        Self::send(ctrl, WhitelistOp::Add, &identity.addr, identity.addr_type.into());
        if !self.shadow.contains(identity) {
            self.shadow.push(*identity);
        }
    }

    pub fn remove<C: ControllerPort + ?Sized>(&mut self, ctrl: &mut C, identity: &IdentityAddress) {
        if !self.enabled {
            return;
        }
        Self::send(ctrl, WhitelistOp::Remove, &identity.addr, identity.addr_type.into());
        self.shadow.retain(|i| i != identity);
    }

    pub fn clear<C: ControllerPort + ?Sized>(&mut self, ctrl: &mut C) {
        if !self.enabled {
            return;
        }
        Self::send(ctrl, WhitelistOp::Clear, &BdAddr::ZERO, RemoteAddrType::Public);
        self.shadow.clear();
    }

    fn send<C: ControllerPort + ?Sized>(ctrl: &mut C, op: WhitelistOp, addr: &BdAddr, addr_type: RemoteAddrType) {
        let cause = ctrl.modify_whitelist(op, addr, addr_type);
        if !cause.is_success() {
            log::warn!("[PRIVACY] whitelist {:?} {} ignored failure: {}", op, addr, cause);
        }
    }
}

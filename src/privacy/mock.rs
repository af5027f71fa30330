//! Test doubles for the controller, bond store and observer.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use super::events::{PrivacyEvent, PrivacyEventObserver};
use super::PrivacyManager;
use crate::config::PrivacyConfig;
use crate::gap::{
    BdAddr, BondRecord, BondStore, Cause, ControllerPort, DeviceActivity, IdentityAddrType,
    IdentityAddress, PrivacyMode, RemoteAddrType, ResolvedAddressKind, ResolvingListOp, WhitelistOp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    ResolvingList(ResolvingListOp, IdentityAddrType, BdAddr),
    Placeholder,
    PrivacyMode(IdentityAddrType, BdAddr, PrivacyMode),
    AddressResolution(bool),
    ReadResolved(ResolvedAddressKind, IdentityAddrType, BdAddr),
    RpaTimeout(u16),
    Whitelist(WhitelistOp, BdAddr, RemoteAddrType),
}

/// Records every command; answers from scripted queues, `Success` otherwise.
#[derive(Default)]
pub struct MockController {
    pub calls: Vec<Call>,
    pub activity: DeviceActivity,
    pub list_causes: VecDeque<Cause>,
    pub mode_causes: VecDeque<Cause>,
    pub whitelist_causes: VecDeque<Cause>,
    pub placeholder_cause: Option<Cause>,
    pub resolution_cause: Option<Cause>,
}

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_calls(&self) -> Vec<(ResolvingListOp, BdAddr)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::ResolvingList(op, _, addr) => Some((*op, *addr)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(*c)).count()
    }
}

impl ControllerPort for MockController {
    fn modify_resolving_list(&mut self, op: ResolvingListOp, addr_type: IdentityAddrType, addr: &BdAddr) -> Cause {
        self.calls.push(Call::ResolvingList(op, addr_type, *addr));
        self.list_causes.pop_front().unwrap_or(Cause::Success)
    }

    fn add_placeholder_entry(&mut self) -> Cause {
        self.calls.push(Call::Placeholder);
        self.placeholder_cause.unwrap_or(Cause::Success)
    }

    fn set_privacy_mode(&mut self, addr_type: IdentityAddrType, addr: &BdAddr, mode: PrivacyMode) -> Cause {
        self.calls.push(Call::PrivacyMode(addr_type, *addr, mode));
        self.mode_causes.pop_front().unwrap_or(Cause::Success)
    }

    fn set_address_resolution(&mut self, enable: bool) -> Cause {
        self.calls.push(Call::AddressResolution(enable));
        self.resolution_cause.unwrap_or(Cause::Success)
    }

    fn read_resolved_address(&mut self, kind: ResolvedAddressKind, addr_type: IdentityAddrType, addr: &BdAddr) -> Cause {
        self.calls.push(Call::ReadResolved(kind, addr_type, *addr));
        Cause::Success
    }

    fn set_rpa_timeout(&mut self, timeout_secs: u16) -> Cause {
        self.calls.push(Call::RpaTimeout(timeout_secs));
        Cause::Success
    }

    fn modify_whitelist(&mut self, op: WhitelistOp, addr: &BdAddr, addr_type: RemoteAddrType) -> Cause {
        self.calls.push(Call::Whitelist(op, *addr, addr_type));
        self.whitelist_causes.pop_front().unwrap_or(Cause::Success)
    }

    fn query_device_activity(&self) -> DeviceActivity {
        self.activity
    }
}

pub struct MockBondStore {
    pub max: usize,
    pub records: Vec<BondRecord>,
}

impl MockBondStore {
    pub fn empty(max: usize) -> Self {
        Self { max, records: Vec::new() }
    }
}

impl BondStore for MockBondStore {
    fn max_bonded_count(&self) -> usize {
        self.max
    }

    fn enumerate_all(&self) -> Vec<BondRecord> {
        self.records.clone()
    }
}

/// Observer that keeps every event; clone the handle to inspect it.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Rc<RefCell<Vec<PrivacyEvent>>>,
}

impl RecordingObserver {
    pub fn take(&self) -> Vec<PrivacyEvent> {
        core::mem::take(&mut *self.events.borrow_mut())
    }
}

impl PrivacyEventObserver for RecordingObserver {
    fn on_privacy_event(&self, event: &PrivacyEvent) {
        self.events.borrow_mut().push(*event);
    }
}

pub fn ident(n: u8) -> IdentityAddress {
    IdentityAddress::new(IdentityAddrType::Public, BdAddr::new([n, 0x11, 0x22, 0x33, 0x44, 0x55]))
}

/// Bond with a public address, wanting device mode.
pub fn public_bond(slot: usize, n: u8) -> BondRecord {
    BondRecord {
        slot,
        remote_addr_type: RemoteAddrType::Public,
        remote_addr: ident(n).addr,
        identity: None,
        has_remote_irk: false,
        discoverable: false,
        resolvable_addr_only: false,
    }
}

/// Initialized manager over an empty bond store of `max` slots, with the
/// init traffic and events already drained.
pub fn started(cfg: PrivacyConfig, max: usize) -> (PrivacyManager<MockController>, RecordingObserver) {
    let mut mgr = PrivacyManager::new(cfg, MockController::new());
    let obs = RecordingObserver::default();
    mgr.register_observer(Box::new(obs.clone()));
    mgr.init(&MockBondStore::empty(max)).unwrap();
    mgr.controller_mut().calls.clear();
    obs.take();
    (mgr, obs)
}

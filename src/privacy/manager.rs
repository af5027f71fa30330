//! Privacy Manager.
//!
//! Owns the privacy table and all controller-facing state. Bond store events,
//! application requests and controller completions all enter here; the
//! processor (`processor.rs`) and response handlers (`response.rs`) are
//! further `impl` blocks on the same struct.

use alloc::boxed::Box;

use super::events::{EventGateway, PrivacyEvent, PrivacyEventObserver, ResolutionStatus};
use super::state::{ManagerState, StateMachine};
use super::table::{PrivacyTable, RemoveOutcome};
use super::whitelist::WhitelistMirror;
use super::PrivacyError;
use crate::config::PrivacyConfig;
use crate::gap::{
    BondEvent, BondRecord, BondStore, ControllerPort, IdentityAddress, PrivacyMode,
    ResolvedAddressKind, ResolvingListOp,
};
use crate::watchdog::ResponseWatchdog;

/// Longest RPA timeout the controller accepts, in seconds (11.5 hours).
pub const RPA_TIMEOUT_MAX_SECS: u16 = 0xA1B8;

/// The per-entry command currently awaiting a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub slot: usize,
    pub op: ResolvingListOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClearState {
    Idle,
    /// Requested, not yet accepted by the controller.
    Pending,
    /// Accepted, waiting for the response.
    Dispatched,
    /// Response overdue. A late one is still awaited before the clear is
    /// sent again.
    Abandoned,
}

impl ClearState {
    /// A clear command is outstanding at the controller.
    pub(crate) fn awaits_response(self) -> bool {
        matches!(self, ClearState::Dispatched | ClearState::Abandoned)
    }
}

pub struct PrivacyManager<C: ControllerPort> {
    pub(crate) config: PrivacyConfig,
    pub(crate) controller: C,
    pub(crate) table: PrivacyTable,
    pub(crate) state: StateMachine,
    pub(crate) in_flight: Option<InFlight>,
    /// Per-entry command still outstanding after a clear request or a
    /// watchdog expiry detached it from its slot.
    pub(crate) orphaned: Option<ResolvingListOp>,
    pub(crate) clear: ClearState,
    pub(crate) resolution_status: ResolutionStatus,
    pub(crate) whitelist: WhitelistMirror,
    pub(crate) events: EventGateway,
    pub(crate) watchdog: ResponseWatchdog,
}

impl<C: ControllerPort> PrivacyManager<C> {
    /// Creates a manager in the Init state. Nothing is sent to the controller
    /// until [`PrivacyManager::init`].
    pub fn new(config: PrivacyConfig, controller: C) -> Self {
        Self {
            whitelist: WhitelistMirror::new(config.whitelist_mirror),
            watchdog: ResponseWatchdog::new(config.response_timeout_ms),
            config,
            controller,
            table: PrivacyTable::new(0),
            state: StateMachine::new(),
            in_flight: None,
            orphaned: None,
            clear: ClearState::Idle,
            resolution_status: ResolutionStatus::Disabled,
            events: EventGateway::new(),
        }
    }

    pub fn register_observer(&mut self, observer: Box<dyn PrivacyEventObserver>) {
        self.events.register(observer);
    }

    pub fn unregister_observer(&mut self) {
        self.events.unregister();
    }

    /// Sizes the table from the bond store, loads every existing bond and
    /// enables address resolution.
    ///
    /// # Errors
    /// * `AlreadyInitialized` on a second call.
    /// * `Controller(cause)` if the placeholder entry or address resolution
    ///   is refused.
    pub fn init(&mut self, bonds: &dyn BondStore) -> Result<(), PrivacyError> {
        if self.state.state() != ManagerState::Init {
            return Err(PrivacyError::AlreadyInitialized);
        }
        let capacity = bonds.max_bonded_count();
        log::info!(
            "[PRIVACY] init: capacity {}, whitelist {}, mode manage {}",
            capacity,
            self.config.whitelist_mirror,
            self.config.mode_manage
        );
        self.table = PrivacyTable::new(capacity);

        if self.config.rpa_placeholder {
            let cause = self.controller.add_placeholder_entry();
            if !cause.is_success() {
                return Err(PrivacyError::Controller(cause));
            }
        }

        for record in bonds.enumerate_all() {
            self.load_bond(&record);
        }

        let started = self.state.start()?;
        self.emit_transition(started);
        if self.has_pending_work() {
            let busy = self.state.set_busy();
            self.emit_transition(busy);
        }
        self.process(true);

        let cause = self.controller.set_address_resolution(true);
        if !cause.is_success() {
            log::warn!("[PRIVACY] set address resolution failed: {}", cause);
            return Err(PrivacyError::Controller(cause));
        }
        Ok(())
    }

    fn load_bond(&mut self, record: &BondRecord) -> bool {
        let Some(identity) = record.resolving_identity() else {
            log::warn!(
                "[PRIVACY] bond {} ({}) has no resolvable identity, skipped",
                record.slot,
                record.remote_addr
            );
            return false;
        };
        match self.table.insert(identity, record.wants_device_mode()) {
            Ok(slot) => {
                log::info!("[PRIVACY] add {} to slot {}", identity, slot);
                true
            }
            Err(e) => {
                log::warn!("[PRIVACY] add {} failed: {}", identity, e);
                false
            }
        }
    }

    /// Queues `identity` for addition to the resolving list.
    pub fn add_or_update(&mut self, identity: IdentityAddress, device_mode: bool) -> Result<usize, PrivacyError> {
        self.ensure_started()?;
        let slot = self.table.insert(identity, device_mode)?;
        log::info!("[PRIVACY] add {} to slot {}", identity, slot);
        let busy = self.state.set_busy();
        self.emit_transition(busy);
        self.process(true);
        Ok(slot)
    }

    /// Queues `identity` for removal, or forgets it if the controller never
    /// saw it.
    pub fn request_remove(&mut self, identity: &IdentityAddress) -> Result<RemoveOutcome, PrivacyError> {
        self.ensure_started()?;
        let outcome = self.table.mark_remove(identity)?;
        match outcome {
            RemoveOutcome::Scheduled(slot) => {
                log::info!("[PRIVACY] remove {} from slot {}", identity, slot);
                let busy = self.state.set_busy();
                self.emit_transition(busy);
            }
            RemoveOutcome::Dropped(slot) => {
                log::info!("[PRIVACY] remove {}: slot {} not added yet, dropped", identity, slot);
            }
        }
        self.process(true);
        Ok(outcome)
    }

    /// Queues a clear of the whole resolving list. Per-entry work is held
    /// back until the clear succeeds.
    pub fn request_clear_all(&mut self) -> Result<(), PrivacyError> {
        self.ensure_started()?;
        if let Some(f) = self.in_flight.take() {
            log::info!("[PRIVACY] clear requested while {:?} of slot {} in flight", f.op, f.slot);
            self.orphaned = Some(f.op);
        }
        if self.clear == ClearState::Idle {
            self.clear = ClearState::Pending;
        }
        let busy = self.state.set_busy();
        self.emit_transition(busy);
        self.process(true);
        Ok(())
    }

    /// Applies a bond store change. Failures are logged and absorbed.
    pub fn handle_bond_event(&mut self, event: &BondEvent) {
        if self.state.state() == ManagerState::Init {
            log::debug!("[PRIVACY] bond event before init ignored");
            return;
        }
        match event {
            BondEvent::Added(record) => {
                if self.load_bond(record) {
                    let busy = self.state.set_busy();
                    self.emit_transition(busy);
                }
                self.process(true);
            }
            BondEvent::Deleted(record) => {
                let identity = record.removal_identity();
                if let Err(e) = self.request_remove(&identity) {
                    log::warn!("[PRIVACY] remove {} failed: {}", identity, e);
                }
            }
            BondEvent::Cleared => {
                if let Err(e) = self.request_clear_all() {
                    log::warn!("[PRIVACY] clear failed: {}", e);
                }
            }
        }
    }

    pub fn on_bond_added(&mut self, record: &BondRecord) {
        self.handle_bond_event(&BondEvent::Added(*record));
    }

    pub fn on_bond_deleted(&mut self, record: &BondRecord) {
        self.handle_bond_event(&BondEvent::Deleted(*record));
    }

    pub fn on_bond_cleared(&mut self) {
        self.handle_bond_event(&BondEvent::Cleared);
    }

    /// Advertising, connecting or scanning state changed; held-back work may
    /// now go out.
    pub fn on_device_activity_changed(&mut self) {
        self.process(false);
    }

    /// Advances the response watchdog.
    ///
    /// The first expiry abandons the outstanding command: it is detached, so
    /// a late response is only reported and the work is then retried. A
    /// second expiry stops waiting for that response and retries at once.
    pub fn on_tick(&mut self, elapsed_ms: u64) {
        if self.watchdog.advance(elapsed_ms).is_ok() {
            return;
        }
        if let Some(f) = self.in_flight.take() {
            log::warn!("[PRIVACY] no response to {:?} of slot {}, abandoned", f.op, f.slot);
            self.orphaned = Some(f.op);
            self.watchdog.arm();
        } else if let Some(op) = self.orphaned.take() {
            log::warn!("[PRIVACY] no response to detached {:?}, giving up", op);
        }
        match self.clear {
            ClearState::Dispatched => {
                log::warn!("[PRIVACY] no response to clear, abandoned");
                self.clear = ClearState::Abandoned;
                self.watchdog.arm();
            }
            ClearState::Abandoned => {
                log::warn!("[PRIVACY] no response to abandoned clear, will retry");
                self.clear = ClearState::Pending;
            }
            ClearState::Idle | ClearState::Pending => {}
        }
        self.process(true);
    }

    pub fn set_address_resolution(&mut self, enable: bool) -> Result<(), PrivacyError> {
        let cause = self.controller.set_address_resolution(enable);
        if !cause.is_success() {
            return Err(PrivacyError::Controller(cause));
        }
        Ok(())
    }

    /// Completion arrives via `on_read_resolved_address_response`.
    pub fn read_resolved_address(
        &mut self,
        kind: ResolvedAddressKind,
        identity: &IdentityAddress,
    ) -> Result<(), PrivacyError> {
        let cause = self
            .controller
            .read_resolved_address(kind, identity.addr_type, &identity.addr);
        if !cause.is_success() {
            return Err(PrivacyError::Controller(cause));
        }
        Ok(())
    }

    pub fn set_rpa_timeout(&mut self, timeout_secs: u16) -> Result<(), PrivacyError> {
        if timeout_secs == 0 || timeout_secs > RPA_TIMEOUT_MAX_SECS {
            return Err(PrivacyError::InvalidParameter);
        }
        let cause = self.controller.set_rpa_timeout(timeout_secs);
        if !cause.is_success() {
            return Err(PrivacyError::Controller(cause));
        }
        Ok(())
    }

    /// Sets a peer's privacy mode on behalf of the application. Only allowed
    /// when the manager does not manage modes itself.
    pub fn set_privacy_mode(&mut self, identity: &IdentityAddress, mode: PrivacyMode) -> Result<(), PrivacyError> {
        if self.config.mode_manage {
            return Err(PrivacyError::ModeManaged);
        }
        let cause = self
            .controller
            .set_privacy_mode(identity.addr_type, &identity.addr, mode);
        if !cause.is_success() {
            return Err(PrivacyError::Controller(cause));
        }
        Ok(())
    }

    pub fn state(&self) -> ManagerState {
        self.state.state()
    }

    pub fn table(&self) -> &PrivacyTable {
        &self.table
    }

    /// Slot whose resolving list command awaits a response.
    pub fn in_flight(&self) -> Option<usize> {
        self.in_flight.map(|f| f.slot)
    }

    /// A clear was requested and has not yet succeeded.
    pub fn global_clear_pending(&self) -> bool {
        self.clear != ClearState::Idle
    }

    pub fn resolution_status(&self) -> ResolutionStatus {
        self.resolution_status
    }

    pub fn config(&self) -> &PrivacyConfig {
        &self.config
    }

    pub fn whitelist(&self) -> &WhitelistMirror {
        &self.whitelist
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    fn ensure_started(&self) -> Result<(), PrivacyError> {
        match self.state.state() {
            ManagerState::Init => Err(PrivacyError::NotInitialized),
            _ => Ok(()),
        }
    }

    pub(crate) fn has_pending_work(&self) -> bool {
        self.clear != ClearState::Idle || self.table.has_pending()
    }

    pub(crate) fn emit_transition(&self, change: Option<(ManagerState, ManagerState)>) {
        if let Some((from, to)) = change {
            self.events.emit(PrivacyEvent::OverallStateChanged { from, to });
        }
    }
}

//! Response Handler.
//!
//! Consumes controller completions. Resolving list failures are absorbed
//! here and never surfaced as errors; the application only sees them as
//! `ResolvingListModified` reports.

use super::entry::EntryLifecycle;
use super::events::{PrivacyEvent, ResolutionStatus, ResolvedEntry};
use super::manager::{ClearState, PrivacyManager};
use crate::gap::{BdAddr, Cause, ControllerPort, ResolvedAddressKind, ResolvingListOp, Severity};

impl<C: ControllerPort> PrivacyManager<C> {
    /// Routes a resolving list completion by operation.
    pub fn on_resolving_list_response(&mut self, op: ResolvingListOp, cause: Cause) {
        match op {
            ResolvingListOp::Add => self.on_add_response(cause),
            ResolvingListOp::Remove => self.on_remove_response(cause),
            ResolvingListOp::Clear => self.on_clear_response(cause),
        }
    }

    pub fn on_add_response(&mut self, cause: Cause) {
        let Some(slot) = self.take_in_flight(ResolvingListOp::Add, cause) else {
            return;
        };
        self.report_modified(ResolvingListOp::Add, Some(slot), cause);

        match cause.classify_response() {
            None => {
                if let Some(e) = self.table.get_mut(slot) {
                    // a remove queued meanwhile stays queued
                    if matches!(e.lifecycle, EntryLifecycle::AddPending { .. }) {
                        e.lifecycle = EntryLifecycle::Added;
                    }
                }
            }
            Some(Severity::Transient) => {
                log::warn!("[PRIVACY] add of slot {} failed: {}, will retry", slot, cause);
            }
            Some(Severity::Terminal) => {
                log::warn!("[PRIVACY] add of slot {} failed: {}, dropped", slot, cause);
                self.table.free(slot);
            }
        }
        self.process(true);
    }

    pub fn on_remove_response(&mut self, cause: Cause) {
        let Some(slot) = self.take_in_flight(ResolvingListOp::Remove, cause) else {
            return;
        };
        self.report_modified(ResolvingListOp::Remove, Some(slot), cause);

        match cause.classify_response() {
            Some(Severity::Transient) => {
                log::warn!("[PRIVACY] remove of slot {} failed: {}, will retry", slot, cause);
            }
            None | Some(Severity::Terminal) => self.table.free(slot),
        }
        self.process(true);
    }

    pub fn on_clear_response(&mut self, cause: Cause) {
        match self.clear {
            ClearState::Dispatched => {}
            ClearState::Abandoned => {
                // overdue clear; the table is left alone and the clear resent
                log::info!("[PRIVACY] abandoned clear completed: {}", cause);
                self.watchdog.disarm();
                self.report_modified(ResolvingListOp::Clear, None, cause);
                self.clear = ClearState::Pending;
                self.process(true);
                return;
            }
            ClearState::Idle | ClearState::Pending => {
                log::warn!("[PRIVACY] unexpected clear response ({}), ignored", cause);
                return;
            }
        }
        self.watchdog.disarm();
        self.report_modified(ResolvingListOp::Clear, None, cause);

        if cause.is_success() {
            self.table.clear();
            self.clear = ClearState::Idle;
            if self.config.rpa_placeholder {
                let cause = self.controller.add_placeholder_entry();
                if !cause.is_success() {
                    log::warn!("[PRIVACY] placeholder entry after clear failed: {}", cause);
                }
            }
        } else {
            log::warn!("[PRIVACY] clear failed: {}, will retry", cause);
            self.clear = ClearState::Pending;
        }
        self.process(true);
    }

    /// Completion of a `SetPrivacyMode`. Never rolls back the related Add.
    pub fn on_mode_set_response(&mut self, cause: Cause) {
        if self.config.mode_manage {
            log::info!("[PRIVACY] set privacy mode: cause {}", cause);
        } else {
            self.events.emit(PrivacyEvent::ModeSetResult(cause));
        }
    }

    pub fn on_resolution_status_changed(&mut self, status: ResolutionStatus) {
        log::info!("[PRIVACY] resolution status {:?}", status);
        self.resolution_status = status;
        self.events.emit(PrivacyEvent::ResolutionStatusChanged(status));
        self.process(false);
    }

    pub fn on_read_resolved_address_response(&mut self, kind: ResolvedAddressKind, addr: BdAddr, cause: Cause) {
        self.events
            .emit(PrivacyEvent::ReadResolvedAddressResult { kind, addr, cause });
    }

    pub fn on_rpa_timeout_response(&mut self, cause: Cause) {
        log::info!("[PRIVACY] set RPA timeout: cause {}", cause);
    }

    /// Matches a per-entry completion against the outstanding command.
    ///
    /// A completion for a command detached by a clear request or a watchdog
    /// expiry is reported and dropped; anything else that does not match is a protocol violation and
    /// is ignored.
    fn take_in_flight(&mut self, op: ResolvingListOp, cause: Cause) -> Option<usize> {
        let current = self.in_flight;
        match current {
            Some(f) if f.op == op => {
                self.in_flight = None;
                self.watchdog.disarm();
                Some(f.slot)
            }
            _ if self.orphaned == Some(op) => {
                log::info!("[PRIVACY] detached {:?} completed: {}", op, cause);
                self.orphaned = None;
                self.watchdog.disarm();
                self.report_modified(op, None, cause);
                self.process(true);
                None
            }
            _ => {
                log::warn!(
                    "[PRIVACY] unexpected {:?} response ({}) with {:?} in flight, ignored",
                    op,
                    cause,
                    self.in_flight
                );
                None
            }
        }
    }

    fn report_modified(&self, op: ResolvingListOp, slot: Option<usize>, cause: Cause) {
        let entry = slot.and_then(|s| self.table.get(s)).map(|e| ResolvedEntry {
            identity: e.identity,
            device_mode: e.device_mode,
        });
        self.events
            .emit(PrivacyEvent::ResolvingListModified { op, entry, cause });
    }
}

//! Pending-Operation Processor.
//!
//! One pass issues at most one resolving list command. The pass is re-run on
//! every event that could unblock progress: init, newly queued work, a
//! controller response, a device activity change or a watchdog expiry.

use super::entry::EntryLifecycle;
use super::events::{PendingReason, PrivacyEvent, ResolutionStatus};
use super::manager::{ClearState, InFlight, PrivacyManager};
use super::mode;
use super::state::ManagerState;
use crate::gap::{BdAddr, ControllerPort, IdentityAddrType, ResolvingListOp, Severity};

/// What happened to the entry the processor tried to dispatch.
enum Dispatch {
    /// Accepted; now in flight.
    Sent,
    /// Controller busy; retry on the next trigger.
    Deferred,
    /// Refused for good; the slot was freed and scanning continues.
    Dropped,
}

impl<C: ControllerPort> PrivacyManager<C> {
    /// Runs one processor pass. With `indicate`, work held back by radio
    /// activity is reported as `ResolvingListPending`.
    pub(crate) fn process(&mut self, indicate: bool) {
        if self.state.state() == ManagerState::Init {
            return;
        }
        if self.in_flight.is_some() || self.orphaned.is_some() || self.clear.awaits_response() {
            log::debug!("[PRIVACY] wait rsp");
            return;
        }

        let activity = self.controller.query_device_activity();
        if self.resolution_status != ResolutionStatus::Disabled && !activity.is_idle() {
            log::debug!("[PRIVACY] held back by {:?}", activity);
            if indicate && self.has_pending_work() {
                self.events.emit(PrivacyEvent::ResolvingListPending(PendingReason {
                    advertising: activity.advertising,
                    connecting: activity.connecting,
                    scanning: activity.scanning,
                }));
            }
            return;
        }

        if self.clear == ClearState::Pending {
            self.dispatch_clear();
            return;
        }

        while let Some(slot) = self.table.next_pending() {
            match self.dispatch_entry(slot) {
                Dispatch::Sent | Dispatch::Deferred => return,
                Dispatch::Dropped => continue,
            }
        }

        log::debug!("[PRIVACY] idle");
        let idle = self.state.set_idle();
        self.emit_transition(idle);
    }

    fn dispatch_clear(&mut self) {
        let cause = self
            .controller
            .modify_resolving_list(ResolvingListOp::Clear, IdentityAddrType::Public, &BdAddr::ZERO);
        match cause.classify_request() {
            None => {
                log::info!("[PRIVACY] clear");
                self.clear = ClearState::Dispatched;
                self.watchdog.arm();
                self.whitelist.clear(&mut self.controller);
            }
            Some(Severity::Transient) => {
                log::debug!("[PRIVACY] clear deferred: {}", cause);
            }
            Some(Severity::Terminal) => {
                // a clear is never abandoned
                log::warn!("[PRIVACY] clear failed: {}, kept pending", cause);
            }
        }
    }

    fn dispatch_entry(&mut self, slot: usize) -> Dispatch {
        let Some(entry) = self.table.get(slot).copied() else {
            return Dispatch::Dropped;
        };
        let op = match entry.lifecycle {
            EntryLifecycle::AddPending { .. } => ResolvingListOp::Add,
            EntryLifecycle::RemovePending => ResolvingListOp::Remove,
            EntryLifecycle::Free | EntryLifecycle::Added => return Dispatch::Dropped,
        };
        let identity = entry.identity;

        let cause = self
            .controller
            .modify_resolving_list(op, identity.addr_type, &identity.addr);
        match cause.classify_request() {
            None => {
                log::info!("[PRIVACY] {:?}: slot {}, {}", op, slot, identity);
                self.in_flight = Some(InFlight { slot, op });
                self.watchdog.arm();
                match op {
                    ResolvingListOp::Add => {
                        if let Some(e) = self.table.get_mut(slot) {
                            e.lifecycle = EntryLifecycle::AddPending { sent: true };
                        }
                        self.whitelist.add(&mut self.controller, &identity);
                        if self.config.mode_manage {
                            if let Some(mode) = mode::mode_to_request(&entry) {
                                let cause = self.controller.set_privacy_mode(identity.addr_type, &identity.addr, mode);
                                if !cause.is_success() {
                                    log::warn!("[PRIVACY] set {:?} mode for {} failed: {}", mode, identity, cause);
                                }
                            }
                        }
                    }
                    _ => self.whitelist.remove(&mut self.controller, &identity),
                }
                Dispatch::Sent
            }
            Some(Severity::Transient) => {
                log::debug!("[PRIVACY] {:?} failed: invalid state", op);
                Dispatch::Deferred
            }
            Some(Severity::Terminal) => {
                log::warn!("[PRIVACY] {:?} failed: {}, drop slot {}", op, cause, slot);
                self.table.free(slot);
                Dispatch::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::config::PrivacyConfig;
    use crate::gap::{Cause, DeviceActivity, PrivacyMode, RemoteAddrType, WhitelistOp};
    use crate::privacy::mock::*;

    /// Queues `n` adds while the radio is advertising with resolution on.
    fn gated_with_pending(n: u8) -> (PrivacyManager<MockController>, RecordingObserver) {
        let (mut mgr, obs) = started(PrivacyConfig::default(), 4);
        mgr.controller_mut().activity.advertising = true;
        mgr.on_resolution_status_changed(ResolutionStatus::Enabled);
        for i in 1..=n {
            mgr.add_or_update(ident(i), true).unwrap();
        }
        (mgr, obs)
    }

    #[test]
    fn test_gate_blocks_all_traffic() {
        let (mut mgr, _) = gated_with_pending(2);
        mgr.on_device_activity_changed();
        assert!(mgr.controller().list_calls().is_empty());
        assert_eq!(mgr.in_flight(), None);
        assert_eq!(mgr.state(), ManagerState::Busy);

        mgr.controller_mut().activity = DeviceActivity::IDLE;
        mgr.on_device_activity_changed();
        assert_eq!(mgr.controller().list_calls(), vec![(ResolvingListOp::Add, ident(1).addr)]);
        assert_eq!(mgr.in_flight(), Some(0));
    }

    #[test]
    fn test_gate_ignored_while_resolution_disabled() {
        let (mut mgr, _) = started(PrivacyConfig::default(), 2);
        mgr.controller_mut().activity.scanning = true;
        mgr.add_or_update(ident(1), true).unwrap();
        assert_eq!(mgr.controller().list_calls().len(), 1);
    }

    #[test]
    fn test_gate_reports_pending_reason() {
        let (mut mgr, obs) = started(PrivacyConfig::default(), 2);
        mgr.controller_mut().activity = DeviceActivity {
            advertising: true,
            connecting: true,
            scanning: false,
        };
        mgr.on_resolution_status_changed(ResolutionStatus::Enabled);
        obs.take();

        mgr.add_or_update(ident(1), true).unwrap();
        let events = obs.take();
        assert!(events.contains(&PrivacyEvent::ResolvingListPending(PendingReason {
            advertising: true,
            connecting: true,
            scanning: false,
        })));

        // activity triggers do not indicate
        mgr.on_device_activity_changed();
        assert!(obs.take().is_empty());
    }

    #[test]
    fn test_add_side_effects() {
        let (mut mgr, _) = started(PrivacyConfig::default(), 2);
        let id = ident(1);
        mgr.add_or_update(id, true).unwrap();
        assert_eq!(
            mgr.controller().calls,
            vec![
                Call::ResolvingList(ResolvingListOp::Add, id.addr_type, id.addr),
                Call::Whitelist(WhitelistOp::Add, id.addr, RemoteAddrType::Public),
                Call::PrivacyMode(id.addr_type, id.addr, PrivacyMode::Device),
            ]
        );
        assert_eq!(mgr.whitelist().mirrored(), &[id]);
    }

    #[test]
    fn test_network_mode_and_no_mirror() {
        let cfg = PrivacyConfig {
            whitelist_mirror: false,
            ..Default::default()
        };
        let (mut mgr, _) = started(cfg, 2);
        mgr.add_or_update(ident(1), false).unwrap();
        assert_eq!(mgr.controller().calls.len(), 1);
    }

    #[test]
    fn test_mode_unmanaged_not_requested() {
        let cfg = PrivacyConfig {
            mode_manage: false,
            ..Default::default()
        };
        let (mut mgr, _) = started(cfg, 2);
        mgr.add_or_update(ident(1), true).unwrap();
        assert_eq!(mgr.controller().count(|c| matches!(c, Call::PrivacyMode(..))), 0);
    }

    #[test]
    fn test_mode_failure_keeps_add() {
        let (mut mgr, _) = started(PrivacyConfig::default(), 2);
        mgr.controller_mut().mode_causes.push_back(Cause::Gap(0x0105));
        mgr.add_or_update(ident(1), true).unwrap();
        assert_eq!(mgr.in_flight(), Some(0));
        mgr.on_add_response(Cause::Success);
        assert_eq!(mgr.table().lifecycle(0), EntryLifecycle::Added);
    }

    #[test]
    fn test_transient_request_rejection_stops_scan() {
        let (mut mgr, _) = gated_with_pending(2);
        mgr.controller_mut().activity = DeviceActivity::IDLE;
        mgr.controller_mut().list_causes.push_back(Cause::InvalidState);
        mgr.on_device_activity_changed();

        assert_eq!(mgr.controller().list_calls().len(), 1);
        assert_eq!(mgr.in_flight(), None);
        assert_eq!(mgr.table().lifecycle(0), EntryLifecycle::AddPending { sent: false });
        assert_eq!(mgr.table().lifecycle(1), EntryLifecycle::AddPending { sent: false });
        assert_eq!(mgr.state(), ManagerState::Busy);

        // next trigger retries the same slot
        mgr.on_device_activity_changed();
        assert_eq!(mgr.in_flight(), Some(0));
    }

    #[test]
    fn test_terminal_request_rejection_moves_on() {
        let (mut mgr, _) = gated_with_pending(2);
        mgr.controller_mut().activity = DeviceActivity::IDLE;
        mgr.controller_mut().list_causes.push_back(Cause::Gap(0x0104));
        mgr.on_device_activity_changed();

        assert_eq!(
            mgr.controller().list_calls(),
            vec![(ResolvingListOp::Add, ident(1).addr), (ResolvingListOp::Add, ident(2).addr)]
        );
        assert!(mgr.table().find(&ident(1)).is_none());
        assert_eq!(mgr.in_flight(), Some(1));
        // nothing mirrored for the refused add
        assert_eq!(mgr.whitelist().mirrored(), &[ident(2)]);
    }

    #[test]
    fn test_terminal_remove_rejection_drops_entry() {
        let (mut mgr, _) = started(PrivacyConfig::default(), 2);
        mgr.add_or_update(ident(1), true).unwrap();
        mgr.on_add_response(Cause::Success);

        mgr.controller_mut().list_causes.push_back(Cause::Gap(0x0104));
        mgr.request_remove(&ident(1)).unwrap();
        assert!(mgr.table().is_empty());
        assert_eq!(mgr.state(), ManagerState::Idle);
    }

    #[test]
    fn test_transient_remove_rejection_keeps_entry() {
        let (mut mgr, _) = started(PrivacyConfig::default(), 2);
        mgr.add_or_update(ident(1), true).unwrap();
        mgr.on_add_response(Cause::Success);

        mgr.controller_mut().list_causes.push_back(Cause::InvalidState);
        mgr.request_remove(&ident(1)).unwrap();
        assert_eq!(mgr.table().lifecycle(0), EntryLifecycle::RemovePending);
        assert_eq!(mgr.in_flight(), None);
        assert_eq!(mgr.state(), ManagerState::Busy);
        assert_eq!(mgr.controller().count(|c| matches!(c, Call::Whitelist(WhitelistOp::Remove, ..))), 0);

        mgr.on_device_activity_changed();
        assert_eq!(
            mgr.controller().list_calls(),
            vec![
                (ResolvingListOp::Add, ident(1).addr),
                (ResolvingListOp::Remove, ident(1).addr),
                (ResolvingListOp::Remove, ident(1).addr),
            ]
        );
        assert_eq!(mgr.in_flight(), Some(0));
        assert_eq!(
            mgr.controller().calls.last(),
            Some(&Call::Whitelist(WhitelistOp::Remove, ident(1).addr, RemoteAddrType::Public))
        );
        assert!(mgr.whitelist().mirrored().is_empty());

        mgr.on_remove_response(Cause::Success);
        assert!(mgr.table().is_empty());
        assert_eq!(mgr.state(), ManagerState::Idle);
    }

    #[test]
    fn test_clear_takes_priority() {
        let (mut mgr, _) = gated_with_pending(2);
        mgr.request_clear_all().unwrap();
        mgr.controller_mut().activity = DeviceActivity::IDLE;
        mgr.on_device_activity_changed();

        assert_eq!(mgr.controller().list_calls(), vec![(ResolvingListOp::Clear, BdAddr::ZERO)]);
        assert_eq!(mgr.in_flight(), None);
        assert!(mgr.global_clear_pending());
        // a second trigger while the clear is outstanding is a no-op
        mgr.on_device_activity_changed();
        assert_eq!(mgr.controller().list_calls().len(), 1);
        assert_eq!(mgr.controller().count(|c| matches!(c, Call::Whitelist(WhitelistOp::Clear, ..))), 1);
    }

    #[test]
    fn test_clear_rejections_keep_it_pending() {
        let (mut mgr, _) = started(PrivacyConfig::default(), 2);
        mgr.controller_mut().list_causes.push_back(Cause::InvalidState);
        mgr.controller_mut().list_causes.push_back(Cause::Gap(0x0104));
        mgr.request_clear_all().unwrap();
        mgr.on_device_activity_changed();

        assert_eq!(mgr.controller().list_calls().len(), 2);
        assert!(mgr.global_clear_pending());
        assert_eq!(mgr.state(), ManagerState::Busy);
        assert_eq!(mgr.controller().count(|c| matches!(c, Call::Whitelist(..))), 0);

        mgr.on_device_activity_changed();
        assert_eq!(mgr.controller().list_calls().len(), 3);
        assert_eq!(mgr.controller().count(|c| matches!(c, Call::Whitelist(WhitelistOp::Clear, ..))), 1);
    }

    #[test]
    fn test_single_flight() {
        let (mut mgr, _) = started(PrivacyConfig::default(), 4);
        for i in 1..=3 {
            mgr.add_or_update(ident(i), true).unwrap();
        }
        assert_eq!(mgr.controller().list_calls().len(), 1);
        for expected in 1..=3usize {
            assert_eq!(mgr.controller().list_calls().len(), expected);
            mgr.on_add_response(Cause::Success);
        }
        assert_eq!(mgr.state(), ManagerState::Idle);
        assert!(mgr.table().iter().all(|(_, e)| e.lifecycle == EntryLifecycle::Added));
    }
}

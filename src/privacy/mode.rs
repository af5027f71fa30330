//! Mode Manager.
//!
//! Picks the privacy mode requested for a peer right after its Add is accepted.

use super::entry::PrivacyEntry;
use crate::gap::PrivacyMode;

pub fn compute_mode(entry: &PrivacyEntry) -> PrivacyMode {
    if entry.device_mode {
        PrivacyMode::Device
    } else {
        PrivacyMode::Network
    }
}

/// Mode to request from the controller, if any.
///
/// Network mode is the controller default for a new resolving list entry, so
/// only Device mode needs a command.
pub fn mode_to_request(entry: &PrivacyEntry) -> Option<PrivacyMode> {
    match compute_mode(entry) {
        PrivacyMode::Device => Some(PrivacyMode::Device),
        PrivacyMode::Network => None,
    }
}

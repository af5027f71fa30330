//! Configuration for the privacy manager.
//!
//! Defines the knobs the host stack sets when enabling LE privacy.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Main configuration structure for the privacy manager.
///
/// This struct should be populated by the host stack and passed to
/// [`crate::privacy::PrivacyManager::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrivacyConfig {
    /// Mirror every resolving list change into the controller whitelist.
    pub whitelist_mirror: bool,

    /// Request Device privacy mode for peers that want it once they are added.
    /// When off, the application sets privacy modes itself and receives the
    /// results.
    pub mode_manage: bool,

    /// Keep an all-zero placeholder entry in the resolving list so the local
    /// device can advertise with an RPA before anything is bonded.
    pub rpa_placeholder: bool,

    /// Abandon an outstanding resolving list command after this long without
    /// a response. `None` waits forever.
    pub response_timeout_ms: Option<u64>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            whitelist_mirror: true,
            mode_manage: true,
            rpa_placeholder: true,
            response_timeout_ms: None,
        }
    }
}

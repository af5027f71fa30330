//! Response watchdog.
//!
//! Tracks how long the outstanding resolving list command has been waiting for
//! its completion. Time is fed in by the host as elapsed milliseconds, so no
//! clock source is needed on `no_std` targets.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogError {
    Timeout,
}

impl fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchdogError::Timeout => write!(f, "Watchdog timeout"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WatchdogError {}

pub struct ResponseWatchdog {
    timeout_ms: Option<u64>,
    /// Milliseconds waited since `arm`, `None` while disarmed.
    waited_ms: Option<u64>,
}

impl ResponseWatchdog {
    /// A watchdog with `None` never fires.
    pub fn new(timeout_ms: Option<u64>) -> Self {
        Self {
            timeout_ms,
            waited_ms: None,
        }
    }

    pub fn arm(&mut self) {
        if self.timeout_ms.is_some() {
            self.waited_ms = Some(0);
        }
    }

    pub fn disarm(&mut self) {
        self.waited_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.waited_ms.is_some()
    }

    /// Advances time. Fires once, then stays disarmed until re-armed.
    pub fn advance(&mut self, elapsed_ms: u64) -> Result<(), WatchdogError> {
        let (Some(timeout), Some(waited)) = (self.timeout_ms, self.waited_ms) else {
            return Ok(());
        };
        let waited = waited.saturating_add(elapsed_ms);
        if waited >= timeout {
            self.waited_ms = None;
            return Err(WatchdogError::Timeout);
        }
        self.waited_ms = Some(waited);
        Ok(())
    }
}

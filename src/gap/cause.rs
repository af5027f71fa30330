//! Controller result codes and their retry classification.

use core::fmt;

/// HCI error codes the privacy manager treats specially.
pub const HCI_ERR_UNKNOWN_CONN_ID: u8 = 0x02;
pub const HCI_ERR_MEMORY_FULL: u8 = 0x07;
pub const HCI_ERR_INVALID_PARAM: u8 = 0x12;

/// Result of a controller request or the completion it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    Success,
    /// The GAP layer is mid-operation and refused the request.
    InvalidState,
    UnknownConnId,
    MemoryFull,
    InvalidParam,
    /// Any other HCI error code.
    Hci(u8),
    /// Any other local GAP failure (send failure, no resource, ...).
    Gap(u16),
}

/// Whether a failed operation may succeed if simply issued again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Transient,
    Terminal,
}

impl Cause {
    /// Maps a raw HCI status byte.
    pub fn from_hci(code: u8) -> Self {
        match code {
            0x00 => Cause::Success,
            HCI_ERR_UNKNOWN_CONN_ID => Cause::UnknownConnId,
            HCI_ERR_MEMORY_FULL => Cause::MemoryFull,
            HCI_ERR_INVALID_PARAM => Cause::InvalidParam,
            other => Cause::Hci(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Cause::Success)
    }

    /// Classifies the immediate answer to a request.
    ///
    /// Only a busy GAP layer is worth retrying; any other refusal means the
    /// request can never be accepted as issued.
    pub fn classify_request(&self) -> Option<Severity> {
        match self {
            Cause::Success => None,
            Cause::InvalidState => Some(Severity::Transient),
            _ => Some(Severity::Terminal),
        }
    }

    /// Classifies an asynchronous completion.
    ///
    /// Unknown connection, memory full and invalid parameter are permanent;
    /// everything else is retried.
    pub fn classify_response(&self) -> Option<Severity> {
        match self {
            Cause::Success => None,
            Cause::UnknownConnId | Cause::MemoryFull | Cause::InvalidParam => {
                Some(Severity::Terminal)
            }
            _ => Some(Severity::Transient),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Success => write!(f, "Success"),
            Cause::InvalidState => write!(f, "Invalid state"),
            Cause::UnknownConnId => write!(f, "Unknown connection identifier"),
            Cause::MemoryFull => write!(f, "Memory capacity exceeded"),
            Cause::InvalidParam => write!(f, "Invalid HCI command parameters"),
            Cause::Hci(code) => write!(f, "HCI error 0x{:02x}", code),
            Cause::Gap(code) => write!(f, "GAP error 0x{:04x}", code),
        }
    }
}

//! LE device addresses.
//!
//! Address bytes are kept in controller order (little-endian, `addr[0]` is the
//! least significant byte), but are displayed and parsed most significant
//! byte first, as printed by every HCI tool.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Length of a Bluetooth device address.
pub const BD_ADDR_LEN: usize = 6;

const RANDOM_ADDR_MASK: u8 = 0xC0;
const RANDOM_ADDR_MASK_STATIC: u8 = 0xC0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    InvalidLength,
    InvalidHex,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::InvalidLength => write!(f, "Address must be 6 bytes"),
            AddressError::InvalidHex => write!(f, "Address contains invalid hex digits"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AddressError {}

/// A 48-bit Bluetooth device address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BdAddr(pub [u8; BD_ADDR_LEN]);

impl BdAddr {
    /// The all-zero address used by the RPA placeholder entry.
    pub const ZERO: Self = Self([0u8; BD_ADDR_LEN]);

    pub const fn new(bytes: [u8; BD_ADDR_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BD_ADDR_LEN] {
        &self.0
    }

    /// True for a random address whose two most significant bits are `0b11`.
    pub fn is_static_random(&self) -> bool {
        self.0[BD_ADDR_LEN - 1] & RANDOM_ADDR_MASK == RANDOM_ADDR_MASK_STATIC
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a[5], a[4], a[3], a[2], a[1], a[0]
        )
    }
}

impl fmt::Debug for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BdAddr({})", self)
    }
}

impl FromStr for BdAddr {
    type Err = AddressError;

    /// Accepts `C0:11:22:33:44:55`, `C0-11-22-33-44-55` or `C01122334455`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut digits = [0u8; BD_ADDR_LEN * 2];
        let mut len = 0;
        for c in s.bytes().filter(|c| *c != b':' && *c != b'-') {
            if len == digits.len() {
                return Err(AddressError::InvalidLength);
            }
            digits[len] = c;
            len += 1;
        }
        if len != digits.len() {
            return Err(AddressError::InvalidLength);
        }

        let mut be = [0u8; BD_ADDR_LEN];
        hex::decode_to_slice(digits, &mut be).map_err(|_| AddressError::InvalidHex)?;
        be.reverse();
        Ok(Self(be))
    }
}

/// Identity address type as stored in the resolving list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IdentityAddrType {
    Public,
    Random,
}

/// Over-the-air address type of a remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RemoteAddrType {
    Public,
    Random,
}

impl From<IdentityAddrType> for RemoteAddrType {
    fn from(t: IdentityAddrType) -> Self {
        match t {
            IdentityAddrType::Public => RemoteAddrType::Public,
            IdentityAddrType::Random => RemoteAddrType::Random,
        }
    }
}

impl From<RemoteAddrType> for IdentityAddrType {
    fn from(t: RemoteAddrType) -> Self {
        match t {
            RemoteAddrType::Public => IdentityAddrType::Public,
            RemoteAddrType::Random => IdentityAddrType::Random,
        }
    }
}

/// A peer's long-term identity: the key the privacy table is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdentityAddress {
    pub addr_type: IdentityAddrType,
    pub addr: BdAddr,
}

impl IdentityAddress {
    pub const fn new(addr_type: IdentityAddrType, addr: BdAddr) -> Self {
        Self { addr_type, addr }
    }
}

impl fmt::Display for IdentityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.addr, self.addr_type)
    }
}

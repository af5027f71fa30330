//! GAP Vocabulary.
//!
//! Types shared with the host stack's LE GAP layer:
//! - `address`: device and identity addresses.
//! - `cause`: controller result codes and retry classification.
//! - `controller`: the command port towards the controller.
//! - `bond`: the bond store seam and bond change events.

pub mod address;
pub mod bond;
pub mod cause;
pub mod controller;

pub use address::{AddressError, BdAddr, IdentityAddrType, IdentityAddress, RemoteAddrType};
pub use bond::{BondEvent, BondRecord, BondStore};
pub use cause::{Cause, Severity};
pub use controller::{
    ControllerPort, DeviceActivity, PrivacyMode, ResolvedAddressKind, ResolvingListOp, WhitelistOp,
};

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(not(feature = "std"))]
use core::panic::PanicInfo;

#[cfg(not(feature = "std"))]
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! { loop {} }

pub mod config;
pub mod gap;
pub mod privacy;
pub mod watchdog;

pub use config::PrivacyConfig;
pub use privacy::{PrivacyError, PrivacyEvent, PrivacyEventObserver, PrivacyManager};

#[no_mangle]
pub extern "C" fn le_privacy_version() -> u32 {
    0x000300
}

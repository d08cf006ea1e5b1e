//! `winfo` is a uniform query layer over kernel wireless-interface
//! state. It exposes a fixed set of facts — mode, channel, signal,
//! encryption, associated stations, scan results, supported
//! frequencies, regulatory domain, hardware identity — regardless of
//! which kernel driver API backs a given interface.
//!
//! The nl80211 backend speaks the kernel's generic-netlink wireless
//! protocol directly: command/attribute request-response with
//! multi-message dump reassembly, bounds-checked decoding of nested
//! attribute trees, RSN/WPA information-element parsing, and hardware
//! lookup against a flat calibration table.
//!
//! All I/O is synchronous and blocking; a backend owns its session
//! exclusively, so serialize access (or use one `Dispatcher` per
//! thread) when querying concurrently.
//!
//! ```no_run
//! use winfo::Dispatcher;
//!
//! let mut dispatcher = Dispatcher::new();
//! if let Some(backend) = dispatcher.backend_for("wlan0") {
//!   if let Ok(ssid) = backend.ssid("wlan0") {
//!     println!("wlan0 is on {ssid}");
//!   }
//! }
//! dispatcher.shutdown();
//! ```

mod backend;
mod error;
mod hardware;
mod ie;
mod netlink;
mod types;

pub use backend::{BackendOps, Dispatcher};
pub use error::{Result, WinfoError};
pub use hardware::{hardware_entry, HARDWARE_DB_PATH};
pub use ie::{find_ie, find_ssid, parse_ies};
pub use netlink::{Nl80211, MAX_LIST_ENTRIES};
pub use types::{
  format_mac, AssocEntry, AuthAlgSet, CipherSet, CountryEntry, CryptoInfo,
  FreqEntry, FreqFlagSet, HardwareEntry, HardwareId, HtModeSet, HwModeSet,
  KeyMgmtSet, OperatingMode, RateDetail, RateEntry, ScanEntry, SurveyEntry,
  TxPowerEntry,
};

//! The uniform backend capability set and the dispatcher that binds an
//! interface name to the backend claiming it.
//!
//! Every operation takes `&mut self`: a backend owns its session and
//! its receive state, and the exclusive borrow is what guarantees the
//! one-request-in-flight invariant without any internal locking.
//! Callers wanting concurrency run one dispatcher per thread.

use crate::error::Result;
use crate::netlink::Nl80211;
use crate::types::{
  AssocEntry, CountryEntry, CryptoInfo, FreqEntry, HardwareId, HtModeSet,
  HwModeSet, OperatingMode, ScanEntry, SurveyEntry, TxPowerEntry,
};

/// The fixed capability set every wireless backend implements.
///
/// Scalar and record operations fail with a recoverable error when the
/// fact is not obtainable right now; display layers render that as
/// "unknown" rather than omitting the field.
pub trait BackendOps {
  /// The backend's registry name.
  fn name(&self) -> &'static str;
  /// True when this backend claims the interface. Querying an
  /// unclaimed interface is a caller contract violation; probe first.
  fn probe(&mut self, ifname: &str) -> bool;

  fn mode(&mut self, ifname: &str) -> Result<OperatingMode>;
  /// Current channel number.
  fn channel(&mut self, ifname: &str) -> Result<u32>;
  /// Current frequency in MHz.
  fn frequency(&mut self, ifname: &str) -> Result<u32>;
  /// Calibration frequency correction in kHz, usually zero.
  fn frequency_offset(&mut self, ifname: &str) -> Result<i32>;
  /// Transmit power in dBm, before offset correction.
  fn txpower(&mut self, ifname: &str) -> Result<i32>;
  /// Calibration transmit-power correction in dB, usually zero.
  fn txpower_offset(&mut self, ifname: &str) -> Result<i32>;
  /// Current bitrate in kbit/s.
  fn bitrate(&mut self, ifname: &str) -> Result<u32>;
  /// Link signal in dBm.
  fn signal(&mut self, ifname: &str) -> Result<i32>;
  /// Noise floor in dBm.
  fn noise(&mut self, ifname: &str) -> Result<i32>;
  /// Link quality on the `quality_max` scale.
  fn quality(&mut self, ifname: &str) -> Result<u8>;
  fn quality_max(&mut self, ifname: &str) -> Result<u8>;
  /// Whether the PHY can run multiple BSSes at once.
  fn mbssid_support(&mut self, ifname: &str) -> Result<bool>;
  fn hwmodelist(&mut self, ifname: &str) -> Result<HwModeSet>;
  fn htmodelist(&mut self, ifname: &str) -> Result<HtModeSet>;
  fn ssid(&mut self, ifname: &str) -> Result<String>;
  fn bssid(&mut self, ifname: &str) -> Result<[u8; 6]>;
  /// Regulatory country code (ISO 3166 alpha-2).
  fn country(&mut self, ifname: &str) -> Result<String>;
  fn hardware_id(&mut self, ifname: &str) -> Result<HardwareId>;
  fn hardware_name(&mut self, ifname: &str) -> Result<String>;
  fn encryption(&mut self, ifname: &str) -> Result<CryptoInfo>;
  fn phyname(&mut self, ifname: &str) -> Result<String>;
  fn assoclist(&mut self, ifname: &str) -> Result<Vec<AssocEntry>>;
  fn txpwrlist(&mut self, ifname: &str) -> Result<Vec<TxPowerEntry>>;
  fn scanlist(&mut self, ifname: &str) -> Result<Vec<ScanEntry>>;
  fn freqlist(&mut self, ifname: &str) -> Result<Vec<FreqEntry>>;
  fn countrylist(&mut self, ifname: &str) -> Result<Vec<CountryEntry>>;
  fn survey(&mut self, ifname: &str) -> Result<Vec<SurveyEntry>>;
  /// Resolves a configuration-section name to a phy name.
  fn lookup_phy(&mut self, section: &str) -> Result<String>;
  /// Releases the cached session. Final: the backend will not serve
  /// further queries in this run.
  fn shutdown(&mut self);
}

/// Holds every registered backend and routes interfaces to the first
/// one that claims them.
pub struct Dispatcher {
  backends: Vec<Box<dyn BackendOps>>,
}

impl Dispatcher {
  /// Registers the built-in backends in probe order.
  pub fn new() -> Self {
    Dispatcher { backends: vec![Box::new(Nl80211::new())] }
  }

  /// Name of the backend claiming `ifname`, if any.
  pub fn detect(&mut self, ifname: &str) -> Option<&'static str> {
    let idx = self.backends.iter_mut().position(|b| b.probe(ifname))?;
    Some(self.backends[idx].name())
  }

  /// The operation table of the backend claiming `ifname`.
  pub fn backend_for(&mut self, ifname: &str) -> Option<&mut dyn BackendOps> {
    let idx = self.backends.iter_mut().position(|b| b.probe(ifname))?;
    Some(self.backends[idx].as_mut())
  }

  /// A backend by registry name, claimed interface or not.
  pub fn backend_by_name(&mut self, name: &str) -> Option<&mut dyn BackendOps> {
    let idx = self.backends.iter().position(|b| b.name() == name)?;
    Some(self.backends[idx].as_mut())
  }

  /// Shuts every backend down.
  pub fn shutdown(&mut self) {
    for backend in &mut self.backends {
      backend.shutdown();
    }
  }
}

impl Default for Dispatcher {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_interface_is_unclaimed() {
    let mut dispatcher = Dispatcher::new();
    assert_eq!(dispatcher.detect("nonexistent0"), None);
    assert!(dispatcher.backend_for("nonexistent0").is_none());
  }

  #[test]
  fn backend_lookup_by_name() {
    let mut dispatcher = Dispatcher::new();
    assert!(dispatcher.backend_by_name("nl80211").is_some());
    assert!(dispatcher.backend_by_name("wext").is_none());
  }
}

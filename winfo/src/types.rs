//! The data model shared by every backend: operating modes, cipher and
//! key-management bit sets, and the per-entry records the query
//! operations return. Bit positions are wire-format constants carried
//! over from the original ABI; the accessors are the supported surface.

/// Helper macro to create a bit-set newtype over a primitive, with one
/// named constant per flag and a display name table.
///
/// ## Parameters
/// * `$name`: the newtype to create
/// * `$prim`: backing primitive (`u8`/`u16`/`u32`)
/// * one `(FLAG, bit, "label")` triple per flag
macro_rules! flag_set {
  ($name:ident, $prim:ty, $(($flag:ident, $bit:expr, $label:expr)),* $(,)?) => {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct $name($prim);

    impl $name {
      $(pub const $flag: Self = Self($bit);)*

      /// The empty set.
      pub const fn empty() -> Self {
        Self(0)
      }

      /// Recreates a set from raw bits; unknown bits are kept as-is.
      pub const fn from_bits(bits: $prim) -> Self {
        Self(bits)
      }

      /// The raw wire-format bits.
      pub const fn bits(&self) -> $prim {
        self.0
      }

      pub const fn is_empty(&self) -> bool {
        self.0 == 0
      }

      pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
      }

      pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
      }

      /// Display labels of every flag present, in bit order.
      pub fn names(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        $(
          if self.0 & $bit != 0 {
            out.push($label);
          }
        )*
        out
      }
    }

    impl std::ops::BitOr for $name {
      type Output = Self;
      fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
      }
    }

    impl std::ops::BitOrAssign for $name {
      fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
      }
    }
  };
}

flag_set!(
  CipherSet,
  u8,
  (NONE, 1 << 0, "NONE"),
  (WEP40, 1 << 1, "WEP-40"),
  (TKIP, 1 << 2, "TKIP"),
  (WRAP, 1 << 3, "WRAP"),
  (CCMP, 1 << 4, "CCMP"),
  (WEP104, 1 << 5, "WEP-104"),
  (AESOCB, 1 << 6, "AES-OCB"),
  (CKIP, 1 << 7, "CKIP"),
);

flag_set!(
  KeyMgmtSet,
  u8,
  (NONE, 1 << 0, "NONE"),
  (X8021, 1 << 1, "802.1X"),
  (PSK, 1 << 2, "PSK"),
);

flag_set!(
  AuthAlgSet,
  u8,
  (OPEN, 1 << 0, "Open System"),
  (SHARED, 1 << 1, "Shared Auth"),
);

flag_set!(
  HwModeSet,
  u8,
  (MODE_A, 1 << 0, "a"),
  (MODE_B, 1 << 1, "b"),
  (MODE_G, 1 << 2, "g"),
  (MODE_N, 1 << 3, "n"),
  (MODE_AC, 1 << 4, "ac"),
);

flag_set!(
  HtModeSet,
  u8,
  (HT20, 1 << 0, "HT20"),
  (HT40, 1 << 1, "HT40"),
  (VHT20, 1 << 2, "VHT20"),
  (VHT40, 1 << 3, "VHT40"),
  (VHT80, 1 << 4, "VHT80"),
  (VHT80_80, 1 << 5, "VHT80+80"),
  (VHT160, 1 << 6, "VHT160"),
);

flag_set!(
  FreqFlagSet,
  u32,
  (NO_10MHZ, 1 << 0, "NO_10MHZ"),
  (NO_20MHZ, 1 << 1, "NO_20MHZ"),
  (NO_HT40PLUS, 1 << 2, "NO_HT40+"),
  (NO_HT40MINUS, 1 << 3, "NO_HT40-"),
  (NO_80MHZ, 1 << 4, "NO_80MHZ"),
  (NO_160MHZ, 1 << 5, "NO_160MHZ"),
);

/// Operating mode of an interface or scanned BSS.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
  #[default]
  Unknown,
  Master,
  Adhoc,
  Client,
  Monitor,
  ApVlan,
  Wds,
  MeshPoint,
  P2pClient,
  P2pGo,
}

impl OperatingMode {
  /// Display name, matching the historical report wording.
  pub fn name(&self) -> &'static str {
    match self {
      OperatingMode::Unknown => "Unknown",
      OperatingMode::Master => "Master",
      OperatingMode::Adhoc => "Ad-Hoc",
      OperatingMode::Client => "Client",
      OperatingMode::Monitor => "Monitor",
      OperatingMode::ApVlan => "Master (VLAN)",
      OperatingMode::Wds => "WDS",
      OperatingMode::MeshPoint => "Mesh Point",
      OperatingMode::P2pClient => "P2P Client",
      OperatingMode::P2pGo => "P2P Go",
    }
  }
}

/// Security parameters of a BSS or interface.
///
/// When `enabled` is false the remaining fields are zero and consumers
/// must ignore them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CryptoInfo {
  pub enabled: bool,
  /// WPA generation mask: 1 = WPA, 2 = RSN/WPA2, 3 = both advertised.
  pub wpa_version: u8,
  pub group_ciphers: CipherSet,
  pub pair_ciphers: CipherSet,
  pub auth_suites: KeyMgmtSet,
  /// Only meaningful for WEP (no IE): open and/or shared-key auth.
  pub auth_algs: AuthAlgSet,
}

impl CryptoInfo {
  /// The WEP entry synthesized when a BSS sets the privacy capability
  /// bit but carries no security element.
  pub fn wep() -> Self {
    CryptoInfo {
      enabled: true,
      wpa_version: 0,
      group_ciphers: CipherSet::empty(),
      pair_ciphers: CipherSet::WEP40 | CipherSet::WEP104,
      auth_suites: KeyMgmtSet::empty(),
      auth_algs: AuthAlgSet::OPEN | AuthAlgSet::SHARED,
    }
  }
}

/// HT/VHT detail of a rate report. Exactly one interpretation applies
/// per entry, so the alternatives are an enum rather than flag fields.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RateDetail {
  #[default]
  Legacy,
  Ht {
    mcs: u8,
    width_mhz: u16,
    short_gi: bool,
  },
  Vht {
    mcs: u8,
    nss: u8,
    width_mhz: u16,
    short_gi: bool,
  },
}

/// One bitrate report, as the kernel computed it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RateEntry {
  /// Raw rate in units of 100 kbit/s.
  pub rate: u32,
  pub detail: RateDetail,
}

impl RateEntry {
  /// The rate in kbit/s.
  pub fn kbit(&self) -> u32 {
    self.rate * 100
  }
}

/// One BSS from a scan dump, in kernel reply order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanEntry {
  pub bssid: [u8; 6],
  /// Absent for hidden networks.
  pub ssid: Option<String>,
  pub mode: OperatingMode,
  pub channel: u32,
  pub mhz: u32,
  pub signal_dbm: i32,
  pub quality: u8,
  pub quality_max: u8,
  pub crypto: CryptoInfo,
}

/// One associated station from a station dump.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssocEntry {
  pub mac: [u8; 6],
  pub signal_dbm: i8,
  pub signal_avg_dbm: i8,
  pub noise_dbm: i8,
  pub inactive_ms: u32,
  pub connected_sec: u32,
  pub rx_packets: u32,
  pub tx_packets: u32,
  pub rx_bytes: u64,
  pub tx_bytes: u64,
  pub tx_retries: u32,
  pub tx_failed: u32,
  pub rx_drop_misc: u64,
  pub rx_rate: RateEntry,
  pub tx_rate: RateEntry,
  /// Kernel throughput estimate in kbit/s.
  pub expected_throughput: u32,
  pub t_offset: u64,
  pub authorized: bool,
  pub authenticated: bool,
  pub preamble_short: bool,
  pub wme: bool,
  pub mfp: bool,
  pub tdls: bool,
}

/// Channel-occupancy counters for one surveyed frequency.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurveyEntry {
  pub mhz: u32,
  pub noise_dbm: i8,
  pub in_use: bool,
  pub active_time_ms: u64,
  pub busy_time_ms: u64,
  pub busy_time_ext_ms: u64,
  pub rx_time_ms: u64,
  pub tx_time_ms: u64,
}

/// One supported frequency of a physical device.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FreqEntry {
  pub channel: u32,
  pub mhz: u32,
  /// Transmission restricted (passive scan / no-IR).
  pub restricted: bool,
  pub flags: FreqFlagSet,
}

/// One step of the supported transmit-power list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TxPowerEntry {
  pub dbm: i32,
  pub mw: u32,
}

/// One selectable regulatory domain.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountryEntry {
  /// Packed ISO 3166 letters, see `winfo_utils::countries`.
  pub iso3166: u16,
  pub ccode: String,
}

/// PCI/USB identity of a wireless device.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HardwareId {
  pub vendor_id: u16,
  pub device_id: u16,
  pub subsystem_vendor_id: u16,
  pub subsystem_device_id: u16,
}

/// A calibration-catalog row: display names plus the board-specific
/// power/frequency corrections.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HardwareEntry {
  pub id: HardwareId,
  pub vendor_name: String,
  pub device_name: String,
  pub txpower_offset: i16,
  pub frequency_offset: i16,
}

/// Formats a MAC/BSSID address the way every report prints it.
pub fn format_mac(mac: &[u8; 6]) -> String {
  format!(
    "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
    mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cipher_set_ops() {
    let mut set = CipherSet::empty();
    assert!(set.is_empty());
    set.insert(CipherSet::TKIP);
    set |= CipherSet::CCMP;
    assert!(set.contains(CipherSet::TKIP));
    assert!(set.contains(CipherSet::CCMP));
    assert!(!set.contains(CipherSet::WEP40));
    assert_eq!(set.bits(), (1 << 2) | (1 << 4));
    assert_eq!(set.names(), vec!["TKIP", "CCMP"]);
  }

  #[test]
  fn wire_bit_positions_are_stable() {
    assert_eq!(CipherSet::WEP104.bits(), 1 << 5);
    assert_eq!(KeyMgmtSet::PSK.bits(), 1 << 2);
    assert_eq!(HtModeSet::VHT160.bits(), 1 << 6);
    assert_eq!(FreqFlagSet::NO_HT40MINUS.bits(), 1 << 3);
  }

  #[test]
  fn wep_default_entry() {
    let wep = CryptoInfo::wep();
    assert!(wep.enabled);
    assert_eq!(wep.wpa_version, 0);
    assert!(wep.pair_ciphers.contains(CipherSet::WEP40 | CipherSet::WEP104));
    assert!(wep.auth_algs.contains(AuthAlgSet::OPEN | AuthAlgSet::SHARED));
  }

  #[test]
  fn mac_formatting() {
    assert_eq!(
      format_mac(&[0x00, 0x1c, 0xf0, 0xab, 0x02, 0x9a]),
      "00:1C:F0:AB:02:9A"
    );
  }
}

//! The nl80211 backend: speaks the kernel's generic-netlink wireless
//! protocol and answers every query operation of the backend trait.
//!
//! Ops issue one or more conveyor requests and post-process the decoded
//! attributes into the typed model. The session is created lazily on
//! first use, kept for the life of the backend, and dropped either on
//! explicit shutdown (final) or after a protocol failure (so the next
//! call reconnects).

mod attr;
mod conveyor;
mod rate;
mod session;
mod sysfs;
mod wire;

use crate::backend::BackendOps;
use crate::error::{Result, WinfoError};
use crate::hardware;
use crate::ie;
use crate::types::{
  AssocEntry, CountryEntry, CryptoInfo, FreqEntry, FreqFlagSet, HardwareId,
  HtModeSet, HwModeSet, OperatingMode, ScanEntry, SurveyEntry, TxPowerEntry,
};
use conveyor::Replies;
use log::debug;
use nix::libc::if_nametoindex;
use session::Session;
use std::ffi::CString;
use winfo_utils::channels::mhz_to_channel;
use winfo_utils::countries::{code_chars, COUNTRY_NAMES};
use winfo_utils::power::{dbm_to_mw, mbm_to_dbm};
use wire::*;

/// Upper bound on elements returned by any array-producing operation,
/// guarding against a runaway driver dump.
pub const MAX_LIST_ENTRIES: usize = 512;

/// Link quality scale used when signal levels arrive in dBm.
const QUALITY_MAX_DBM: u8 = 70;
/// Quality scale for drivers reporting unspecified 0..100 units.
const QUALITY_MAX_UNSPEC: u8 = 100;

/// The nl80211 backend with its cached session.
pub struct Nl80211 {
  session: Option<Session>,
  finished: bool,
}

impl Default for Nl80211 {
  fn default() -> Self {
    Self::new()
  }
}

impl Nl80211 {
  /// Creates the backend without touching the kernel; the session is
  /// established on the first query.
  pub fn new() -> Self {
    Nl80211 { session: None, finished: false }
  }

  fn session(&mut self) -> Result<&mut Session> {
    if self.finished {
      return Err(WinfoError::Protocol(
        "session has been shut down".to_string(),
      ));
    }
    if self.session.is_none() {
      self.session = Some(Session::connect()?);
    }
    match self.session.as_mut() {
      Some(session) => Ok(session),
      None => Err(WinfoError::Protocol("no session".to_string())),
    }
  }

  /// One request targeted at an interface.
  fn request(&mut self, cmd: u8, ifindex: u32, dump: bool) -> Result<Replies> {
    self.request_with(cmd, Some(ifindex), dump, |_| {})
  }

  fn request_with(
    &mut self,
    cmd: u8,
    ifindex: Option<u32>,
    dump: bool,
    fill: impl FnOnce(&mut Vec<u8>),
  ) -> Result<Replies> {
    let session = self.session()?;
    let family = session.family_id();
    let result = conveyor::request(session, family, cmd, dump, |m| {
      if let Some(idx) = ifindex {
        attr::put_u32(m, NL80211_ATTR_IFINDEX, idx);
      }
      fill(m);
    });
    if let Err(WinfoError::Protocol(_)) = &result {
      // The socket state is suspect after a protocol failure; drop the
      // session so the next call reconnects.
      self.session = None;
    }
    result
  }

  fn interface_info(&mut self, ifname: &str) -> Result<Vec<u8>> {
    let idx = ifindex(ifname)?;
    let replies = self.request(NL80211_CMD_GET_INTERFACE, idx, false)?;
    replies
      .parts
      .into_iter()
      .next()
      .ok_or(WinfoError::NotSupported)
  }

  fn wiphy_info(&mut self, ifname: &str) -> Result<Vec<u8>> {
    let idx = ifindex(ifname)?;
    let replies = self.request(NL80211_CMD_GET_WIPHY, idx, false)?;
    replies
      .parts
      .into_iter()
      .next()
      .ok_or(WinfoError::NotSupported)
  }

  fn scan_dump(&mut self, ifname: &str) -> Result<Vec<BssInfo>> {
    let idx = ifindex(ifname)?;
    let replies = self.request(NL80211_CMD_GET_SCAN, idx, true)?;
    Ok(bss_from_parts(&replies.parts))
  }

  /// The BSS this interface is currently associated with (or joined,
  /// for IBSS), from the kernel's scan cache.
  fn associated_bss(&mut self, ifname: &str) -> Result<BssInfo> {
    self
      .scan_dump(ifname)?
      .into_iter()
      .find(BssInfo::is_current)
      .ok_or(WinfoError::NotSupported)
  }

  fn station_dump(&mut self, ifname: &str) -> Result<Vec<AssocEntry>> {
    let idx = ifindex(ifname)?;
    let replies = self.request(NL80211_CMD_GET_STATION, idx, true)?;
    Ok(
      replies
        .parts
        .iter()
        .filter_map(|part| parse_station(part))
        .take(MAX_LIST_ENTRIES)
        .collect(),
    )
  }

  fn survey_dump(&mut self, ifname: &str) -> Result<Vec<SurveyEntry>> {
    let idx = ifindex(ifname)?;
    let replies = self.request(NL80211_CMD_GET_SURVEY, idx, true)?;
    Ok(
      replies
        .parts
        .iter()
        .filter_map(|part| parse_survey(part))
        .take(MAX_LIST_ENTRIES)
        .collect(),
    )
  }

  /// Average station signal in dBm; client interfaces have exactly one
  /// station (the AP), so this is the link signal either way.
  fn station_signal(&mut self, ifname: &str) -> Result<i32> {
    let stations = self.station_dump(ifname)?;
    let signals: Vec<i32> =
      stations.iter().map(|s| s.signal_dbm as i32).collect();
    if signals.is_empty() {
      return Err(WinfoError::NotSupported);
    }
    Ok(signals.iter().sum::<i32>() / signals.len() as i32)
  }
}

impl BackendOps for Nl80211 {
  fn name(&self) -> &'static str {
    "nl80211"
  }

  fn probe(&mut self, ifname: &str) -> bool {
    ifindex(ifname).is_ok() && sysfs::is_nl80211(ifname)
  }

  fn mode(&mut self, ifname: &str) -> Result<OperatingMode> {
    let info = self.interface_info(ifname)?;
    let iftype = attr::find(&info, NL80211_ATTR_IFTYPE)
      .ok_or(WinfoError::NotSupported)?
      .get_u32()?;
    Ok(mode_from_iftype(iftype))
  }

  fn channel(&mut self, ifname: &str) -> Result<u32> {
    let mhz = self.frequency(ifname)?;
    match mhz_to_channel(mhz) {
      0 => Err(WinfoError::NotSupported),
      channel => Ok(channel),
    }
  }

  fn frequency(&mut self, ifname: &str) -> Result<u32> {
    if let Ok(info) = self.interface_info(ifname) {
      if let Some(freq) = attr::find(&info, NL80211_ATTR_WIPHY_FREQ) {
        return Ok(freq.get_u32()?);
      }
    }
    // Older kernels omit the frequency from interface replies; the
    // associated BSS in the scan cache still carries it.
    Ok(self.associated_bss(ifname)?.mhz)
  }

  fn frequency_offset(&mut self, ifname: &str) -> Result<i32> {
    let id = sysfs::hardware_id(ifname)?;
    Ok(hardware::hardware_entry(&id).frequency_offset as i32)
  }

  fn txpower(&mut self, ifname: &str) -> Result<i32> {
    let info = self.wiphy_info(ifname)?;
    let mbm = attr::find(&info, NL80211_ATTR_WIPHY_TX_POWER_LEVEL)
      .ok_or(WinfoError::NotSupported)?
      .get_u32()?;
    Ok(mbm_to_dbm(mbm as i32))
  }

  fn txpower_offset(&mut self, ifname: &str) -> Result<i32> {
    let id = sysfs::hardware_id(ifname)?;
    Ok(hardware::hardware_entry(&id).txpower_offset as i32)
  }

  fn bitrate(&mut self, ifname: &str) -> Result<u32> {
    let stations = self.station_dump(ifname)?;
    let rates: Vec<u32> =
      stations.iter().map(|s| s.tx_rate.kbit()).filter(|r| *r > 0).collect();
    if rates.is_empty() {
      return Err(WinfoError::NotSupported);
    }
    Ok(rates.iter().sum::<u32>() / rates.len() as u32)
  }

  fn signal(&mut self, ifname: &str) -> Result<i32> {
    self.station_signal(ifname)
  }

  fn noise(&mut self, ifname: &str) -> Result<i32> {
    let survey = self.survey_dump(ifname)?;
    let entry = survey
      .iter()
      .find(|s| s.in_use)
      .or_else(|| survey.iter().find(|s| s.noise_dbm != 0))
      .ok_or(WinfoError::NotSupported)?;
    Ok(entry.noise_dbm as i32)
  }

  fn quality(&mut self, ifname: &str) -> Result<u8> {
    let signal = self.station_signal(ifname)?;
    Ok(quality_from_signal(signal))
  }

  fn quality_max(&mut self, _ifname: &str) -> Result<u8> {
    Ok(QUALITY_MAX_DBM)
  }

  fn mbssid_support(&mut self, ifname: &str) -> Result<bool> {
    let info = self.wiphy_info(ifname)?;
    let iftypes = attr::find(&info, NL80211_ATTR_SUPPORTED_IFTYPES)
      .ok_or(WinfoError::NotSupported)?;
    Ok(iftypes.nested().any(|a| a.id() as u32 == NL80211_IFTYPE_AP))
  }

  fn hwmodelist(&mut self, ifname: &str) -> Result<HwModeSet> {
    let info = self.wiphy_info(ifname)?;
    let bands = attr::find(&info, NL80211_ATTR_WIPHY_BANDS)
      .ok_or(WinfoError::NotSupported)?;
    Ok(hwmodes_from_bands(bands))
  }

  fn htmodelist(&mut self, ifname: &str) -> Result<HtModeSet> {
    let info = self.wiphy_info(ifname)?;
    let bands = attr::find(&info, NL80211_ATTR_WIPHY_BANDS)
      .ok_or(WinfoError::NotSupported)?;
    Ok(htmodes_from_bands(bands))
  }

  fn ssid(&mut self, ifname: &str) -> Result<String> {
    if let Ok(info) = self.interface_info(ifname) {
      if let Some(ssid) = attr::find(&info, NL80211_ATTR_SSID) {
        if !ssid.payload().is_empty() {
          return Ok(String::from_utf8_lossy(ssid.payload()).into_owned());
        }
      }
    }
    let bss = self.associated_bss(ifname)?;
    ie::find_ssid(&bss.ies)
      .map(|s| String::from_utf8_lossy(s).into_owned())
      .ok_or(WinfoError::NotSupported)
  }

  fn bssid(&mut self, ifname: &str) -> Result<[u8; 6]> {
    Ok(self.associated_bss(ifname)?.bssid)
  }

  fn country(&mut self, ifname: &str) -> Result<String> {
    let _ = ifindex(ifname)?; // regulatory domain is global, but the
                              // interface must exist for the query
    let replies = self.request_with(NL80211_CMD_GET_REG, None, false, |_| {})?;
    let first = replies.parts.first().ok_or(WinfoError::NotSupported)?;
    let alpha2 = attr::find(first, NL80211_ATTR_REG_ALPHA2)
      .ok_or(WinfoError::NotSupported)?
      .get_str()?;
    Ok(alpha2.to_string())
  }

  fn hardware_id(&mut self, ifname: &str) -> Result<HardwareId> {
    sysfs::hardware_id(ifname)
  }

  fn hardware_name(&mut self, ifname: &str) -> Result<String> {
    let id = sysfs::hardware_id(ifname)?;
    let entry = hardware::hardware_entry(&id);
    Ok(format!("{} {}", entry.vendor_name, entry.device_name))
  }

  fn encryption(&mut self, ifname: &str) -> Result<CryptoInfo> {
    let bss = self.associated_bss(ifname)?;
    Ok(ie::parse_ies(&bss.ies, bss.privacy()))
  }

  fn phyname(&mut self, ifname: &str) -> Result<String> {
    sysfs::phy_name(ifname)
  }

  fn assoclist(&mut self, ifname: &str) -> Result<Vec<AssocEntry>> {
    let mut stations = self.station_dump(ifname)?;
    // Stations report no noise floor of their own; annotate from the
    // channel survey where one exists.
    if let Ok(noise) = self.noise(ifname) {
      for station in &mut stations {
        station.noise_dbm = noise as i8;
      }
    }
    Ok(stations)
  }

  fn txpwrlist(&mut self, ifname: &str) -> Result<Vec<TxPowerEntry>> {
    let current_mhz = self.frequency(ifname).unwrap_or(0);
    let info = self.wiphy_info(ifname)?;
    let bands = attr::find(&info, NL80211_ATTR_WIPHY_BANDS)
      .ok_or(WinfoError::NotSupported)?;
    let dbm_max = max_txpower_dbm(bands, current_mhz)
      .ok_or(WinfoError::NotSupported)?;

    let mut list = Vec::new();
    let mut dbm = 0;
    while dbm < dbm_max {
      list.push(TxPowerEntry { dbm, mw: dbm_to_mw(dbm) });
      dbm += 2;
    }
    list.push(TxPowerEntry { dbm: dbm_max, mw: dbm_to_mw(dbm_max) });
    Ok(list)
  }

  fn scanlist(&mut self, ifname: &str) -> Result<Vec<ScanEntry>> {
    Ok(
      self
        .scan_dump(ifname)?
        .into_iter()
        .map(to_scan_entry)
        .take(MAX_LIST_ENTRIES)
        .collect(),
    )
  }

  fn freqlist(&mut self, ifname: &str) -> Result<Vec<FreqEntry>> {
    let info = self.wiphy_info(ifname)?;
    let bands = attr::find(&info, NL80211_ATTR_WIPHY_BANDS)
      .ok_or(WinfoError::NotSupported)?;
    Ok(freqlist_from_bands(bands))
  }

  fn countrylist(&mut self, _ifname: &str) -> Result<Vec<CountryEntry>> {
    Ok(
      COUNTRY_NAMES
        .iter()
        .map(|(iso3166, _)| {
          let (a, b) = code_chars(*iso3166);
          CountryEntry { iso3166: *iso3166, ccode: format!("{a}{b}") }
        })
        .collect(),
    )
  }

  fn survey(&mut self, ifname: &str) -> Result<Vec<SurveyEntry>> {
    self.survey_dump(ifname)
  }

  fn lookup_phy(&mut self, section: &str) -> Result<String> {
    sysfs::lookup_phy(section)
  }

  fn shutdown(&mut self) {
    debug!("shutting down the nl80211 session");
    self.session = None;
    self.finished = true;
  }
}

/// Resolves an interface name to its kernel index.
fn ifindex(ifname: &str) -> Result<u32> {
  let Ok(name) = CString::new(ifname) else {
    return Err(WinfoError::NotFound(ifname.to_string()));
  };
  let index = unsafe { if_nametoindex(name.as_ptr()) };
  if index == 0 {
    Err(WinfoError::NotFound(ifname.to_string()))
  } else {
    Ok(index)
  }
}

fn mode_from_iftype(iftype: u32) -> OperatingMode {
  match iftype {
    NL80211_IFTYPE_ADHOC => OperatingMode::Adhoc,
    NL80211_IFTYPE_STATION => OperatingMode::Client,
    NL80211_IFTYPE_AP => OperatingMode::Master,
    NL80211_IFTYPE_AP_VLAN => OperatingMode::ApVlan,
    NL80211_IFTYPE_WDS => OperatingMode::Wds,
    NL80211_IFTYPE_MONITOR => OperatingMode::Monitor,
    NL80211_IFTYPE_MESH_POINT => OperatingMode::MeshPoint,
    NL80211_IFTYPE_P2P_CLIENT => OperatingMode::P2pClient,
    NL80211_IFTYPE_P2P_GO => OperatingMode::P2pGo,
    _ => OperatingMode::Unknown,
  }
}

/// Maps a dBm signal level onto the historical 0..70 quality scale.
fn quality_from_signal(signal_dbm: i32) -> u8 {
  if signal_dbm >= 0 {
    // Already an unspecified-unit quality value.
    return signal_dbm.min(QUALITY_MAX_UNSPEC as i32) as u8;
  }
  (signal_dbm.clamp(-110, -40) + 110) as u8
}

/// Everything this backend reads out of one scan-cache BSS record.
#[derive(Debug, Default, Clone)]
struct BssInfo {
  bssid: [u8; 6],
  mhz: u32,
  capability: u16,
  signal_mbm: Option<i32>,
  signal_unspec: Option<u8>,
  status: Option<u32>,
  ies: Vec<u8>,
}

impl BssInfo {
  fn parse(bss: attr::Attr) -> Option<BssInfo> {
    let mut info = BssInfo::default();
    let mut have_bssid = false;
    for a in bss.nested() {
      match a.id() {
        NL80211_BSS_BSSID => {
          if let Ok(mac) = a.payload().try_into() {
            info.bssid = mac;
            have_bssid = true;
          }
        }
        NL80211_BSS_FREQUENCY => info.mhz = a.get_u32().unwrap_or(0),
        NL80211_BSS_CAPABILITY => info.capability = a.get_u16().unwrap_or(0),
        NL80211_BSS_SIGNAL_MBM => info.signal_mbm = a.get_i32().ok(),
        NL80211_BSS_SIGNAL_UNSPEC => info.signal_unspec = a.get_u8().ok(),
        NL80211_BSS_STATUS => info.status = a.get_u32().ok(),
        NL80211_BSS_INFORMATION_ELEMENTS => info.ies = a.payload().to_vec(),
        _ => {}
      }
    }
    // A record without a BSSID is useless to every consumer.
    have_bssid.then_some(info)
  }

  fn privacy(&self) -> bool {
    self.capability & IEEE80211_CAP_PRIVACY != 0
  }

  fn is_current(&self) -> bool {
    matches!(
      self.status,
      Some(NL80211_BSS_STATUS_ASSOCIATED) | Some(NL80211_BSS_STATUS_IBSS_JOINED)
    )
  }
}

/// Collects every BSS record out of accumulated scan-dump parts,
/// preserving arrival order.
fn bss_from_parts(parts: &[Vec<u8>]) -> Vec<BssInfo> {
  parts
    .iter()
    .filter_map(|part| attr::find(part, NL80211_ATTR_BSS))
    .filter_map(BssInfo::parse)
    .collect()
}

fn to_scan_entry(bss: BssInfo) -> ScanEntry {
  let (signal_dbm, quality, quality_max) = match (bss.signal_mbm, bss.signal_unspec)
  {
    (Some(mbm), _) => {
      let dbm = mbm / 100;
      (dbm, quality_from_signal(dbm), QUALITY_MAX_DBM)
    }
    (None, Some(unspec)) => {
      (0, unspec.min(QUALITY_MAX_UNSPEC), QUALITY_MAX_UNSPEC)
    }
    (None, None) => (0, 0, QUALITY_MAX_DBM),
  };

  let mode = if bss.capability & IEEE80211_CAP_IBSS != 0 {
    OperatingMode::Adhoc
  } else if bss.capability & IEEE80211_CAP_ESS != 0 {
    OperatingMode::Master
  } else {
    OperatingMode::Unknown
  };

  let crypto = ie::parse_ies(&bss.ies, bss.privacy());
  let ssid = ie::find_ssid(&bss.ies)
    .map(|s| String::from_utf8_lossy(s).into_owned());

  ScanEntry {
    bssid: bss.bssid,
    ssid,
    mode,
    channel: mhz_to_channel(bss.mhz),
    mhz: bss.mhz,
    signal_dbm,
    quality,
    quality_max,
    crypto,
  }
}

fn parse_station(part: &[u8]) -> Option<AssocEntry> {
  let mac: [u8; 6] = attr::find(part, NL80211_ATTR_MAC)?
    .payload()
    .try_into()
    .ok()?;
  let sta = attr::find(part, NL80211_ATTR_STA_INFO)?;

  let mut entry = AssocEntry { mac, ..AssocEntry::default() };
  for a in sta.nested() {
    match a.id() {
      NL80211_STA_INFO_INACTIVE_TIME => {
        entry.inactive_ms = a.get_u32().unwrap_or(0)
      }
      NL80211_STA_INFO_CONNECTED_TIME => {
        entry.connected_sec = a.get_u32().unwrap_or(0)
      }
      NL80211_STA_INFO_SIGNAL => entry.signal_dbm = a.get_i8().unwrap_or(0),
      NL80211_STA_INFO_SIGNAL_AVG => {
        entry.signal_avg_dbm = a.get_i8().unwrap_or(0)
      }
      NL80211_STA_INFO_RX_PACKETS => {
        entry.rx_packets = a.get_u32().unwrap_or(0)
      }
      NL80211_STA_INFO_TX_PACKETS => {
        entry.tx_packets = a.get_u32().unwrap_or(0)
      }
      NL80211_STA_INFO_RX_BYTES => {
        if entry.rx_bytes == 0 {
          entry.rx_bytes = a.get_u32().unwrap_or(0) as u64;
        }
      }
      NL80211_STA_INFO_TX_BYTES => {
        if entry.tx_bytes == 0 {
          entry.tx_bytes = a.get_u32().unwrap_or(0) as u64;
        }
      }
      NL80211_STA_INFO_RX_BYTES64 => {
        entry.rx_bytes = a.get_u64().unwrap_or(0)
      }
      NL80211_STA_INFO_TX_BYTES64 => {
        entry.tx_bytes = a.get_u64().unwrap_or(0)
      }
      NL80211_STA_INFO_TX_RETRIES => {
        entry.tx_retries = a.get_u32().unwrap_or(0)
      }
      NL80211_STA_INFO_TX_FAILED => {
        entry.tx_failed = a.get_u32().unwrap_or(0)
      }
      NL80211_STA_INFO_RX_DROP_MISC => {
        entry.rx_drop_misc = a.get_u64().unwrap_or(0)
      }
      NL80211_STA_INFO_T_OFFSET => entry.t_offset = a.get_u64().unwrap_or(0),
      NL80211_STA_INFO_EXPECTED_THROUGHPUT => {
        entry.expected_throughput = a.get_u32().unwrap_or(0)
      }
      NL80211_STA_INFO_RX_BITRATE => entry.rx_rate = rate::decode_rate(a),
      NL80211_STA_INFO_TX_BITRATE => entry.tx_rate = rate::decode_rate(a),
      NL80211_STA_INFO_STA_FLAGS => {
        // struct nl80211_sta_flag_update { u32 mask; u32 set; }
        let payload = a.payload();
        if payload.len() == 8 {
          let mask = u32::from_ne_bytes([
            payload[0], payload[1], payload[2], payload[3],
          ]);
          let set = u32::from_ne_bytes([
            payload[4], payload[5], payload[6], payload[7],
          ]);
          let on = |bit: u32| mask & bit != 0 && set & bit != 0;
          entry.authorized = on(NL80211_STA_FLAG_AUTHORIZED);
          entry.authenticated = on(NL80211_STA_FLAG_AUTHENTICATED);
          entry.preamble_short = on(NL80211_STA_FLAG_SHORT_PREAMBLE);
          entry.wme = on(NL80211_STA_FLAG_WME);
          entry.mfp = on(NL80211_STA_FLAG_MFP);
          entry.tdls = on(NL80211_STA_FLAG_TDLS_PEER);
        }
      }
      _ => {}
    }
  }
  Some(entry)
}

fn parse_survey(part: &[u8]) -> Option<SurveyEntry> {
  let survey = attr::find(part, NL80211_ATTR_SURVEY_INFO)?;
  let mut entry = SurveyEntry::default();
  let mut have_freq = false;
  for a in survey.nested() {
    match a.id() {
      NL80211_SURVEY_INFO_FREQUENCY => {
        entry.mhz = a.get_u32().unwrap_or(0);
        have_freq = entry.mhz != 0;
      }
      NL80211_SURVEY_INFO_NOISE => entry.noise_dbm = a.get_i8().unwrap_or(0),
      NL80211_SURVEY_INFO_IN_USE => entry.in_use = true,
      NL80211_SURVEY_INFO_TIME => {
        entry.active_time_ms = a.get_u64().unwrap_or(0)
      }
      NL80211_SURVEY_INFO_TIME_BUSY => {
        entry.busy_time_ms = a.get_u64().unwrap_or(0)
      }
      NL80211_SURVEY_INFO_TIME_EXT_BUSY => {
        entry.busy_time_ext_ms = a.get_u64().unwrap_or(0)
      }
      NL80211_SURVEY_INFO_TIME_RX => {
        entry.rx_time_ms = a.get_u64().unwrap_or(0)
      }
      NL80211_SURVEY_INFO_TIME_TX => {
        entry.tx_time_ms = a.get_u64().unwrap_or(0)
      }
      _ => {}
    }
  }
  have_freq.then_some(entry)
}

fn hwmodes_from_bands(bands: attr::Attr) -> HwModeSet {
  let mut modes = HwModeSet::empty();
  for band in bands.nested() {
    let mut has_ht = false;
    let mut has_vht = false;
    let mut low_band = false;
    let mut high_band = false;
    for a in band.nested() {
      match a.id() {
        NL80211_BAND_ATTR_HT_CAPA => has_ht = true,
        NL80211_BAND_ATTR_VHT_CAPA => has_vht = true,
        NL80211_BAND_ATTR_FREQS => {
          for freq in a.nested() {
            let Some(mhz) =
              attr::find(freq.payload(), NL80211_FREQUENCY_ATTR_FREQ)
                .and_then(|f| f.get_u32().ok())
            else {
              continue;
            };
            if mhz < 2485 {
              low_band = true;
            } else if mhz >= 4900 {
              high_band = true;
            }
          }
        }
        _ => {}
      }
    }
    if low_band {
      modes |= HwModeSet::MODE_B | HwModeSet::MODE_G;
    }
    if high_band {
      modes |= HwModeSet::MODE_A;
    }
    if has_ht {
      modes |= HwModeSet::MODE_N;
    }
    if has_vht {
      modes |= HwModeSet::MODE_AC;
    }
  }
  modes
}

fn htmodes_from_bands(bands: attr::Attr) -> HtModeSet {
  let mut modes = HtModeSet::empty();
  for band in bands.nested() {
    for a in band.nested() {
      match a.id() {
        NL80211_BAND_ATTR_HT_CAPA => {
          if let Ok(capa) = a.get_u16() {
            modes |= HtModeSet::HT20;
            if capa & IEEE80211_HT_CAP_SUP_WIDTH_20_40 != 0 {
              modes |= HtModeSet::HT40;
            }
          }
        }
        NL80211_BAND_ATTR_VHT_CAPA => {
          if let Ok(capa) = a.get_u32() {
            modes |= HtModeSet::VHT20 | HtModeSet::VHT40 | HtModeSet::VHT80;
            let width = (capa >> IEEE80211_VHT_CAP_CHAN_WIDTH_SHIFT)
              & IEEE80211_VHT_CAP_CHAN_WIDTH_MASK;
            if width == 1 {
              modes |= HtModeSet::VHT160;
            } else if width == 2 {
              modes |= HtModeSet::VHT160 | HtModeSet::VHT80_80;
            }
          }
        }
        _ => {}
      }
    }
  }
  modes
}

fn freqlist_from_bands(bands: attr::Attr) -> Vec<FreqEntry> {
  let mut list = Vec::new();
  for band in bands.nested() {
    for a in band.nested() {
      if a.id() != NL80211_BAND_ATTR_FREQS {
        continue;
      }
      for freq in a.nested() {
        if list.len() >= MAX_LIST_ENTRIES {
          return list;
        }
        let mut entry = FreqEntry::default();
        let mut disabled = false;
        for f in freq.nested() {
          match f.id() {
            NL80211_FREQUENCY_ATTR_FREQ => {
              entry.mhz = f.get_u32().unwrap_or(0)
            }
            NL80211_FREQUENCY_ATTR_DISABLED => disabled = true,
            NL80211_FREQUENCY_ATTR_NO_IR => entry.restricted = true,
            NL80211_FREQUENCY_ATTR_NO_10MHZ => {
              entry.flags |= FreqFlagSet::NO_10MHZ
            }
            NL80211_FREQUENCY_ATTR_NO_20MHZ => {
              entry.flags |= FreqFlagSet::NO_20MHZ
            }
            NL80211_FREQUENCY_ATTR_NO_HT40_PLUS => {
              entry.flags |= FreqFlagSet::NO_HT40PLUS
            }
            NL80211_FREQUENCY_ATTR_NO_HT40_MINUS => {
              entry.flags |= FreqFlagSet::NO_HT40MINUS
            }
            NL80211_FREQUENCY_ATTR_NO_80MHZ => {
              entry.flags |= FreqFlagSet::NO_80MHZ
            }
            NL80211_FREQUENCY_ATTR_NO_160MHZ => {
              entry.flags |= FreqFlagSet::NO_160MHZ
            }
            _ => {}
          }
        }
        if disabled || entry.mhz == 0 {
          continue;
        }
        entry.channel = mhz_to_channel(entry.mhz);
        list.push(entry);
      }
    }
  }
  list
}

/// Finds the regulatory maximum transmit power (dBm) of the current
/// channel, falling back to the loudest channel when the interface has
/// no current frequency.
fn max_txpower_dbm(bands: attr::Attr, current_mhz: u32) -> Option<i32> {
  let mut current = None;
  let mut loudest = None;
  for band in bands.nested() {
    for a in band.nested() {
      if a.id() != NL80211_BAND_ATTR_FREQS {
        continue;
      }
      for freq in a.nested() {
        let mhz = attr::find(freq.payload(), NL80211_FREQUENCY_ATTR_FREQ)
          .and_then(|f| f.get_u32().ok());
        let mbm = attr::find(freq.payload(), NL80211_FREQUENCY_ATTR_MAX_TX_POWER)
          .and_then(|f| f.get_u32().ok());
        let Some(mbm) = mbm else { continue };
        let dbm = mbm_to_dbm(mbm as i32);
        if mhz == Some(current_mhz) && current_mhz != 0 {
          current = Some(dbm);
        }
        if loudest.map(|best| dbm > best).unwrap_or(true) {
          loudest = Some(dbm);
        }
      }
    }
  }
  current.or(loudest)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{CipherSet, KeyMgmtSet, RateDetail};
  use attr::{
    put_bytes, put_flag, put_nested, put_u16, put_u32, put_u64, put_u8,
  };

  const BSSID_A: [u8; 6] = [0x02, 0x11, 0x22, 0x33, 0x44, 0x01];
  const BSSID_B: [u8; 6] = [0x02, 0x11, 0x22, 0x33, 0x44, 0x02];
  const BSSID_C: [u8; 6] = [0x02, 0x11, 0x22, 0x33, 0x44, 0x03];

  fn rsn_ccmp_psk_ie() -> Vec<u8> {
    let mut body = vec![0x01, 0x00];
    body.extend([0x00, 0x0f, 0xac, 0x04]); // group CCMP
    body.extend([0x01, 0x00, 0x00, 0x0f, 0xac, 0x04]); // pairwise CCMP
    body.extend([0x01, 0x00, 0x00, 0x0f, 0xac, 0x02]); // AKM PSK
    let mut ie = vec![48, body.len() as u8];
    ie.extend(body);
    ie
  }

  fn bss_part(
    bssid: [u8; 6],
    mhz: u32,
    capability: u16,
    mbm: i32,
    ssid: &[u8],
    extra_ies: &[u8],
  ) -> Vec<u8> {
    let mut part = Vec::new();
    put_u32(&mut part, NL80211_ATTR_IFINDEX, 4);
    put_nested(&mut part, NL80211_ATTR_BSS, |bss| {
      put_bytes(bss, NL80211_BSS_BSSID, &bssid);
      put_u32(bss, NL80211_BSS_FREQUENCY, mhz);
      put_u16(bss, NL80211_BSS_CAPABILITY, capability);
      put_u32(bss, NL80211_BSS_SIGNAL_MBM, mbm as u32);
      let mut ies = Vec::new();
      if !ssid.is_empty() {
        ies.push(0);
        ies.push(ssid.len() as u8);
        ies.extend_from_slice(ssid);
      }
      ies.extend_from_slice(extra_ies);
      put_bytes(bss, NL80211_BSS_INFORMATION_ELEMENTS, &ies);
    });
    part
  }

  #[test]
  fn three_part_scan_dump_yields_all_entries_in_order() {
    let parts = vec![
      bss_part(BSSID_A, 2437, IEEE80211_CAP_ESS, -4200, b"alpha", &[]),
      bss_part(
        BSSID_B,
        5180,
        IEEE80211_CAP_ESS | IEEE80211_CAP_PRIVACY,
        -5500,
        b"bravo",
        &rsn_ccmp_psk_ie(),
      ),
      bss_part(BSSID_C, 2462, IEEE80211_CAP_IBSS, -8000, b"", &[]),
    ];
    let entries: Vec<ScanEntry> =
      bss_from_parts(&parts).into_iter().map(to_scan_entry).collect();
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].bssid, BSSID_A);
    assert_eq!(entries[0].ssid.as_deref(), Some("alpha"));
    assert_eq!(entries[0].channel, 6);
    assert_eq!(entries[0].signal_dbm, -42);
    assert_eq!(entries[0].quality, 68);
    assert_eq!(entries[0].quality_max, 70);
    assert!(!entries[0].crypto.enabled);
    assert_eq!(entries[0].mode, OperatingMode::Master);

    assert_eq!(entries[1].channel, 36);
    assert!(entries[1].crypto.enabled);
    assert_eq!(entries[1].crypto.wpa_version, 2);
    assert_eq!(entries[1].crypto.pair_ciphers, CipherSet::CCMP);
    assert_eq!(entries[1].crypto.auth_suites, KeyMgmtSet::PSK);

    // hidden SSID, ad-hoc network
    assert_eq!(entries[2].ssid, None);
    assert_eq!(entries[2].mode, OperatingMode::Adhoc);
    assert_eq!(entries[2].quality, 30);
  }

  #[test]
  fn scan_entry_count_matches_bss_count() {
    let with_bss =
      bss_part(BSSID_A, 2412, IEEE80211_CAP_ESS, -3000, b"x", &[]);
    let mut without_bss = Vec::new();
    put_u32(&mut without_bss, NL80211_ATTR_IFINDEX, 4);
    let parts = vec![with_bss.clone(), without_bss, with_bss];
    assert_eq!(bss_from_parts(&parts).len(), 2);
  }

  #[test]
  fn privacy_without_ie_synthesizes_wep() {
    let parts = vec![bss_part(
      BSSID_A,
      2412,
      IEEE80211_CAP_ESS | IEEE80211_CAP_PRIVACY,
      -4000,
      b"legacy",
      &[],
    )];
    let entry =
      bss_from_parts(&parts).into_iter().map(to_scan_entry).next().unwrap();
    assert!(entry.crypto.enabled);
    assert_eq!(entry.crypto.wpa_version, 0);
    assert!(entry
      .crypto
      .pair_ciphers
      .contains(CipherSet::WEP40 | CipherSet::WEP104));
  }

  fn station_part(mac: [u8; 6], signal: i8, tx_rate_units: u32) -> Vec<u8> {
    let mut part = Vec::new();
    put_u32(&mut part, NL80211_ATTR_IFINDEX, 4);
    put_bytes(&mut part, NL80211_ATTR_MAC, &mac);
    put_nested(&mut part, NL80211_ATTR_STA_INFO, |sta| {
      put_u32(sta, NL80211_STA_INFO_INACTIVE_TIME, 120);
      put_u32(sta, NL80211_STA_INFO_CONNECTED_TIME, 3600);
      put_u8(sta, NL80211_STA_INFO_SIGNAL, signal as u8);
      put_u8(sta, NL80211_STA_INFO_SIGNAL_AVG, (signal - 1) as u8);
      put_u32(sta, NL80211_STA_INFO_RX_PACKETS, 1000);
      put_u32(sta, NL80211_STA_INFO_TX_PACKETS, 900);
      put_u32(sta, NL80211_STA_INFO_RX_BYTES, 11);
      put_u64(sta, NL80211_STA_INFO_RX_BYTES64, 5_000_000_000);
      put_u32(sta, NL80211_STA_INFO_TX_BYTES, 22);
      put_u32(sta, NL80211_STA_INFO_EXPECTED_THROUGHPUT, 48000);
      put_nested(sta, NL80211_STA_INFO_TX_BITRATE, |r| {
        put_u32(r, NL80211_RATE_INFO_BITRATE32, tx_rate_units);
        put_u8(r, NL80211_RATE_INFO_MCS, 7);
        put_flag(r, NL80211_RATE_INFO_40_MHZ_WIDTH);
      });
      let mut flags = Vec::new();
      let bits = NL80211_STA_FLAG_AUTHORIZED | NL80211_STA_FLAG_AUTHENTICATED;
      flags.extend(bits.to_ne_bytes());
      flags.extend(bits.to_ne_bytes());
      put_bytes(sta, NL80211_STA_INFO_STA_FLAGS, &flags);
    });
    part
  }

  #[test]
  fn station_parse() {
    let part = station_part(BSSID_A, -55, 1350);
    let entry = parse_station(&part).unwrap();
    assert_eq!(entry.mac, BSSID_A);
    assert_eq!(entry.signal_dbm, -55);
    assert_eq!(entry.signal_avg_dbm, -56);
    assert_eq!(entry.inactive_ms, 120);
    assert_eq!(entry.connected_sec, 3600);
    // the 64-bit counter wins over the legacy 32-bit one
    assert_eq!(entry.rx_bytes, 5_000_000_000);
    assert_eq!(entry.tx_bytes, 22);
    assert_eq!(entry.expected_throughput, 48000);
    assert_eq!(entry.tx_rate.rate, 1350);
    assert!(matches!(
      entry.tx_rate.detail,
      RateDetail::Ht { mcs: 7, width_mhz: 40, .. }
    ));
    assert_eq!(entry.rx_rate.detail, RateDetail::Legacy);
    assert!(entry.authorized);
    assert!(entry.authenticated);
    assert!(!entry.wme);
    assert!(!entry.tdls);
  }

  #[test]
  fn station_without_sta_info_is_skipped() {
    let mut part = Vec::new();
    put_bytes(&mut part, NL80211_ATTR_MAC, &BSSID_A);
    assert!(parse_station(&part).is_none());
  }

  fn survey_part(mhz: u32, noise: i8, in_use: bool) -> Vec<u8> {
    let mut part = Vec::new();
    put_u32(&mut part, NL80211_ATTR_IFINDEX, 4);
    put_nested(&mut part, NL80211_ATTR_SURVEY_INFO, |s| {
      put_u32(s, NL80211_SURVEY_INFO_FREQUENCY, mhz);
      put_u8(s, NL80211_SURVEY_INFO_NOISE, noise as u8);
      if in_use {
        put_flag(s, NL80211_SURVEY_INFO_IN_USE);
      }
      put_u64(s, NL80211_SURVEY_INFO_TIME, 5000);
      put_u64(s, NL80211_SURVEY_INFO_TIME_BUSY, 1200);
    });
    part
  }

  #[test]
  fn survey_parse() {
    let entry = parse_survey(&survey_part(2437, -95, true)).unwrap();
    assert_eq!(entry.mhz, 2437);
    assert_eq!(entry.noise_dbm, -95);
    assert!(entry.in_use);
    assert_eq!(entry.active_time_ms, 5000);
    assert_eq!(entry.busy_time_ms, 1200);
  }

  fn wiphy_bands_part() -> Vec<u8> {
    let mut part = Vec::new();
    put_nested(&mut part, NL80211_ATTR_WIPHY_BANDS, |bands| {
      // 2.4 GHz band: HT only
      put_nested(bands, 1, |band| {
        put_u16(band, NL80211_BAND_ATTR_HT_CAPA, 0x01ef); // HT40 capable
        put_nested(band, NL80211_BAND_ATTR_FREQS, |freqs| {
          put_nested(freqs, 1, |f| {
            put_u32(f, NL80211_FREQUENCY_ATTR_FREQ, 2437);
            put_u32(f, NL80211_FREQUENCY_ATTR_MAX_TX_POWER, 2000);
          });
          put_nested(freqs, 2, |f| {
            put_u32(f, NL80211_FREQUENCY_ATTR_FREQ, 2484);
            put_flag(f, NL80211_FREQUENCY_ATTR_DISABLED);
          });
        });
      });
      // 5 GHz band: VHT with 160 MHz support
      put_nested(bands, 2, |band| {
        put_u16(band, NL80211_BAND_ATTR_HT_CAPA, 0x01ef);
        put_u32(band, NL80211_BAND_ATTR_VHT_CAPA, 0x0000_0004); // width field = 1
        put_nested(band, NL80211_BAND_ATTR_FREQS, |freqs| {
          put_nested(freqs, 1, |f| {
            put_u32(f, NL80211_FREQUENCY_ATTR_FREQ, 5180);
            put_u32(f, NL80211_FREQUENCY_ATTR_MAX_TX_POWER, 2300);
            put_flag(f, NL80211_FREQUENCY_ATTR_NO_IR);
            put_flag(f, NL80211_FREQUENCY_ATTR_NO_160MHZ);
          });
        });
      });
    });
    part
  }

  #[test]
  fn hwmodes_from_wiphy_bands() {
    let part = wiphy_bands_part();
    let bands = attr::find(&part, NL80211_ATTR_WIPHY_BANDS).unwrap();
    let modes = hwmodes_from_bands(bands);
    assert!(modes.contains(
      HwModeSet::MODE_A
        | HwModeSet::MODE_B
        | HwModeSet::MODE_G
        | HwModeSet::MODE_N
        | HwModeSet::MODE_AC
    ));
  }

  #[test]
  fn htmodes_from_wiphy_bands() {
    let part = wiphy_bands_part();
    let bands = attr::find(&part, NL80211_ATTR_WIPHY_BANDS).unwrap();
    let modes = htmodes_from_bands(bands);
    assert!(modes.contains(HtModeSet::HT20 | HtModeSet::HT40));
    assert!(modes.contains(
      HtModeSet::VHT20 | HtModeSet::VHT40 | HtModeSet::VHT80 | HtModeSet::VHT160
    ));
    assert!(!modes.contains(HtModeSet::VHT80_80));
  }

  #[test]
  fn freqlist_skips_disabled_channels() {
    let part = wiphy_bands_part();
    let bands = attr::find(&part, NL80211_ATTR_WIPHY_BANDS).unwrap();
    let list = freqlist_from_bands(bands);
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].mhz, 2437);
    assert_eq!(list[0].channel, 6);
    assert!(!list[0].restricted);
    assert_eq!(list[1].mhz, 5180);
    assert_eq!(list[1].channel, 36);
    assert!(list[1].restricted);
    assert!(list[1].flags.contains(FreqFlagSet::NO_160MHZ));
  }

  #[test]
  fn txpower_cap_prefers_current_channel() {
    let part = wiphy_bands_part();
    let bands = attr::find(&part, NL80211_ATTR_WIPHY_BANDS).unwrap();
    assert_eq!(max_txpower_dbm(bands, 2437), Some(20));
    let bands = attr::find(&part, NL80211_ATTR_WIPHY_BANDS).unwrap();
    assert_eq!(max_txpower_dbm(bands, 0), Some(23));
  }

  #[test]
  fn iftype_mapping() {
    assert_eq!(mode_from_iftype(NL80211_IFTYPE_STATION), OperatingMode::Client);
    assert_eq!(mode_from_iftype(NL80211_IFTYPE_AP), OperatingMode::Master);
    assert_eq!(
      mode_from_iftype(NL80211_IFTYPE_MESH_POINT),
      OperatingMode::MeshPoint
    );
    assert_eq!(mode_from_iftype(1234), OperatingMode::Unknown);
  }

  #[test]
  fn quality_mapping_clamps() {
    assert_eq!(quality_from_signal(-40), 70);
    assert_eq!(quality_from_signal(-30), 70);
    assert_eq!(quality_from_signal(-110), 0);
    assert_eq!(quality_from_signal(-120), 0);
    assert_eq!(quality_from_signal(-75), 35);
  }

  #[test]
  fn probe_rejects_missing_interfaces() {
    let mut backend = Nl80211::new();
    assert!(!backend.probe("nonexistent0"));
  }
}

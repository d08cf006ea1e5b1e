//! Decodes a nested bitrate-information attribute into a `RateEntry`.
//!
//! The kernel computes the effective rate itself; this only classifies
//! it. The presence of the MCS attribute selects the HT interpretation,
//! the VHT-MCS attribute the VHT one, and with neither the entry is a
//! legacy rate where only the raw value means anything.

use super::attr::Attr;
use super::wire::{
  NL80211_RATE_INFO_160_MHZ_WIDTH, NL80211_RATE_INFO_40_MHZ_WIDTH,
  NL80211_RATE_INFO_80P80_MHZ_WIDTH, NL80211_RATE_INFO_80_MHZ_WIDTH,
  NL80211_RATE_INFO_BITRATE, NL80211_RATE_INFO_BITRATE32,
  NL80211_RATE_INFO_MCS, NL80211_RATE_INFO_SHORT_GI,
  NL80211_RATE_INFO_VHT_MCS, NL80211_RATE_INFO_VHT_NSS,
};
use crate::types::{RateDetail, RateEntry};

/// Decodes the children of a `*_BITRATE` attribute.
pub fn decode_rate(rate_attr: Attr) -> RateEntry {
  let mut rate16 = 0u32;
  let mut rate32 = None;
  let mut mcs = None;
  let mut vht_mcs = None;
  let mut nss = 0u8;
  let mut short_gi = false;
  let mut width_mhz = 20u16;

  for a in rate_attr.nested() {
    match a.id() {
      NL80211_RATE_INFO_BITRATE => rate16 = a.get_u16().unwrap_or(0) as u32,
      NL80211_RATE_INFO_BITRATE32 => rate32 = a.get_u32().ok(),
      NL80211_RATE_INFO_MCS => mcs = a.get_u8().ok(),
      NL80211_RATE_INFO_VHT_MCS => vht_mcs = a.get_u8().ok(),
      NL80211_RATE_INFO_VHT_NSS => nss = a.get_u8().unwrap_or(0),
      NL80211_RATE_INFO_SHORT_GI => short_gi = true,
      NL80211_RATE_INFO_40_MHZ_WIDTH => width_mhz = 40,
      NL80211_RATE_INFO_80_MHZ_WIDTH => width_mhz = 80,
      // Two non-contiguous 80 MHz segments carry 160 MHz worth of
      // subcarriers.
      NL80211_RATE_INFO_80P80_MHZ_WIDTH => width_mhz = 160,
      NL80211_RATE_INFO_160_MHZ_WIDTH => width_mhz = 160,
      _ => {}
    }
  }

  let rate = rate32.unwrap_or(rate16);
  let detail = if let Some(mcs) = vht_mcs {
    RateDetail::Vht { mcs, nss, width_mhz, short_gi }
  } else if let Some(mcs) = mcs {
    // HT widths are 20 or 40 MHz only.
    let width_mhz = if width_mhz > 40 { 40 } else { width_mhz };
    RateDetail::Ht { mcs, width_mhz, short_gi }
  } else {
    RateDetail::Legacy
  };
  RateEntry { rate, detail }
}

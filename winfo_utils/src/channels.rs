//! Frequency/channel mapping.
//!
//! Channel numbering follows the 802.11 band plans: 2.4 GHz channels sit
//! 5 MHz apart starting at 2407 MHz with channel 14 pinned to 2484 MHz,
//! the 4.9/5 GHz channels count from 5000 MHz, and 60 GHz channels are
//! 2160 MHz apart starting at 56160 MHz.

/// Converts a center frequency in MHz to its channel number.
/// Returns 0 for frequencies outside any known band plan.
pub fn mhz_to_channel(mhz: u32) -> u32 {
  match mhz {
    2484 => 14,
    2412..=2472 => (mhz - 2407) / 5,
    4910..=4980 => (mhz - 4000) / 5,
    5000..=45000 => (mhz - 5000) / 5,
    58320..=64800 => (mhz - 56160) / 2160,
    _ => 0,
  }
}

/// Converts a channel number in the given band to a center frequency in
/// MHz. `band_2ghz` disambiguates the low channel numbers shared by the
/// 2.4 and 5 GHz plans.
pub fn channel_to_mhz(channel: u32, band_2ghz: bool) -> u32 {
  if band_2ghz {
    match channel {
      14 => 2484,
      1..=13 => 2407 + channel * 5,
      _ => 0,
    }
  } else {
    match channel {
      7..=196 => 5000 + channel * 5,
      _ => 0,
    }
  }
}

//! Parser for the security-related information elements attached to
//! scan results. RSN (WPA2) travels as element 48; legacy WPA rides in
//! the vendor-specific element 221 under the Microsoft OUI. Both share
//! the same body layout, so one body parser serves both with different
//! defaults.
//!
//! Truncated input is expected here: drivers forward whatever the air
//! delivered. A record that declares more bytes than remain stops the
//! walk with everything parsed so far intact; it never aborts the scan
//! entry.

use crate::types::{AuthAlgSet, CipherSet, CryptoInfo, KeyMgmtSet};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;

/// Element id of the RSN (WPA2) information element.
const IE_RSN: u8 = 48;
/// Element id of the vendor-specific information element.
const IE_VENDOR: u8 = 221;
/// Element id of the SSID element.
const IE_SSID: u8 = 0;

/// Microsoft OUI; prefixes WPA1 vendor elements and WPA1 suite
/// selectors.
const MS_OUI: [u8; 3] = [0x00, 0x50, 0xf2];
/// Vendor subtype selecting WPA1 under the Microsoft OUI.
const VENDOR_WPA_SUBTYPE: u8 = 1;

/// WPA generation bits OR'd into `CryptoInfo::wpa_version`.
const WPA_V1: u8 = 1;
const WPA_V2: u8 = 2;

fn suite_to_cipher(suite_type: u8) -> CipherSet {
  // Suite selectors from the governing standard; both the 00-0F-AC and
  // the 00:50:F2 namespaces assign these five the same way. Anything
  // else decodes to an empty contribution.
  match suite_type {
    0 => CipherSet::NONE,
    1 => CipherSet::WEP40,
    2 => CipherSet::TKIP,
    3 => CipherSet::WRAP,
    4 => CipherSet::CCMP,
    5 => CipherSet::WEP104,
    _ => CipherSet::empty(),
  }
}

fn suite_to_kmgmt(suite_type: u8) -> KeyMgmtSet {
  match suite_type {
    1 => KeyMgmtSet::X8021,
    2 => KeyMgmtSet::PSK,
    _ => KeyMgmtSet::empty(),
  }
}

/// Parses one RSN/WPA element body into `crypto`.
///
/// Layout: version (2, little-endian), group suite (4), pairwise count
/// (2) + suites (4 each), AKM count (2) + suites (4 each), optional
/// capability bits (ignored). Each suite is a 3-byte OUI plus a type
/// byte; only the type byte selects the bitmask. `defcipher`/`defauth`
/// fill in for fields the element ends before declaring.
pub fn parse_rsn_body(
  crypto: &mut CryptoInfo,
  data: &[u8],
  defcipher: CipherSet,
  defauth: KeyMgmtSet,
) {
  if data.len() < 2 {
    return;
  }
  let _version = LittleEndian::read_u16(&data[0..2]);
  let mut rest = &data[2..];

  if rest.len() < 4 {
    crypto.group_ciphers |= defcipher;
    crypto.pair_ciphers |= defcipher;
    crypto.auth_suites |= defauth;
    return;
  }
  crypto.group_ciphers |= suite_to_cipher(rest[3]);
  rest = &rest[4..];

  if rest.len() < 2 {
    crypto.pair_ciphers |= defcipher;
    crypto.auth_suites |= defauth;
    return;
  }
  let count = LittleEndian::read_u16(&rest[0..2]) as usize;
  if 2 + count * 4 > rest.len() {
    debug!("truncated pairwise suite list, keeping partial element");
    return;
  }
  for i in 0..count {
    crypto.pair_ciphers |= suite_to_cipher(rest[2 + i * 4 + 3]);
  }
  rest = &rest[2 + count * 4..];

  if rest.len() < 2 {
    crypto.auth_suites |= defauth;
    return;
  }
  let count = LittleEndian::read_u16(&rest[0..2]) as usize;
  if 2 + count * 4 > rest.len() {
    debug!("truncated AKM suite list, keeping partial element");
    return;
  }
  for i in 0..count {
    crypto.auth_suites |= suite_to_kmgmt(rest[2 + i * 4 + 3]);
  }
  // Trailing RSN capability bits are not consumed by any caller.
}

/// Walks a raw information-element blob and derives the security
/// parameters of the advertising BSS. `privacy` is the capability bit
/// from the beacon; with no security element present it selects the
/// synthesized WEP entry, since WEP predates information elements.
pub fn parse_ies(ies: &[u8], privacy: bool) -> CryptoInfo {
  let mut crypto = CryptoInfo::default();
  let mut rest = ies;

  while rest.len() >= 2 {
    let tag = rest[0];
    let len = rest[1] as usize;
    if len + 2 > rest.len() {
      // Declared length runs past the blob: stop, keep what we have.
      break;
    }
    let body = &rest[2..2 + len];
    match tag {
      IE_RSN => {
        parse_rsn_body(&mut crypto, body, CipherSet::CCMP, KeyMgmtSet::X8021);
        crypto.wpa_version |= WPA_V2;
      }
      IE_VENDOR => {
        if len >= 4 && body[0..3] == MS_OUI && body[3] == VENDOR_WPA_SUBTYPE {
          parse_rsn_body(&mut crypto, &body[4..], CipherSet::TKIP, KeyMgmtSet::PSK);
          crypto.wpa_version |= WPA_V1;
        }
      }
      _ => {}
    }
    rest = &rest[2 + len..];
  }

  if crypto.wpa_version != 0 {
    crypto.enabled = true;
  } else if privacy {
    crypto = CryptoInfo::wep();
  }
  crypto
}

/// Finds the body of the first element with the given id.
pub fn find_ie(ies: &[u8], tag: u8) -> Option<&[u8]> {
  let mut rest = ies;
  while rest.len() >= 2 {
    let len = rest[1] as usize;
    if len + 2 > rest.len() {
      return None;
    }
    if rest[0] == tag {
      return Some(&rest[2..2 + len]);
    }
    rest = &rest[2 + len..];
  }
  None
}

/// Extracts the SSID element, if present and non-empty. Hidden networks
/// beacon a zero-length or all-NUL SSID; both map to `None`.
pub fn find_ssid(ies: &[u8]) -> Option<&[u8]> {
  let ssid = find_ie(ies, IE_SSID)?;
  if ssid.is_empty() || ssid.iter().all(|b| *b == 0) {
    return None;
  }
  Some(ssid)
}

#[cfg(test)]
mod tests {
  use super::*;

  const RSN_OUI: [u8; 3] = [0x00, 0x0f, 0xac];

  fn suite(oui: [u8; 3], t: u8) -> Vec<u8> {
    vec![oui[0], oui[1], oui[2], t]
  }

  fn rsn_element(group: u8, pairwise: &[u8], akm: &[u8]) -> Vec<u8> {
    let mut body = vec![0x01, 0x00]; // version 1
    body.extend(suite(RSN_OUI, group));
    body.extend((pairwise.len() as u16).to_le_bytes());
    for p in pairwise {
      body.extend(suite(RSN_OUI, *p));
    }
    body.extend((akm.len() as u16).to_le_bytes());
    for a in akm {
      body.extend(suite(RSN_OUI, *a));
    }
    let mut ie = vec![IE_RSN, body.len() as u8];
    ie.extend(body);
    ie
  }

  fn wpa_element(group: u8, pairwise: &[u8], akm: &[u8]) -> Vec<u8> {
    let mut body = vec![MS_OUI[0], MS_OUI[1], MS_OUI[2], VENDOR_WPA_SUBTYPE];
    body.extend([0x01, 0x00]);
    body.extend(suite(MS_OUI, group));
    body.extend((pairwise.len() as u16).to_le_bytes());
    for p in pairwise {
      body.extend(suite(MS_OUI, *p));
    }
    body.extend((akm.len() as u16).to_le_bytes());
    for a in akm {
      body.extend(suite(MS_OUI, *a));
    }
    let mut ie = vec![IE_VENDOR, body.len() as u8];
    ie.extend(body);
    ie
  }

  #[test]
  fn rsn_ccmp_psk() {
    let ie = rsn_element(4, &[4], &[2]);
    let c = parse_ies(&ie, true);
    assert!(c.enabled);
    assert_eq!(c.wpa_version, 2);
    assert_eq!(c.group_ciphers, CipherSet::CCMP);
    assert_eq!(c.pair_ciphers, CipherSet::CCMP);
    assert_eq!(c.auth_suites, KeyMgmtSet::PSK);
    assert!(c.auth_algs.is_empty());
  }

  #[test]
  fn wpa1_tkip() {
    let ie = wpa_element(2, &[2], &[2]);
    let c = parse_ies(&ie, true);
    assert!(c.enabled);
    assert_eq!(c.wpa_version, 1);
    assert_eq!(c.group_ciphers, CipherSet::TKIP);
    assert_eq!(c.pair_ciphers, CipherSet::TKIP);
    assert_eq!(c.auth_suites, KeyMgmtSet::PSK);
  }

  #[test]
  fn mixed_mode_unions_both_elements() {
    let mut ies = wpa_element(2, &[2], &[2]);
    ies.extend(rsn_element(4, &[4], &[1, 2]));
    let c = parse_ies(&ies, true);
    assert_eq!(c.wpa_version, 3);
    assert!(c.pair_ciphers.contains(CipherSet::TKIP | CipherSet::CCMP));
    assert!(c.auth_suites.contains(KeyMgmtSet::PSK | KeyMgmtSet::X8021));
  }

  #[test]
  fn bitmask_suite_round_trip() {
    // Re-encode the parsed masks into suite lists and parse again; the
    // result must be identical.
    let ie = rsn_element(4, &[2, 4], &[1, 2]);
    let first = parse_ies(&ie, true);

    let mut pairwise = Vec::new();
    for (set, t) in [
      (CipherSet::WEP40, 1u8),
      (CipherSet::TKIP, 2),
      (CipherSet::WRAP, 3),
      (CipherSet::CCMP, 4),
      (CipherSet::WEP104, 5),
    ] {
      if first.pair_ciphers.contains(set) {
        pairwise.push(t);
      }
    }
    let mut akm = Vec::new();
    for (set, t) in [(KeyMgmtSet::X8021, 1u8), (KeyMgmtSet::PSK, 2)] {
      if first.auth_suites.contains(set) {
        akm.push(t);
      }
    }
    let again = parse_ies(&rsn_element(4, &pairwise, &akm), true);
    assert_eq!(first, again);
  }

  #[test]
  fn truncated_akm_list_keeps_pairwise() {
    let mut ie = rsn_element(4, &[4], &[2]);
    // Chop off the last AKM suite but leave the declared counts alone:
    // the body now lies about its AKM list length.
    let cut = ie.len() - 3;
    ie.truncate(cut);
    ie[1] = (ie.len() - 2) as u8;
    let c = parse_ies(&ie, true);
    assert!(c.enabled);
    assert_eq!(c.wpa_version, 2);
    assert_eq!(c.pair_ciphers, CipherSet::CCMP);
    assert!(c.auth_suites.is_empty());
  }

  #[test]
  fn record_longer_than_blob_stops_walk() {
    let mut ies = rsn_element(4, &[4], &[2]);
    ies.extend([IE_VENDOR, 0xff, 0x00]); // declares 255 bytes, has 1
    let c = parse_ies(&ies, false);
    assert!(c.enabled);
    assert_eq!(c.wpa_version, 2);
  }

  #[test]
  fn short_element_uses_defaults() {
    // Version only; everything after falls back to the defaults for
    // the element kind.
    let ie = [IE_RSN, 2, 0x01, 0x00];
    let c = parse_ies(&ie, false);
    assert!(c.enabled);
    assert_eq!(c.group_ciphers, CipherSet::CCMP);
    assert_eq!(c.pair_ciphers, CipherSet::CCMP);
    assert_eq!(c.auth_suites, KeyMgmtSet::X8021);
  }

  #[test]
  fn privacy_without_ie_is_wep() {
    let c = parse_ies(&[], true);
    assert!(c.enabled);
    assert_eq!(c.wpa_version, 0);
    assert!(c.pair_ciphers.contains(CipherSet::WEP40 | CipherSet::WEP104));
    assert!(c.auth_algs.contains(AuthAlgSet::OPEN | AuthAlgSet::SHARED));
  }

  #[test]
  fn open_network() {
    let c = parse_ies(&[], false);
    assert!(!c.enabled);
    assert_eq!(c, CryptoInfo::default());
  }

  #[test]
  fn ssid_extraction() {
    let ies = [IE_SSID, 4, b'l', b'a', b'b', b'1', IE_RSN, 2, 1, 0];
    assert_eq!(find_ssid(&ies), Some(&b"lab1"[..]));
    let hidden = [IE_SSID, 0];
    assert_eq!(find_ssid(&hidden), None);
    let nulled = [IE_SSID, 3, 0, 0, 0];
    assert_eq!(find_ssid(&nulled), None);
  }
}

//! Wire-format constants for generic netlink and the nl80211 family.
//!
//! Values are fixed by the kernel ABI. Only the subset this backend
//! actually queries is listed; unknown attributes in replies are
//! skipped by the decoder, so the list does not need to chase the
//! kernel header.

#![allow(dead_code)]

// ---- netlink message layer ----

/// Byte length of `nlmsghdr`.
pub const NLMSG_HDRLEN: usize = 16;
/// Byte length of `genlmsghdr`.
pub const GENL_HDRLEN: usize = 4;
/// Byte length of an attribute header (`nlattr`).
pub const NLA_HDRLEN: usize = 4;
/// Attribute payloads are padded to this alignment.
pub const NLA_ALIGNTO: usize = 4;
/// Mask selecting the attribute type from the `nla_type` field; the
/// two top bits carry the nested/byte-order flags.
pub const NLA_TYPE_MASK: u16 = 0x3fff;

pub const NLMSG_NOOP: u16 = 0x1;
pub const NLMSG_ERROR: u16 = 0x2;
pub const NLMSG_DONE: u16 = 0x3;

pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_MULTI: u16 = 0x02;
pub const NLM_F_ACK: u16 = 0x04;
/// `NLM_F_ROOT | NLM_F_MATCH`: ask for a full table dump.
pub const NLM_F_DUMP: u16 = 0x300;

// ---- generic netlink controller ----

/// Fixed family id of the genl controller itself.
pub const GENL_ID_CTRL: u16 = 0x10;
pub const CTRL_CMD_GETFAMILY: u8 = 3;
pub const CTRL_ATTR_FAMILY_ID: u16 = 1;
pub const CTRL_ATTR_FAMILY_NAME: u16 = 2;
pub const CTRL_ATTR_MCAST_GROUPS: u16 = 7;
pub const CTRL_ATTR_MCAST_GRP_NAME: u16 = 1;
pub const CTRL_ATTR_MCAST_GRP_ID: u16 = 2;

/// Name the wireless family registers under.
pub const NL80211_FAMILY_NAME: &str = "nl80211";

// ---- nl80211 commands ----

pub const NL80211_CMD_GET_WIPHY: u8 = 1;
pub const NL80211_CMD_GET_INTERFACE: u8 = 5;
pub const NL80211_CMD_GET_STATION: u8 = 17;
pub const NL80211_CMD_GET_REG: u8 = 31;
pub const NL80211_CMD_GET_SCAN: u8 = 32;
pub const NL80211_CMD_GET_SURVEY: u8 = 50;

// ---- nl80211 top-level attributes ----

pub const NL80211_ATTR_WIPHY: u16 = 1;
pub const NL80211_ATTR_WIPHY_NAME: u16 = 2;
pub const NL80211_ATTR_IFINDEX: u16 = 3;
pub const NL80211_ATTR_IFNAME: u16 = 4;
pub const NL80211_ATTR_IFTYPE: u16 = 5;
pub const NL80211_ATTR_MAC: u16 = 6;
pub const NL80211_ATTR_STA_INFO: u16 = 21;
pub const NL80211_ATTR_WIPHY_BANDS: u16 = 22;
pub const NL80211_ATTR_SUPPORTED_IFTYPES: u16 = 32;
pub const NL80211_ATTR_REG_ALPHA2: u16 = 33;
pub const NL80211_ATTR_WIPHY_FREQ: u16 = 38;
pub const NL80211_ATTR_BSS: u16 = 47;
pub const NL80211_ATTR_SSID: u16 = 52;
pub const NL80211_ATTR_SURVEY_INFO: u16 = 84;
pub const NL80211_ATTR_WIPHY_TX_POWER_LEVEL: u16 = 98;

// ---- scan result (BSS) attributes ----

pub const NL80211_BSS_BSSID: u16 = 1;
pub const NL80211_BSS_FREQUENCY: u16 = 2;
pub const NL80211_BSS_CAPABILITY: u16 = 5;
pub const NL80211_BSS_INFORMATION_ELEMENTS: u16 = 6;
pub const NL80211_BSS_SIGNAL_MBM: u16 = 7;
pub const NL80211_BSS_SIGNAL_UNSPEC: u16 = 8;
pub const NL80211_BSS_STATUS: u16 = 9;

/// Values of `NL80211_BSS_STATUS`.
pub const NL80211_BSS_STATUS_ASSOCIATED: u32 = 1;
pub const NL80211_BSS_STATUS_IBSS_JOINED: u32 = 2;

/// Beacon capability bits used here.
pub const IEEE80211_CAP_ESS: u16 = 1 << 0;
pub const IEEE80211_CAP_IBSS: u16 = 1 << 1;
pub const IEEE80211_CAP_PRIVACY: u16 = 1 << 4;

// ---- station information attributes ----

pub const NL80211_STA_INFO_INACTIVE_TIME: u16 = 1;
pub const NL80211_STA_INFO_RX_BYTES: u16 = 2;
pub const NL80211_STA_INFO_TX_BYTES: u16 = 3;
pub const NL80211_STA_INFO_SIGNAL: u16 = 7;
pub const NL80211_STA_INFO_TX_BITRATE: u16 = 8;
pub const NL80211_STA_INFO_RX_PACKETS: u16 = 9;
pub const NL80211_STA_INFO_TX_PACKETS: u16 = 10;
pub const NL80211_STA_INFO_TX_RETRIES: u16 = 11;
pub const NL80211_STA_INFO_TX_FAILED: u16 = 12;
pub const NL80211_STA_INFO_SIGNAL_AVG: u16 = 13;
pub const NL80211_STA_INFO_RX_BITRATE: u16 = 14;
pub const NL80211_STA_INFO_CONNECTED_TIME: u16 = 16;
pub const NL80211_STA_INFO_STA_FLAGS: u16 = 17;
pub const NL80211_STA_INFO_T_OFFSET: u16 = 19;
pub const NL80211_STA_INFO_RX_BYTES64: u16 = 23;
pub const NL80211_STA_INFO_TX_BYTES64: u16 = 24;
pub const NL80211_STA_INFO_EXPECTED_THROUGHPUT: u16 = 27;
pub const NL80211_STA_INFO_RX_DROP_MISC: u16 = 28;

/// Bit positions inside the `nl80211_sta_flag_update` masks.
pub const NL80211_STA_FLAG_AUTHORIZED: u32 = 1 << 1;
pub const NL80211_STA_FLAG_SHORT_PREAMBLE: u32 = 1 << 2;
pub const NL80211_STA_FLAG_WME: u32 = 1 << 3;
pub const NL80211_STA_FLAG_MFP: u32 = 1 << 4;
pub const NL80211_STA_FLAG_AUTHENTICATED: u32 = 1 << 5;
pub const NL80211_STA_FLAG_TDLS_PEER: u32 = 1 << 6;

// ---- bitrate information attributes ----

pub const NL80211_RATE_INFO_BITRATE: u16 = 1;
pub const NL80211_RATE_INFO_MCS: u16 = 2;
pub const NL80211_RATE_INFO_40_MHZ_WIDTH: u16 = 3;
pub const NL80211_RATE_INFO_SHORT_GI: u16 = 4;
pub const NL80211_RATE_INFO_BITRATE32: u16 = 5;
pub const NL80211_RATE_INFO_VHT_MCS: u16 = 6;
pub const NL80211_RATE_INFO_VHT_NSS: u16 = 7;
pub const NL80211_RATE_INFO_80_MHZ_WIDTH: u16 = 8;
pub const NL80211_RATE_INFO_80P80_MHZ_WIDTH: u16 = 9;
pub const NL80211_RATE_INFO_160_MHZ_WIDTH: u16 = 10;

// ---- wiphy band attributes ----

pub const NL80211_BAND_ATTR_FREQS: u16 = 1;
pub const NL80211_BAND_ATTR_RATES: u16 = 2;
pub const NL80211_BAND_ATTR_HT_CAPA: u16 = 4;
pub const NL80211_BAND_ATTR_VHT_CAPA: u16 = 8;

pub const NL80211_FREQUENCY_ATTR_FREQ: u16 = 1;
pub const NL80211_FREQUENCY_ATTR_DISABLED: u16 = 2;
pub const NL80211_FREQUENCY_ATTR_NO_IR: u16 = 3;
pub const NL80211_FREQUENCY_ATTR_MAX_TX_POWER: u16 = 6;
pub const NL80211_FREQUENCY_ATTR_NO_HT40_MINUS: u16 = 9;
pub const NL80211_FREQUENCY_ATTR_NO_HT40_PLUS: u16 = 10;
pub const NL80211_FREQUENCY_ATTR_NO_80MHZ: u16 = 11;
pub const NL80211_FREQUENCY_ATTR_NO_160MHZ: u16 = 12;
pub const NL80211_FREQUENCY_ATTR_NO_20MHZ: u16 = 16;
pub const NL80211_FREQUENCY_ATTR_NO_10MHZ: u16 = 17;

pub const NL80211_BITRATE_ATTR_RATE: u16 = 1;

/// `HT_CAPA` bit: 40 MHz channel width supported.
pub const IEEE80211_HT_CAP_SUP_WIDTH_20_40: u16 = 0x0002;
/// `VHT_CAPA` field: supported channel width, bits 2..3.
pub const IEEE80211_VHT_CAP_CHAN_WIDTH_SHIFT: u32 = 2;
pub const IEEE80211_VHT_CAP_CHAN_WIDTH_MASK: u32 = 0x3;

// ---- survey attributes ----

pub const NL80211_SURVEY_INFO_FREQUENCY: u16 = 1;
pub const NL80211_SURVEY_INFO_NOISE: u16 = 2;
pub const NL80211_SURVEY_INFO_IN_USE: u16 = 3;
pub const NL80211_SURVEY_INFO_TIME: u16 = 4;
pub const NL80211_SURVEY_INFO_TIME_BUSY: u16 = 5;
pub const NL80211_SURVEY_INFO_TIME_EXT_BUSY: u16 = 6;
pub const NL80211_SURVEY_INFO_TIME_RX: u16 = 7;
pub const NL80211_SURVEY_INFO_TIME_TX: u16 = 8;

// ---- interface types ----

pub const NL80211_IFTYPE_ADHOC: u32 = 1;
pub const NL80211_IFTYPE_STATION: u32 = 2;
pub const NL80211_IFTYPE_AP: u32 = 3;
pub const NL80211_IFTYPE_AP_VLAN: u32 = 4;
pub const NL80211_IFTYPE_WDS: u32 = 5;
pub const NL80211_IFTYPE_MONITOR: u32 = 6;
pub const NL80211_IFTYPE_MESH_POINT: u32 = 7;
pub const NL80211_IFTYPE_P2P_CLIENT: u32 = 8;
pub const NL80211_IFTYPE_P2P_GO: u32 = 9;

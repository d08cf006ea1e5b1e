//! Command-line report generator for the wireless query layer.
//!
//! With no arguments, walks `/sys/class/net` and prints the status
//! block for every interface a backend claims. With a device and a
//! command, prints one report. Every value degrades to an explicit
//! "unknown"/"none" so the output shape never depends on driver
//! support.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::exit;
use winfo::{
  format_mac, AssocEntry, AuthAlgSet, BackendOps, CryptoInfo, Dispatcher,
  RateDetail, RateEntry, ScanEntry,
};
use winfo_utils::countries::country_name;
use winfo_utils::power::dbm_to_mw;

#[derive(Parser)]
#[command(about = "Query wireless interface state")]
struct Args {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the full status block for one interface.
  Info { ifname: String },
  /// List the scan results cached by the kernel.
  Scan { ifname: String },
  /// List the supported transmit-power steps.
  Txpowerlist { ifname: String },
  /// List the supported frequencies.
  Freqlist { ifname: String },
  /// List the associated stations.
  Assoclist { ifname: String },
  /// List the selectable country codes.
  Countrylist { ifname: String },
  /// List the supported HT/VHT modes.
  Htmodelist { ifname: String },
  /// Print the channel-occupancy survey.
  Survey { ifname: String },
  /// Resolve a configuration section to a phy name.
  Phyname { backend: String, section: String },
}

fn main() -> Result<()> {
  env_logger::init_from_env(
    env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
  );
  let args = Args::parse();
  let mut dispatcher = Dispatcher::new();

  let rv = match args.command {
    None => print_all(&mut dispatcher),
    Some(Commands::Phyname { backend, section }) => {
      match dispatcher.backend_by_name(&backend) {
        Some(ops) => match ops.lookup_phy(&section) {
          Ok(phy) => {
            println!("{phy}");
            0
          }
          Err(_) => {
            eprintln!("Phy not found");
            1
          }
        },
        None => {
          eprintln!("No such wireless backend: {backend}");
          1
        }
      }
    }
    Some(command) => {
      let ifname = command.ifname().to_string();
      match dispatcher.backend_for(&ifname) {
        Some(ops) => {
          run_command(ops, &command, &ifname);
          0
        }
        None => {
          eprintln!("No such wireless device: {ifname}");
          1
        }
      }
    }
  };

  dispatcher.shutdown();
  if rv != 0 {
    exit(rv);
  }
  Ok(())
}

impl Commands {
  fn ifname(&self) -> &str {
    match self {
      Commands::Info { ifname }
      | Commands::Scan { ifname }
      | Commands::Txpowerlist { ifname }
      | Commands::Freqlist { ifname }
      | Commands::Assoclist { ifname }
      | Commands::Countrylist { ifname }
      | Commands::Htmodelist { ifname }
      | Commands::Survey { ifname } => ifname,
      Commands::Phyname { section, .. } => section,
    }
  }
}

fn run_command(ops: &mut dyn BackendOps, command: &Commands, ifname: &str) {
  match command {
    Commands::Info { .. } => print_info(ops, ifname),
    Commands::Scan { .. } => print_scanlist(ops, ifname),
    Commands::Txpowerlist { .. } => print_txpwrlist(ops, ifname),
    Commands::Freqlist { .. } => print_freqlist(ops, ifname),
    Commands::Assoclist { .. } => print_assoclist(ops, ifname),
    Commands::Countrylist { .. } => print_countrylist(ops, ifname),
    Commands::Htmodelist { .. } => print_htmodelist(ops, ifname),
    Commands::Survey { .. } => print_survey(ops, ifname),
    Commands::Phyname { .. } => {}
  }
}

fn print_all(dispatcher: &mut Dispatcher) -> i32 {
  let Ok(entries) = std::fs::read_dir("/sys/class/net") else {
    eprintln!("No network interfaces found");
    return 1;
  };
  let mut names: Vec<String> = entries
    .flatten()
    .filter_map(|e| e.file_name().into_string().ok())
    .collect();
  names.sort();
  for name in names {
    if let Some(ops) = dispatcher.backend_for(&name) {
      print_info(ops, &name);
      println!();
    }
  }
  0
}

// ---- value formatting ----

fn format_ssid(ssid: Option<&str>) -> String {
  match ssid {
    Some(ssid) if !ssid.is_empty() => format!("\"{ssid}\""),
    _ => "unknown".to_string(),
  }
}

fn format_channel(channel: Option<u32>) -> String {
  match channel {
    Some(ch) if ch > 0 => ch.to_string(),
    _ => "unknown".to_string(),
  }
}

fn format_frequency(mhz: Option<u32>) -> String {
  match mhz {
    Some(mhz) if mhz > 0 => format!("{:.3} GHz", mhz as f64 / 1000.0),
    _ => "unknown".to_string(),
  }
}

fn format_txpower(dbm: Option<i32>) -> String {
  match dbm {
    Some(dbm) if dbm >= 0 => format!("{dbm} dBm"),
    _ => "unknown".to_string(),
  }
}

fn format_quality(quality: Option<u8>) -> String {
  match quality {
    Some(q) => q.to_string(),
    None => "unknown".to_string(),
  }
}

fn format_signal(dbm: Option<i32>) -> String {
  match dbm {
    Some(dbm) if dbm != 0 => format!("{dbm} dBm"),
    _ => "unknown".to_string(),
  }
}

fn format_rate(kbit: Option<u32>) -> String {
  match kbit {
    Some(rate) if rate > 0 => {
      format!("{}.{} MBit/s", rate / 1000, (rate % 1000) / 100)
    }
    _ => "unknown".to_string(),
  }
}

fn format_enc_ciphers(ciphers: winfo::CipherSet) -> String {
  if ciphers.is_empty() {
    return "NONE".to_string();
  }
  ciphers.names().join(", ")
}

fn format_enc_suites(suites: winfo::KeyMgmtSet) -> String {
  if suites.is_empty() {
    return "NONE".to_string();
  }
  suites.names().join("/")
}

fn format_encryption(crypto: Option<&CryptoInfo>) -> String {
  let Some(c) = crypto else {
    return "unknown".to_string();
  };
  if !c.enabled {
    return "none".to_string();
  }
  // WEP carries no WPA version; only the auth algorithms tell.
  if c.wpa_version == 0 && !c.auth_algs.is_empty() {
    let ciphers = format_enc_ciphers(c.pair_ciphers);
    return if c.auth_algs.contains(AuthAlgSet::OPEN | AuthAlgSet::SHARED) {
      format!("WEP Open/Shared ({ciphers})")
    } else if c.auth_algs.contains(AuthAlgSet::OPEN) {
      format!("WEP Open System ({ciphers})")
    } else {
      format!("WEP Shared Auth ({ciphers})")
    };
  }
  if c.wpa_version == 0 {
    return "none".to_string();
  }
  let suites = format_enc_suites(c.auth_suites);
  let ciphers = format_enc_ciphers(c.pair_ciphers | c.group_ciphers);
  match c.wpa_version {
    3 => format!("mixed WPA/WPA2 {suites} ({ciphers})"),
    2 => format!("WPA2 {suites} ({ciphers})"),
    _ => format!("WPA {suites} ({ciphers})"),
  }
}

fn format_hwmodes(modes: Option<winfo::HwModeSet>) -> String {
  match modes {
    Some(modes) if !modes.is_empty() => {
      format!("802.11{}", modes.names().join(""))
    }
    _ => "unknown".to_string(),
  }
}

fn format_assocrate(rate: &RateEntry) -> String {
  if rate.rate == 0 {
    return "unknown".to_string();
  }
  let mut out = format_rate(Some(rate.kbit()));
  match rate.detail {
    RateDetail::Legacy => {}
    RateDetail::Ht { mcs, width_mhz, .. } => {
      out.push_str(&format!(", MCS {mcs}, {width_mhz}MHz"));
    }
    RateDetail::Vht { mcs, nss, width_mhz, .. } => {
      out.push_str(&format!(", VHT-MCS {mcs}, {width_mhz}MHz"));
      if nss > 0 {
        out.push_str(&format!(", VHT-NSS {nss}"));
      }
    }
  }
  out
}

// ---- reports ----

fn print_info(ops: &mut dyn BackendOps, ifname: &str) {
  let ssid = ops.ssid(ifname).ok();
  println!("{:<9} ESSID: {}", ifname, format_ssid(ssid.as_deref()));
  let bssid = ops
    .bssid(ifname)
    .map(|mac| format_mac(&mac))
    .unwrap_or_else(|_| "00:00:00:00:00:00".to_string());
  println!("          Access Point: {bssid}");
  let mode = ops.mode(ifname).unwrap_or_default();
  println!(
    "          Mode: {}  Channel: {} ({})",
    mode.name(),
    format_channel(ops.channel(ifname).ok()),
    format_frequency(ops.frequency(ifname).ok())
  );
  let offset = ops.txpower_offset(ifname).unwrap_or(0);
  let txpower = ops.txpower(ifname).map(|dbm| dbm + offset).ok();
  println!(
    "          Tx-Power: {}  Link Quality: {}/{}",
    format_txpower(txpower),
    format_quality(ops.quality(ifname).ok()),
    format_quality(ops.quality_max(ifname).ok())
  );
  println!(
    "          Signal: {}  Noise: {}",
    format_signal(ops.signal(ifname).ok()),
    format_signal(ops.noise(ifname).ok())
  );
  println!(
    "          Bit Rate: {}",
    format_rate(ops.bitrate(ifname).ok())
  );
  println!(
    "          Encryption: {}",
    format_encryption(ops.encryption(ifname).ok().as_ref())
  );
  println!(
    "          Type: {}  HW Mode(s): {}",
    ops.name(),
    format_hwmodes(ops.hwmodelist(ifname).ok())
  );
  let hardware = match ops.hardware_id(ifname) {
    Ok(id) => format!(
      "{:04X}:{:04X} {:04X}:{:04X}",
      id.vendor_id, id.device_id, id.subsystem_vendor_id,
      id.subsystem_device_id
    ),
    Err(_) => "unknown".to_string(),
  };
  let hardware_name =
    ops.hardware_name(ifname).unwrap_or_else(|_| "unknown".to_string());
  println!("          Hardware: {hardware} [{hardware_name}]");
  println!(
    "          TX power offset: {}",
    match ops.txpower_offset(ifname) {
      Ok(0) => "none".to_string(),
      Ok(off) => format!("{off} dB"),
      Err(_) => "unknown".to_string(),
    }
  );
  println!(
    "          Frequency offset: {}",
    match ops.frequency_offset(ifname) {
      Ok(0) => "none".to_string(),
      Ok(off) => format!("{:.3} GHz", off as f64 / 1000.0),
      Err(_) => "unknown".to_string(),
    }
  );
  println!(
    "          Supports VAPs: {}  PHY name: {}",
    match ops.mbssid_support(ifname) {
      Ok(true) => "yes",
      _ => "no",
    },
    ops.phyname(ifname).unwrap_or_else(|_| "?".to_string())
  );
}

fn print_scan_entry(index: usize, entry: &ScanEntry) {
  println!("Cell {:02} - Address: {}", index, format_mac(&entry.bssid));
  println!("          ESSID: {}", format_ssid(entry.ssid.as_deref()));
  println!(
    "          Mode: {}  Channel: {}",
    entry.mode.name(),
    format_channel(Some(entry.channel))
  );
  println!(
    "          Signal: {}  Quality: {}/{}",
    format_signal(Some(entry.signal_dbm)),
    entry.quality,
    entry.quality_max
  );
  println!(
    "          Encryption: {}\n",
    format_encryption(Some(&entry.crypto))
  );
}

fn print_scanlist(ops: &mut dyn BackendOps, ifname: &str) {
  match ops.scanlist(ifname) {
    Err(_) => println!("Scanning not possible\n"),
    Ok(entries) if entries.is_empty() => println!("No scan results\n"),
    Ok(entries) => {
      for (i, entry) in entries.iter().enumerate() {
        print_scan_entry(i + 1, entry);
      }
    }
  }
}

fn print_txpwrlist(ops: &mut dyn BackendOps, ifname: &str) {
  let Ok(list) = ops.txpwrlist(ifname) else {
    println!("No TX power information available");
    return;
  };
  if list.is_empty() {
    println!("No TX power information available");
    return;
  }
  let current = ops.txpower(ifname).unwrap_or(-1);
  let offset = ops.txpower_offset(ifname).unwrap_or(0);
  for entry in &list {
    println!(
      "{}{:3} dBm ({:4} mW)",
      if current == entry.dbm { "*" } else { " " },
      entry.dbm + offset,
      dbm_to_mw(entry.dbm + offset)
    );
  }
}

fn print_freqlist(ops: &mut dyn BackendOps, ifname: &str) {
  let Ok(list) = ops.freqlist(ifname) else {
    println!("No frequency information available");
    return;
  };
  if list.is_empty() {
    println!("No frequency information available");
    return;
  }
  let current = ops.channel(ifname).unwrap_or(0);
  for entry in &list {
    println!(
      "{} {} (Channel {}){}",
      if current == entry.channel { "*" } else { " " },
      format_frequency(Some(entry.mhz)),
      format_channel(Some(entry.channel)),
      if entry.restricted { " [restricted]" } else { "" }
    );
  }
}

fn print_assoc_entry(entry: &AssocEntry) {
  println!(
    "{}  {} / {} (SNR {})  {} ms ago",
    format_mac(&entry.mac),
    format_signal(Some(entry.signal_dbm as i32)),
    format_signal(Some(entry.noise_dbm as i32)),
    entry.signal_dbm as i32 - entry.noise_dbm as i32,
    entry.inactive_ms
  );
  println!(
    "\tRX: {:<38}  {:8} Pkts.",
    format_assocrate(&entry.rx_rate),
    entry.rx_packets
  );
  println!(
    "\tTX: {:<38}  {:8} Pkts.",
    format_assocrate(&entry.tx_rate),
    entry.tx_packets
  );
  println!(
    "\texpected throughput: {}\n",
    format_rate(Some(entry.expected_throughput))
  );
}

fn print_assoclist(ops: &mut dyn BackendOps, ifname: &str) {
  match ops.assoclist(ifname) {
    Err(_) => println!("No information available"),
    Ok(entries) if entries.is_empty() => println!("No station connected"),
    Ok(entries) => {
      for entry in &entries {
        print_assoc_entry(entry);
      }
    }
  }
}

fn print_countrylist(ops: &mut dyn BackendOps, ifname: &str) {
  let Ok(list) = ops.countrylist(ifname) else {
    println!("No country code information available");
    return;
  };
  let current = ops.country(ifname).unwrap_or_default();
  for entry in &list {
    println!(
      "{} {:4}\t{}",
      if entry.ccode == current { "*" } else { " " },
      entry.ccode,
      country_name(entry.iso3166).unwrap_or("Unknown")
    );
  }
}

fn print_htmodelist(ops: &mut dyn BackendOps, ifname: &str) {
  match ops.htmodelist(ifname) {
    Err(_) => println!("No HT mode information available"),
    Ok(modes) => println!("{}", modes.names().join(" ")),
  }
}

fn print_survey(ops: &mut dyn BackendOps, ifname: &str) {
  let Ok(entries) = ops.survey(ifname) else {
    println!("No survey information available");
    return;
  };
  if entries.is_empty() {
    println!("No survey information available");
    return;
  }
  for entry in &entries {
    println!(
      "{}{} ({})",
      if entry.in_use { "*" } else { " " },
      format_frequency(Some(entry.mhz)),
      format_signal(Some(entry.noise_dbm as i32))
    );
    println!(
      "\tactive: {} ms  busy: {} ms  rx: {} ms  tx: {} ms",
      entry.active_time_ms, entry.busy_time_ms, entry.rx_time_ms,
      entry.tx_time_ms
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use winfo::{CipherSet, KeyMgmtSet};

  #[test]
  fn rate_formatting() {
    assert_eq!(format_rate(Some(54000)), "54.0 MBit/s");
    assert_eq!(format_rate(Some(1300)), "1.3 MBit/s");
    assert_eq!(format_rate(Some(0)), "unknown");
    assert_eq!(format_rate(None), "unknown");
  }

  #[test]
  fn encryption_formatting() {
    assert_eq!(format_encryption(None), "unknown");
    assert_eq!(format_encryption(Some(&CryptoInfo::default())), "none");

    let wpa2 = CryptoInfo {
      enabled: true,
      wpa_version: 2,
      group_ciphers: CipherSet::CCMP,
      pair_ciphers: CipherSet::CCMP,
      auth_suites: KeyMgmtSet::PSK,
      auth_algs: AuthAlgSet::empty(),
    };
    assert_eq!(format_encryption(Some(&wpa2)), "WPA2 PSK (CCMP)");

    let mixed = CryptoInfo {
      wpa_version: 3,
      pair_ciphers: CipherSet::TKIP | CipherSet::CCMP,
      auth_suites: KeyMgmtSet::PSK | KeyMgmtSet::X8021,
      ..wpa2
    };
    assert_eq!(
      format_encryption(Some(&mixed)),
      "mixed WPA/WPA2 802.1X/PSK (TKIP, CCMP)"
    );

    let wep = CryptoInfo::wep();
    assert_eq!(
      format_encryption(Some(&wep)),
      "WEP Open/Shared (WEP-40, WEP-104)"
    );
  }

  #[test]
  fn assoc_rate_formatting() {
    let legacy = RateEntry { rate: 540, detail: RateDetail::Legacy };
    assert_eq!(format_assocrate(&legacy), "54.0 MBit/s");

    let vht = RateEntry {
      rate: 8667,
      detail: RateDetail::Vht { mcs: 9, nss: 2, width_mhz: 80, short_gi: true },
    };
    assert_eq!(
      format_assocrate(&vht),
      "866.7 MBit/s, VHT-MCS 9, 80MHz, VHT-NSS 2"
    );
  }

  #[test]
  fn ssid_and_channel_formatting() {
    assert_eq!(format_ssid(Some("lab")), "\"lab\"");
    assert_eq!(format_ssid(None), "unknown");
    assert_eq!(format_channel(Some(11)), "11");
    assert_eq!(format_channel(Some(0)), "unknown");
    assert_eq!(format_frequency(Some(2437)), "2.437 GHz");
  }
}

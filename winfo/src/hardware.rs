//! The hardware calibration catalog.
//!
//! A flat text table maps PCI/USB id 4-tuples to display names and
//! board-specific transmit-power/frequency offsets. The table is read
//! once per process; a missing or unreadable file just means an empty
//! catalog, since most systems carry no calibration data at all.
//!
//! Line format, whitespace separated:
//!
//! ```text
//! 0x14e4 0x4329 0x14e4 0x0370 0 0 "Broadcom" "BCM4329"
//! ```

use crate::types::{HardwareEntry, HardwareId};
use log::warn;
use once_cell::sync::Lazy;
use std::path::Path;
use winfo_utils::hex_string::read_hex_u16;

/// Well-known location of the calibration table.
pub const HARDWARE_DB_PATH: &str = "/usr/share/winfo/hardware.txt";

static CATALOG: Lazy<Vec<HardwareEntry>> =
  Lazy::new(|| load_catalog(Path::new(HARDWARE_DB_PATH)));

fn load_catalog(path: &Path) -> Vec<HardwareEntry> {
  match std::fs::read_to_string(path) {
    Ok(raw) => parse_catalog(&raw),
    Err(_) => {
      // Not an error: the table ships only on platforms that need
      // calibration offsets.
      Vec::new()
    }
  }
}

fn parse_catalog(raw: &str) -> Vec<HardwareEntry> {
  let mut entries = Vec::new();
  for line in raw.lines() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    match parse_line(line) {
      Some(entry) => entries.push(entry),
      None => warn!("Skipping malformed hardware table line: {line}"),
    }
  }
  entries
}

fn parse_line(line: &str) -> Option<HardwareEntry> {
  let mut fields = line.split_whitespace();
  let id = HardwareId {
    vendor_id: read_hex_u16(fields.next()?).ok()?,
    device_id: read_hex_u16(fields.next()?).ok()?,
    subsystem_vendor_id: read_hex_u16(fields.next()?).ok()?,
    subsystem_device_id: read_hex_u16(fields.next()?).ok()?,
  };
  let txpower_offset: i16 = fields.next()?.parse().ok()?;
  let frequency_offset: i16 = fields.next()?.parse().ok()?;

  // Names may contain spaces, so they are quoted rather than
  // whitespace-delimited.
  let mut quoted = line.split('"').skip(1).step_by(2);
  let vendor_name = quoted.next()?.to_string();
  let device_name = quoted.next()?.to_string();

  Some(HardwareEntry {
    id,
    vendor_name,
    device_name,
    txpower_offset,
    frequency_offset,
  })
}

fn lookup_in(catalog: &[HardwareEntry], id: &HardwareId) -> HardwareEntry {
  if let Some(exact) = catalog.iter().find(|e| e.id == *id) {
    return exact.clone();
  }
  // Fall back to a vendor+device row carrying no subsystem ids; boards
  // without calibration-relevant subsystems are listed that way.
  let generic = catalog.iter().find(|e| {
    e.id.vendor_id == id.vendor_id
      && e.id.device_id == id.device_id
      && e.id.subsystem_vendor_id == 0
      && e.id.subsystem_device_id == 0
  });
  if let Some(generic) = generic {
    return generic.clone();
  }
  HardwareEntry {
    id: *id,
    vendor_name: "Unknown vendor".to_string(),
    device_name: "Unknown device".to_string(),
    txpower_offset: 0,
    frequency_offset: 0,
  }
}

/// Looks up the catalog entry for a device. Never fails: unrecognized
/// hardware maps to an unknown-vendor entry with zero offsets, so
/// offset corrections degrade to a no-op.
pub fn hardware_entry(id: &HardwareId) -> HardwareEntry {
  lookup_in(&CATALOG, id)
}

//! Sysfs reads backing the identity operations: phy names, phy
//! indexes, and PCI/USB hardware ids. These are small kernel-owned
//! text files; absence means the interface is not wireless or the bus
//! does not expose the id, never a hard failure for the caller.

use crate::error::{Result, WinfoError};
use crate::types::HardwareId;
use std::path::{Path, PathBuf};
use winfo_utils::hex_string::read_hex_u16;

fn read_trimmed(path: &Path) -> Option<String> {
  std::fs::read_to_string(path)
    .ok()
    .map(|s| s.trim().to_string())
}

fn netdev_path(ifname: &str) -> PathBuf {
  Path::new("/sys/class/net").join(ifname)
}

/// True when the kernel exposes the interface as an nl80211 device.
pub fn is_nl80211(ifname: &str) -> bool {
  netdev_path(ifname).join("phy80211").exists()
}

/// The phy name backing an interface (`phy0`, ...).
pub fn phy_name(ifname: &str) -> Result<String> {
  read_trimmed(&netdev_path(ifname).join("phy80211/name"))
    .ok_or_else(|| WinfoError::NotFound(ifname.to_string()))
}

/// The numeric phy index backing an interface.
pub fn phy_index(ifname: &str) -> Result<u32> {
  read_trimmed(&netdev_path(ifname).join("phy80211/index"))
    .and_then(|s| s.parse().ok())
    .ok_or_else(|| WinfoError::NotFound(ifname.to_string()))
}

/// Reads the PCI or USB identity of the device behind an interface.
/// PCI exposes vendor/device/subsystem files directly; USB interfaces
/// keep idVendor/idProduct one level up and have no subsystem ids.
pub fn hardware_id(ifname: &str) -> Result<HardwareId> {
  let device = netdev_path(ifname).join("device");

  let read_id = |name: &str| -> Option<u16> {
    read_trimmed(&device.join(name)).and_then(|s| read_hex_u16(&s).ok())
  };

  if let (Some(vendor), Some(dev)) = (read_id("vendor"), read_id("device")) {
    return Ok(HardwareId {
      vendor_id: vendor,
      device_id: dev,
      subsystem_vendor_id: read_id("subsystem_vendor").unwrap_or(0),
      subsystem_device_id: read_id("subsystem_device").unwrap_or(0),
    });
  }

  for usb_dir in [device.clone(), device.join("..")] {
    let vendor = read_trimmed(&usb_dir.join("idVendor"))
      .and_then(|s| read_hex_u16(&s).ok());
    let product = read_trimmed(&usb_dir.join("idProduct"))
      .and_then(|s| read_hex_u16(&s).ok());
    if let (Some(vendor_id), Some(device_id)) = (vendor, product) {
      return Ok(HardwareId {
        vendor_id,
        device_id,
        subsystem_vendor_id: 0,
        subsystem_device_id: 0,
      });
    }
  }

  Err(WinfoError::NotSupported)
}

/// Resolves a configuration-section name to a phy. A literal phy name
/// (`phy0`) wins; otherwise the section is treated as a sysfs device
/// path and matched against each phy's device link.
pub fn lookup_phy(section: &str) -> Result<String> {
  let class = Path::new("/sys/class/ieee80211");
  if class.join(section).exists() {
    return Ok(section.to_string());
  }

  let wanted = std::fs::canonicalize(section)
    .map_err(|_| WinfoError::NotFound(section.to_string()))?;
  let entries = std::fs::read_dir(class)
    .map_err(|_| WinfoError::NotFound(section.to_string()))?;
  for entry in entries.flatten() {
    if let Ok(device) = std::fs::canonicalize(entry.path().join("device")) {
      if device == wanted {
        if let Some(name) = entry.file_name().to_str() {
          return Ok(name.to_string());
        }
      }
    }
  }
  Err(WinfoError::NotFound(section.to_string()))
}

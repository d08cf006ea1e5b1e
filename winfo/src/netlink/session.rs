//! Generic-netlink session lifecycle.
//!
//! One session owns one `NETLINK_GENERIC` socket. Connecting resolves
//! the wireless family's runtime-assigned numeric id and its multicast
//! groups through the genl controller; if the family is absent (driver
//! module not loaded) the connect fails and the caller decides when to
//! try again. The socket closes with the value (RAII) and `close` is
//! therefore idempotent by construction.

use super::attr;
use super::conveyor;
use super::wire::{
  CTRL_ATTR_FAMILY_ID, CTRL_ATTR_FAMILY_NAME, CTRL_ATTR_MCAST_GROUPS,
  CTRL_ATTR_MCAST_GRP_ID, CTRL_ATTR_MCAST_GRP_NAME, CTRL_CMD_GETFAMILY,
  GENL_ID_CTRL, NL80211_FAMILY_NAME,
};
use crate::error::{Result, WinfoError};
use log::{debug, error};
use nix::sys::socket::{
  bind, recv as socket_recv, send as socket_send, socket, AddressFamily,
  MsgFlags, NetlinkAddr, SockFlag, SockProtocol, SockType,
};
use std::os::fd::{AsRawFd, OwnedFd};

/// The multicast group treated as the session's control group; its
/// presence confirms the family resolution is complete.
const CONTROL_GROUP: &str = "config";

/// One connected generic-netlink session.
pub struct Session {
  fd: OwnedFd,
  family_id: u16,
  control_group: u32,
  groups: Vec<(String, u32)>,
  seq: u32,
}

impl Session {
  /// Opens the socket and resolves the wireless family. Fails with
  /// `Protocol` when the kernel does not register the family, which
  /// is what "no wireless driver loaded" looks like from here.
  pub fn connect() -> Result<Self> {
    let fd = socket(
      AddressFamily::Netlink,
      SockType::Raw,
      SockFlag::empty(),
      SockProtocol::NetlinkGeneric,
    )
    .map_err(|e| {
      error!("Unable to open a generic netlink socket: {e}");
      WinfoError::Protocol(format!("socket: {e}"))
    })?;
    bind(fd.as_raw_fd(), &NetlinkAddr::new(0, 0)).map_err(|e| {
      error!("Unable to bind the generic netlink socket: {e}");
      WinfoError::Protocol(format!("bind: {e}"))
    })?;

    let mut session = Session {
      fd,
      family_id: GENL_ID_CTRL,
      control_group: 0,
      groups: Vec::new(),
      seq: 0,
    };
    session.resolve_family()?;
    Ok(session)
  }

  fn resolve_family(&mut self) -> Result<()> {
    let replies =
      conveyor::request(self, GENL_ID_CTRL, CTRL_CMD_GETFAMILY, false, |m| {
        attr::put_str(m, CTRL_ATTR_FAMILY_NAME, NL80211_FAMILY_NAME);
      })
      .map_err(|_| {
        WinfoError::Protocol(
          "nl80211 family not present (no wireless driver loaded?)"
            .to_string(),
        )
      })?;

    let first = replies.parts.first().ok_or_else(|| {
      WinfoError::Protocol("empty family resolution reply".to_string())
    })?;
    let (family_id, groups) = parse_family_reply(first)?;
    let control_group = groups
      .iter()
      .find(|(name, _)| name == CONTROL_GROUP)
      .map(|(_, id)| *id)
      .ok_or_else(|| {
        WinfoError::Protocol(
          "wireless control multicast group missing".to_string(),
        )
      })?;
    debug!(
      "resolved {NL80211_FAMILY_NAME}: family {family_id}, control group {control_group}"
    );
    self.family_id = family_id;
    self.control_group = control_group;
    self.groups = groups;
    Ok(())
  }

  /// The resolved numeric family id.
  pub fn family_id(&self) -> u16 {
    self.family_id
  }

  /// The resolved control multicast group id.
  pub fn control_group(&self) -> u32 {
    self.control_group
  }

  /// Resolves a multicast group of the family by name.
  pub fn group(&self, name: &str) -> Option<u32> {
    self
      .groups
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, id)| *id)
  }

  pub(crate) fn next_seq(&mut self) -> u32 {
    self.seq = self.seq.wrapping_add(1);
    self.seq
  }

  pub(crate) fn send(&self, msg: &[u8]) -> Result<()> {
    let sent =
      socket_send(self.fd.as_raw_fd(), msg, MsgFlags::empty()).map_err(|e| {
      error!("netlink send failed: {e}");
      WinfoError::Protocol(format!("send: {e}"))
    })?;
    if sent != msg.len() {
      return Err(WinfoError::Protocol("short netlink send".to_string()));
    }
    Ok(())
  }

  pub(crate) fn recv(&self, buf: &mut [u8]) -> Result<usize> {
    socket_recv(self.fd.as_raw_fd(), buf, MsgFlags::empty()).map_err(|e| {
      error!("netlink recv failed: {e}");
      WinfoError::Protocol(format!("recv: {e}"))
    })
  }
}

/// Pulls the family id and multicast-group table out of a
/// `CTRL_CMD_GETFAMILY` reply.
fn parse_family_reply(buf: &[u8]) -> Result<(u16, Vec<(String, u32)>)> {
  let family_id = attr::find(buf, CTRL_ATTR_FAMILY_ID)
    .ok_or(WinfoError::Parse("family id attribute missing"))?
    .get_u16()
    .map_err(|_| WinfoError::Parse("family id attribute malformed"))?;

  let mut groups = Vec::new();
  if let Some(list) = attr::find(buf, CTRL_ATTR_MCAST_GROUPS) {
    for group in list.nested() {
      let mut name = None;
      let mut id = None;
      for a in group.nested() {
        match a.id() {
          CTRL_ATTR_MCAST_GRP_NAME => name = a.get_str().ok().map(str::to_string),
          CTRL_ATTR_MCAST_GRP_ID => id = a.get_u32().ok(),
          _ => {}
        }
      }
      if let (Some(name), Some(id)) = (name, id) {
        groups.push((name, id));
      }
    }
  }
  Ok((family_id, groups))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn family_reply(id: u16, groups: &[(&str, u32)]) -> Vec<u8> {
    let mut buf = Vec::new();
    attr::put_str(&mut buf, CTRL_ATTR_FAMILY_NAME, NL80211_FAMILY_NAME);
    attr::put_u16(&mut buf, CTRL_ATTR_FAMILY_ID, id);
    attr::put_nested(&mut buf, CTRL_ATTR_MCAST_GROUPS, |list| {
      for (idx, (name, gid)) in groups.iter().enumerate() {
        attr::put_nested(list, (idx + 1) as u16, |entry| {
          attr::put_str(entry, CTRL_ATTR_MCAST_GRP_NAME, name);
          attr::put_u32(entry, CTRL_ATTR_MCAST_GRP_ID, *gid);
        });
      }
    });
    buf
  }

  #[test]
  fn parses_family_and_groups() {
    let buf = family_reply(0x1c, &[("config", 5), ("scan", 6), ("mlme", 8)]);
    let (id, groups) = parse_family_reply(&buf).unwrap();
    assert_eq!(id, 0x1c);
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[1], ("scan".to_string(), 6));
  }

  #[test]
  fn missing_family_id_is_an_error() {
    let mut buf = Vec::new();
    attr::put_str(&mut buf, CTRL_ATTR_FAMILY_NAME, NL80211_FAMILY_NAME);
    assert!(parse_family_reply(&buf).is_err());
  }

  #[test]
  fn groups_are_optional_in_the_parse() {
    let mut buf = Vec::new();
    attr::put_u16(&mut buf, CTRL_ATTR_FAMILY_ID, 0x1c);
    let (id, groups) = parse_family_reply(&buf).unwrap();
    assert_eq!(id, 0x1c);
    assert!(groups.is_empty());
  }
}

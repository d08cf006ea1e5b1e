//! Builds one outbound generic-netlink request and drives its receive
//! loop to completion.
//!
//! A reply is either a single message, or a multipart dump terminated
//! by `NLMSG_DONE`. Either way every data-bearing message's attribute
//! region is accumulated in arrival order, so a dump spanning several
//! wire messages comes back as one ordered sequence of parts. Kernel
//! error replies are mapped into the crate error taxonomy; nothing here
//! retries.

use super::session::Session;
use super::wire::{
  GENL_HDRLEN, GENL_ID_CTRL, NLMSG_DONE, NLMSG_ERROR, NLMSG_HDRLEN,
  NLMSG_NOOP, NLM_F_DUMP, NLM_F_MULTI, NLM_F_REQUEST,
};
use crate::error::{Result, WinfoError};
use byteorder::{ByteOrder, NativeEndian};
use log::{debug, error, warn};
use nix::libc;

/// Hard cap on accumulated attribute payload per request. A driver
/// feeding an endless dump gets truncated here instead of growing the
/// process without bound.
pub const REPLY_BYTE_CAP: usize = 512 * 1024;

/// Receive buffer size; genl dumps chunk well below this.
const RECV_BUFSIZE: usize = 32 * 1024;

/// The accumulated outcome of one request.
pub struct Replies {
  /// One attribute region per data-bearing reply message, in arrival
  /// order.
  pub parts: Vec<Vec<u8>>,
  /// True when the accumulation cap cut the reply short.
  pub truncated: bool,
}

/// Sends `cmd` to `family` and accumulates the complete reply.
/// `fill` appends the request attributes (target selector first, by
/// convention of the callers).
pub fn request(
  session: &mut Session,
  family: u16,
  cmd: u8,
  dump: bool,
  fill: impl FnOnce(&mut Vec<u8>),
) -> Result<Replies> {
  let seq = session.next_seq();
  let mut flags = NLM_F_REQUEST;
  if dump {
    flags |= NLM_F_DUMP;
  }
  // The genl controller validates the header version; the wireless
  // family ignores it.
  let version = if family == GENL_ID_CTRL { 1 } else { 0 };
  let msg = build_message(family, flags, seq, cmd, version, fill);
  session.send(&msg)?;

  let mut acc = DumpAccumulator::new(seq, family);
  let mut rbuf = vec![0u8; RECV_BUFSIZE];
  while !acc.done {
    let n = session.recv(&mut rbuf)?;
    if n == 0 {
      return Err(WinfoError::Protocol("netlink socket closed".to_string()));
    }
    acc.feed(&rbuf[..n])?;
  }
  if acc.truncated {
    if acc.parts.is_empty() {
      // Nothing fit under the cap at all; there is no partial result
      // to preserve.
      return Err(WinfoError::BufferOverflow);
    }
    warn!("netlink reply exceeded {REPLY_BYTE_CAP} bytes, truncated");
  }
  Ok(Replies { parts: acc.parts, truncated: acc.truncated })
}

/// Serializes nlmsghdr + genlmsghdr + attributes, patching the total
/// length last.
pub(crate) fn build_message(
  family: u16,
  flags: u16,
  seq: u32,
  cmd: u8,
  version: u8,
  fill: impl FnOnce(&mut Vec<u8>),
) -> Vec<u8> {
  let mut buf = Vec::with_capacity(64);
  buf.extend(0u32.to_ne_bytes()); // nlmsg_len, patched below
  buf.extend(family.to_ne_bytes());
  buf.extend(flags.to_ne_bytes());
  buf.extend(seq.to_ne_bytes());
  buf.extend(0u32.to_ne_bytes()); // nlmsg_pid: kernel routes by socket
  buf.push(cmd);
  buf.push(version);
  buf.extend(0u16.to_ne_bytes()); // genl reserved
  fill(&mut buf);
  let total = buf.len() as u32;
  buf[0..4].copy_from_slice(&total.to_ne_bytes());
  buf
}

/// Reassembles one reply, wire message by wire message. Kept separate
/// from the socket so dump handling is testable from synthetic
/// datagrams.
pub(crate) struct DumpAccumulator {
  seq: u32,
  data_type: u16,
  pub(crate) parts: Vec<Vec<u8>>,
  total: usize,
  pub(crate) truncated: bool,
  pub(crate) done: bool,
}

impl DumpAccumulator {
  pub(crate) fn new(seq: u32, data_type: u16) -> Self {
    DumpAccumulator {
      seq,
      data_type,
      parts: Vec::new(),
      total: 0,
      truncated: false,
      done: false,
    }
  }

  /// Consumes every netlink message in one received datagram.
  pub(crate) fn feed(&mut self, datagram: &[u8]) -> Result<()> {
    let mut rest = datagram;
    while rest.len() >= NLMSG_HDRLEN {
      let declared = NativeEndian::read_u32(&rest[0..4]) as usize;
      let msg_type = NativeEndian::read_u16(&rest[4..6]);
      let flags = NativeEndian::read_u16(&rest[6..8]);
      let msg_seq = NativeEndian::read_u32(&rest[8..12]);
      if declared < NLMSG_HDRLEN || declared > rest.len() {
        error!("malformed netlink header (declared {declared} bytes)");
        return Err(WinfoError::Protocol(
          "malformed netlink message header".to_string(),
        ));
      }
      let payload = &rest[NLMSG_HDRLEN..declared];
      let stride = (declared + 3) & !3;
      let next = if stride >= rest.len() { &[][..] } else { &rest[stride..] };

      if msg_seq != self.seq {
        debug!("skipping reply with stale sequence {msg_seq}");
        rest = next;
        continue;
      }

      match msg_type {
        NLMSG_NOOP => {}
        NLMSG_DONE => {
          self.done = true;
          return Ok(());
        }
        NLMSG_ERROR => {
          if payload.len() < 4 {
            return Err(WinfoError::Protocol(
              "truncated netlink error reply".to_string(),
            ));
          }
          let code = NativeEndian::read_i32(&payload[0..4]);
          self.done = true;
          if code == 0 {
            // Plain acknowledgement.
            return Ok(());
          }
          return Err(map_kernel_error(code));
        }
        t if t == self.data_type => {
          if payload.len() < GENL_HDRLEN {
            return Err(WinfoError::Protocol(
              "truncated genl message".to_string(),
            ));
          }
          let region = &payload[GENL_HDRLEN..];
          if self.total + region.len() > REPLY_BYTE_CAP {
            // Keep draining the dump so the socket ends in a clean
            // state, but stop storing.
            self.truncated = true;
          } else {
            self.total += region.len();
            self.parts.push(region.to_vec());
          }
          if flags & NLM_F_MULTI == 0 {
            self.done = true;
            return Ok(());
          }
        }
        other => {
          debug!("ignoring unexpected netlink message type {other:#x}");
        }
      }
      rest = next;
    }
    Ok(())
  }
}

/// Maps a kernel error reply. "No such device/entry" and "operation
/// not supported" all mean the driver cannot answer this query; every
/// other code is a protocol-level failure.
fn map_kernel_error(code: i32) -> WinfoError {
  let errno = -code;
  if errno == libc::ENODEV || errno == libc::ENOENT || errno == libc::EOPNOTSUPP {
    WinfoError::NotSupported
  } else {
    error!("kernel replied with errno {errno}");
    WinfoError::Protocol(format!("kernel error (errno {errno})"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::netlink::attr;
  use crate::netlink::wire::NL80211_ATTR_IFINDEX;

  const FAMILY: u16 = 0x1c;
  const SEQ: u32 = 7;

  fn data_message(seq: u32, multi: bool, fill: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
    let flags = if multi { NLM_F_MULTI } else { 0 };
    build_message(FAMILY, flags, seq, 0, 0, fill)
  }

  fn done_message(seq: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend(20u32.to_ne_bytes());
    buf.extend(NLMSG_DONE.to_ne_bytes());
    buf.extend(NLM_F_MULTI.to_ne_bytes());
    buf.extend(seq.to_ne_bytes());
    buf.extend(0u32.to_ne_bytes());
    buf.extend(0u32.to_ne_bytes()); // dump return code
    buf
  }

  fn error_message(seq: u32, code: i32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend(20u32.to_ne_bytes());
    buf.extend(NLMSG_ERROR.to_ne_bytes());
    buf.extend(0u16.to_ne_bytes());
    buf.extend(seq.to_ne_bytes());
    buf.extend(0u32.to_ne_bytes());
    buf.extend(code.to_ne_bytes());
    buf
  }

  #[test]
  fn request_message_layout() {
    let msg = build_message(FAMILY, NLM_F_REQUEST, SEQ, 32, 0, |b| {
      attr::put_u32(b, NL80211_ATTR_IFINDEX, 4);
    });
    assert_eq!(NativeEndian::read_u32(&msg[0..4]) as usize, msg.len());
    assert_eq!(NativeEndian::read_u16(&msg[4..6]), FAMILY);
    assert_eq!(NativeEndian::read_u16(&msg[6..8]), NLM_F_REQUEST);
    assert_eq!(NativeEndian::read_u32(&msg[8..12]), SEQ);
    assert_eq!(msg[16], 32); // command
    // one u32 attribute after the two headers
    assert_eq!(msg.len(), NLMSG_HDRLEN + GENL_HDRLEN + 8);
  }

  #[test]
  fn single_reply_completes_without_done() {
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    let reply = data_message(SEQ, false, |b| attr::put_u32(b, 1, 99));
    acc.feed(&reply).unwrap();
    assert!(acc.done);
    assert_eq!(acc.parts.len(), 1);
    assert_eq!(attr::find(&acc.parts[0], 1).unwrap().get_u32().unwrap(), 99);
  }

  #[test]
  fn three_part_dump_reassembles_in_order() {
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    for marker in [10u32, 20, 30] {
      let part = data_message(SEQ, true, |b| attr::put_u32(b, 1, marker));
      acc.feed(&part).unwrap();
      assert!(!acc.done);
    }
    acc.feed(&done_message(SEQ)).unwrap();
    assert!(acc.done);
    assert!(!acc.truncated);
    let markers: Vec<u32> = acc
      .parts
      .iter()
      .map(|p| attr::find(p, 1).unwrap().get_u32().unwrap())
      .collect();
    assert_eq!(markers, vec![10, 20, 30]);
  }

  #[test]
  fn multiple_messages_per_datagram() {
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    let mut datagram = data_message(SEQ, true, |b| attr::put_u32(b, 1, 1));
    datagram.extend(data_message(SEQ, true, |b| attr::put_u32(b, 1, 2)));
    datagram.extend(done_message(SEQ));
    acc.feed(&datagram).unwrap();
    assert!(acc.done);
    assert_eq!(acc.parts.len(), 2);
  }

  #[test]
  fn stale_sequence_is_skipped() {
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    let stale = data_message(SEQ - 1, true, |b| attr::put_u32(b, 1, 1));
    acc.feed(&stale).unwrap();
    assert!(acc.parts.is_empty());
    assert!(!acc.done);
  }

  #[test]
  fn ack_means_done_without_data() {
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    acc.feed(&error_message(SEQ, 0)).unwrap();
    assert!(acc.done);
    assert!(acc.parts.is_empty());
  }

  #[test]
  fn enodev_maps_to_not_supported() {
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    let err = acc.feed(&error_message(SEQ, -libc::ENODEV)).unwrap_err();
    assert!(matches!(err, WinfoError::NotSupported));
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    let err = acc.feed(&error_message(SEQ, -libc::EINVAL)).unwrap_err();
    assert!(matches!(err, WinfoError::Protocol(_)));
  }

  #[test]
  fn malformed_header_is_protocol_error() {
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    let mut bad = data_message(SEQ, false, |b| attr::put_u32(b, 1, 1));
    bad[0..4].copy_from_slice(&8u32.to_ne_bytes()); // below NLMSG_HDRLEN
    assert!(acc.feed(&bad).is_err());
  }

  #[test]
  fn oversized_dump_truncates_but_keeps_draining() {
    let mut acc = DumpAccumulator::new(SEQ, FAMILY);
    let big = vec![0u8; 8 * 1024];
    let mut fed = 0usize;
    while fed <= REPLY_BYTE_CAP {
      let part = data_message(SEQ, true, |b| attr::put_bytes(b, 1, &big));
      acc.feed(&part).unwrap();
      fed += big.len();
    }
    assert!(acc.truncated);
    acc.feed(&done_message(SEQ)).unwrap();
    assert!(acc.done);
    // Whatever was stored stays within the cap.
    let stored: usize = acc.parts.iter().map(|p| p.len()).sum();
    assert!(stored <= REPLY_BYTE_CAP);
  }
}

use thiserror::Error;

/// Error type for wireless query operations.
///
/// The split matters to callers: `NotSupported` and `NotFound` are
/// expected outcomes rendered as "unknown" at the display boundary,
/// while `Protocol` means the current operation was aborted and the
/// session may need to reconnect on the next call.
#[derive(Error, Debug)]
pub enum WinfoError {
  /// The driver or device does not implement this operation/attribute.
  #[error("Not supported by this driver or device")]
  NotSupported,
  /// No such interface or physical device.
  #[error("No such wireless interface: {0}")]
  NotFound(String),
  /// Netlink-level failure: family resolution, socket I/O or a
  /// malformed message header.
  #[error("Netlink protocol failure: {0}")]
  Protocol(String),
  /// A malformed attribute or information element.
  #[error("Malformed attribute or element: {0}")]
  Parse(&'static str),
  /// The reply exceeded the accumulation cap and was truncated.
  #[error("Reply exceeded the accumulation limit")]
  BufferOverflow,
}

/// Shorthand result type used throughout the crate.
pub type Result<T> = std::result::Result<T, WinfoError>;

use log::error;
use thiserror::Error;

/// `read_hex_u16` converts a string in sysfs/PCI-id hex format
/// (e.g. `0x14e4` or `14e4`) into a `u16`.
///
/// ## Parameters
///
/// * `s`: the string to attempt to parse.
///
/// ## Returns
///
/// Either a converted `u16` or a `HexParseError`.
///
/// ## Example
///
/// ```rust
/// use winfo_utils::hex_string::read_hex_u16;
/// assert_eq!(read_hex_u16("0x14e4").unwrap(), 0x14e4);
/// ```
pub fn read_hex_u16(s: &str) -> Result<u16, HexParseError> {
  if s.is_empty() {
    return Ok(0);
  }
  let result = u16::from_str_radix(s.trim().trim_start_matches("0x"), 16);
  match result {
    Ok(data) => Ok(data),
    Err(e) => {
      error!("Unable to convert {s} to a u16");
      error!("{:?}", e);
      Err(HexParseError::ParseError)
    }
  }
}

/// `HexParseError` is an error type defining what can go wrong
/// parsing a string into a `u16` hex number.
#[derive(Error, Debug)]
pub enum HexParseError {
  /// The hex string could not be decoded
  #[error("Unable to decode string into valid hex")]
  ParseError,
}

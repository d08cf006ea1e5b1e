//! Collection of utility functions for winfo

#![warn(missing_docs)]

/// ISO 3166-1 country-code display names
pub mod countries;

/// Utilities for handling strings in hex format
pub mod hex_string;

/// Frequency/channel mapping for the 2.4, 5 and 60 GHz bands
pub mod channels;

/// Transmit-power unit conversions (dBm, mW, mBm)
pub mod power;

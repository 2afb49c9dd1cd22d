//! Checksummed string encodings used by address rendering and parsing.

pub mod base58;
pub mod bech32;

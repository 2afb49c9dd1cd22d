//! Base58 and Base58Check encoding.
//!
//! Base58Check strings carry a version byte, an opaque payload and the first
//! four bytes of sha256d(version || payload) as a trailing checksum.

use std::{error, fmt};

use sha2::{Digest, Sha256};

static ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Value of each ASCII byte in base58, or -1 for bytes outside the alphabet.
static DIGITS: [i8; 128] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, 0, 1, 2, 3, 4, 5, 6, 7, 8, -1, -1, -1, -1, -1, -1,
    -1, 9, 10, 11, 12, 13, 14, 15, 16, -1, 17, 18, 19, 20, 21, -1,
    22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, -1, -1, -1, -1, -1,
    -1, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, -1, 44, 45, 46,
    47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, -1, -1, -1, -1, -1,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A byte outside the base58 alphabet (or non-ASCII).
    BadByte(u8),
    /// The embedded checksum does not match the recomputed one.
    BadChecksum,
    /// Decoded data too short to hold a version byte plus the checksum.
    TooShort(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BadByte(b) => write!(f, "invalid base58 character {:#x}", b),
            Error::BadChecksum => write!(f, "base58check checksum mismatch"),
            Error::TooShort(len) => write!(f, "base58check data of length {} too short", len),
        }
    }
}

impl error::Error for Error {}

fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(&first).into()
}

/// Encodes `data` as a base58 string.
pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|b| **b == 0).count();
    // Big-endian base58 digits; 138/100 over-approximates log(256)/log(58).
    let mut digits = vec![0u8; data.len() * 138 / 100 + 1];
    let mut length = 0usize;

    for byte in &data[zeros..] {
        let mut carry = u32::from(*byte);
        for digit in digits[..length].iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits[length] = (carry % 58) as u8;
            length += 1;
            carry /= 58;
        }
    }

    let mut result = String::with_capacity(zeros + length);
    for _ in 0..zeros {
        result.push('1');
    }
    for digit in digits[..length].iter().rev() {
        result.push(char::from(ALPHABET[*digit as usize]));
    }
    result
}

/// Encodes a version byte and payload with the 4-byte sha256d checksum
/// appended, as used by legacy address strings.
pub fn encode_check(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 5);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = sha256d(&data);
    data.extend_from_slice(&checksum[0..4]);
    encode(&data)
}

/// Decodes a base58 string into bytes, rejecting characters outside the
/// alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, Error> {
    let bytes = s.as_bytes();
    let zeros = bytes.iter().take_while(|&&b| b == b'1').count();
    // 733/1000 over-approximates log(58)/log(256).
    let mut b256 = vec![0u8; s.len() * 733 / 1000 + 1];
    let mut length = 0usize;

    for &ch in &bytes[zeros..] {
        let value = match DIGITS.get(ch as usize) {
            Some(&digit) if digit >= 0 => digit as u32,
            _ => return Err(Error::BadByte(ch)),
        };
        let mut carry = value;
        for byte in b256[..length].iter_mut() {
            carry += u32::from(*byte) * 58;
            *byte = (carry % 256) as u8;
            carry /= 256;
        }
        while carry > 0 {
            b256[length] = (carry % 256) as u8;
            length += 1;
            carry /= 256;
        }
    }

    let mut result = Vec::with_capacity(zeros + length);
    result.resize(zeros, 0u8);
    result.extend(b256[..length].iter().rev());
    Ok(result)
}

/// Decodes a base58check string, verifying and stripping the trailing 4-byte
/// checksum. Returns the version byte followed by the payload.
pub fn decode_check(s: &str) -> Result<Vec<u8>, Error> {
    let mut data = decode(s)?;
    if data.len() < 5 {
        return Err(Error::TooShort(data.len()));
    }
    let split = data.len() - 4;
    let checksum = sha256d(&data[..split]);
    if checksum[0..4] != data[split..] {
        return Err(Error::BadChecksum);
    }
    data.truncate(split);
    Ok(data)
}

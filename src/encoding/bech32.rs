//! Bech32 string encoding (BIP-173 flavor, checksum constant 1).
//!
//! A bech32 string is `hrp || '1' || data || checksum` where the data part is
//! a sequence of 5-bit groups rendered in a 32-character alphabet and the
//! checksum is six groups derived from a BCH polymod over the expanded HRP
//! and the data.

use std::{error, fmt};

static CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Value of each ASCII byte in the bech32 alphabet, or -1 if not a member.
static CHARSET_REV: [i8; 128] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    15, -1, 10, 17, 21, 20, 26, 30, 7, 5, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, 29, -1, 24, 13, 25, 9, 8, 23, -1, 18, 22, 31, 27, 19, -1,
    1, 0, 3, 16, 11, 28, 12, 14, 6, 4, 2, -1, -1, -1, -1, -1,
];

const GENERATORS: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];
const CHECKSUM_LENGTH: usize = 6;

/// Protocol cap on the overall string length; inputs longer than this are
/// rejected before any checksum work.
pub const MAX_LENGTH: usize = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Overall string longer than [`MAX_LENGTH`].
    TooLong(usize),
    /// Upper and lower case mixed within one string.
    MixedCase,
    /// No separator character, or an empty HRP / truncated checksum.
    MissingSeparator,
    InvalidHrp,
    /// Character outside the data alphabet or the printable ASCII range.
    InvalidChar(char),
    InvalidChecksum,
    /// Non-zero bits would be dropped while regrouping without padding.
    InvalidPadding,
    /// A group value does not fit in the source bit width.
    InvalidData(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::TooLong(len) => write!(f, "bech32 string of length {} exceeds 90 characters", len),
            Error::MixedCase => write!(f, "bech32 string mixes upper and lower case"),
            Error::MissingSeparator => write!(f, "missing bech32 separator or truncated data part"),
            Error::InvalidHrp => write!(f, "invalid bech32 human-readable part"),
            Error::InvalidChar(c) => write!(f, "invalid bech32 character {:?}", c),
            Error::InvalidChecksum => write!(f, "bech32 checksum mismatch"),
            Error::InvalidPadding => write!(f, "invalid padding while converting bit groups"),
            Error::InvalidData(v) => write!(f, "group value {} out of range", v),
        }
    }
}

impl error::Error for Error {}

/// Decoded HRP and payload. `data` holds 5-bit group values with the
/// checksum groups already verified and stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bech32Data {
    pub hrp: String,
    pub data: Vec<u8>,
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = (chk & 0x01ff_ffff) << 5 ^ u32::from(value);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut expanded = Vec::with_capacity(hrp.len() * 2 + 1);
    for b in hrp.bytes() {
        expanded.push(b >> 5);
    }
    expanded.push(0);
    for b in hrp.bytes() {
        expanded.push(b & 31);
    }
    expanded
}

fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values) == 1
}

fn create_checksum(hrp: &str, data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0; CHECKSUM_LENGTH]);
    let plm = polymod(&values) ^ 1;
    let mut checksum = [0u8; CHECKSUM_LENGTH];
    for (i, group) in checksum.iter_mut().enumerate() {
        *group = ((plm >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}

fn validate_hrp(hrp: &str) -> Result<(), Error> {
    if hrp.is_empty() || hrp.len() > 83 {
        return Err(Error::InvalidHrp);
    }
    for c in hrp.chars() {
        if (c as u32) < 33 || (c as u32) > 126 {
            return Err(Error::InvalidHrp);
        }
    }
    Ok(())
}

/// Encodes pre-converted 5-bit groups under the given (lowercase) HRP,
/// appending the 6-group checksum.
pub fn encode(hrp: &str, data: &[u8]) -> Result<String, Error> {
    validate_hrp(hrp)?;
    let total = hrp.len() + 1 + data.len() + CHECKSUM_LENGTH;
    if total > MAX_LENGTH {
        return Err(Error::TooLong(total));
    }
    let mut encoded = String::with_capacity(total);
    encoded.push_str(hrp);
    encoded.push('1');
    for &group in data.iter().chain(create_checksum(hrp, data).iter()) {
        if group >= 32 {
            return Err(Error::InvalidData(group));
        }
        encoded.push(char::from(CHARSET[group as usize]));
    }
    Ok(encoded)
}

/// Decodes a bech32 string into its HRP and 5-bit data groups, verifying the
/// checksum. Case is normalized to lowercase; mixed case is rejected.
pub fn decode(s: &str) -> Result<Bech32Data, Error> {
    if s.len() > MAX_LENGTH {
        return Err(Error::TooLong(s.len()));
    }
    let mut has_lower = false;
    let mut has_upper = false;
    for c in s.chars() {
        if (c as u32) < 33 || (c as u32) > 126 {
            return Err(Error::InvalidChar(c));
        }
        has_lower |= c.is_ascii_lowercase();
        has_upper |= c.is_ascii_uppercase();
    }
    if has_lower && has_upper {
        return Err(Error::MixedCase);
    }

    let s = s.to_lowercase();
    let separator = s.rfind('1').ok_or(Error::MissingSeparator)?;
    if separator == 0 {
        return Err(Error::InvalidHrp);
    }
    if separator + 1 + CHECKSUM_LENGTH > s.len() {
        return Err(Error::MissingSeparator);
    }
    let hrp = &s[..separator];
    validate_hrp(hrp)?;

    let mut data = Vec::with_capacity(s.len() - separator - 1);
    for c in s[separator + 1..].chars() {
        match CHARSET_REV.get(c as usize) {
            Some(&value) if value >= 0 => data.push(value as u8),
            _ => return Err(Error::InvalidChar(c)),
        }
    }
    if !verify_checksum(hrp, &data) {
        return Err(Error::InvalidChecksum);
    }
    data.truncate(data.len() - CHECKSUM_LENGTH);

    Ok(Bech32Data {
        hrp: hrp.to_string(),
        data,
    })
}

/// Regroups a sequence of `from`-bit values into `to`-bit values.
///
/// With `pad` set, trailing bits are zero-padded into a final group (8→5 for
/// encoding). Without it, leftover bits must be padding-only and fewer than
/// `from` bits, or the input is malformed (5→8 for payload extraction).
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, Error> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let mut result = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        if u32::from(value) >> from != 0 {
            return Err(Error::InvalidData(value));
        }
        acc = (acc << from) | u32::from(value);
        bits += from;
        while bits >= to {
            bits -= to;
            result.push(((acc >> bits) & maxv) as u8);
        }
    }

    if pad {
        if bits > 0 {
            result.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(Error::InvalidPadding);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_strings() {
        // BIP-173 generic test vectors
        for valid in &[
            "A12UEL5L",
            "a12uel5l",
            "abcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw",
            "split1checkupstagehandshakeupstreamerranterredcaperred2y9e3w",
        ] {
            let decoded = decode(valid).unwrap();
            assert!(!decoded.hrp.is_empty());
            // re-encoding the normalized form reproduces the lowercase input
            let encoded = encode(&decoded.hrp, &decoded.data).unwrap();
            assert_eq!(encoded, valid.to_lowercase());
        }
    }

    #[test]
    fn decode_invalid_strings() {
        assert_eq!(decode("pzry9x0s0muk"), Err(Error::MissingSeparator));
        assert_eq!(decode("1pzry9x0s0muk"), Err(Error::InvalidHrp));
        assert_eq!(decode("x1b4n0q5v"), Err(Error::InvalidChar('b')));
        assert_eq!(decode(" 1nwldj5"), Err(Error::InvalidChar(' ')));
        // data part too short to even hold a checksum
        assert_eq!(decode("de1lg7wt"), Err(Error::MissingSeparator));
        // checksum computed over a different case
        assert_eq!(decode("A1G7SGD8"), Err(Error::InvalidChecksum));
        assert_eq!(
            decode("split1checkupstagehandshakeupstreamerranterredcaperred2y9e2w"),
            Err(Error::InvalidChecksum)
        );
        assert_eq!(decode("A12uEL5L"), Err(Error::MixedCase));
        let long =
            "an84characterslonghumanreadablepartthatcontainsthenumber1andtheexcludedcharactersbio1569pvx";
        assert_eq!(decode(long), Err(Error::TooLong(long.len())));
    }

    #[test]
    fn bits_round_trip() {
        let bytes: Vec<u8> = (1..=20).collect();
        let groups = convert_bits(&bytes, 8, 5, true).unwrap();
        assert_eq!(groups.len(), 32);
        assert_eq!(convert_bits(&groups, 5, 8, false).unwrap(), bytes);
    }

    #[test]
    fn bits_padding_rules() {
        // a lone 5-bit group cannot fill a byte
        assert_eq!(convert_bits(&[1], 5, 8, false), Err(Error::InvalidPadding));
        // non-zero padding bits are rejected when pad is disallowed;
        // 19 bytes leave 2 bits that get padded into a 31st group
        let mut groups = convert_bits(&[0xff; 19], 8, 5, true).unwrap();
        assert_eq!(groups.len(), 31);
        assert_eq!(convert_bits(&groups, 5, 8, false).unwrap(), vec![0xff; 19]);
        let last = groups.len() - 1;
        groups[last] |= 1;
        assert_eq!(convert_bits(&groups, 5, 8, false), Err(Error::InvalidPadding));
        // out-of-range group values are rejected
        assert_eq!(convert_bits(&[32], 5, 8, true), Err(Error::InvalidData(32)));
    }

    #[test]
    fn encode_rejects_oversized_output() {
        let data = vec![0u8; 90];
        assert!(matches!(encode("grs", &data), Err(Error::TooLong(_))));
    }
}

//! Wire-format serialization primitives.
//!
//! Everything on the wire is length-prefixed with the compact `VarInt` form
//! and written little-endian. Encoding into in-memory buffers cannot fail for
//! well-formed values; decoding fails on truncated or oversized input.

use std::io::{self, Cursor, Read, Write};
use std::{error, fmt};

/// Maximum size, in bytes, of a vector we are allowed to allocate while
/// decoding, so adversarial length prefixes cannot force huge allocations.
pub const MAX_VEC_SIZE: usize = 4_000_000;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    /// A length prefix asked for more memory than [`MAX_VEC_SIZE`].
    OversizedVectorAllocation {
        requested: usize,
        max: usize,
    },
    /// A VarInt was encoded with more bytes than necessary.
    NonMinimalVarInt,
    ParseFailed(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "I/O error: {}", e),
            Error::OversizedVectorAllocation { requested, max } => write!(
                f,
                "allocation of oversized vector: requested {}, maximum {}",
                requested, max
            ),
            Error::NonMinimalVarInt => write!(f, "non-minimal varint"),
            Error::ParseFailed(msg) => write!(f, "parse failed: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

/// Encodes an object into a fresh byte vector.
pub fn serialize<T: Encodable + ?Sized>(data: &T) -> Vec<u8> {
    let mut encoder = Vec::new();
    let len = data
        .consensus_encode(&mut encoder)
        .expect("writing to a Vec can't fail");
    debug_assert_eq!(len, encoder.len());
    encoder
}

/// Encodes an object into a hex-encoded string.
pub fn serialize_hex<T: Encodable + ?Sized>(data: &T) -> String {
    hex::encode(serialize(data))
}

/// Decodes an object from a byte slice, requiring the whole slice to be
/// consumed.
pub fn deserialize<T: Decodable>(data: &[u8]) -> Result<T, Error> {
    let (rv, consumed) = deserialize_partial(data)?;
    if consumed == data.len() {
        Ok(rv)
    } else {
        Err(Error::ParseFailed("data not consumed entirely when explicitly deserializing"))
    }
}

/// Decodes an object from the front of a byte slice, returning the number of
/// bytes consumed.
pub fn deserialize_partial<T: Decodable>(data: &[u8]) -> Result<(T, usize), Error> {
    let mut decoder = Cursor::new(data);
    let rv = Decodable::consensus_decode(&mut decoder)?;
    Ok((rv, decoder.position() as usize))
}

/// Extension of `Write` for little-endian primitives.
pub trait WriteExt {
    fn emit_u64(&mut self, v: u64) -> Result<(), io::Error>;
    fn emit_u32(&mut self, v: u32) -> Result<(), io::Error>;
    fn emit_u16(&mut self, v: u16) -> Result<(), io::Error>;
    fn emit_u8(&mut self, v: u8) -> Result<(), io::Error>;
    fn emit_slice(&mut self, v: &[u8]) -> Result<(), io::Error>;
}

/// Extension of `Read` for little-endian primitives.
pub trait ReadExt {
    fn read_u64(&mut self) -> Result<u64, Error>;
    fn read_u32(&mut self) -> Result<u32, Error>;
    fn read_u16(&mut self) -> Result<u16, Error>;
    fn read_u8(&mut self) -> Result<u8, Error>;
    fn read_slice(&mut self, slice: &mut [u8]) -> Result<(), Error>;
}

macro_rules! encoder_fn {
    ($name:ident, $val_type:ty) => {
        fn $name(&mut self, v: $val_type) -> Result<(), io::Error> {
            self.write_all(&v.to_le_bytes())
        }
    };
}

macro_rules! decoder_fn {
    ($name:ident, $val_type:ty, $byte_len:expr) => {
        fn $name(&mut self) -> Result<$val_type, Error> {
            let mut val = [0; $byte_len];
            self.read_exact(&mut val[..]).map_err(Error::Io)?;
            Ok(<$val_type>::from_le_bytes(val))
        }
    };
}

impl<W: Write> WriteExt for W {
    encoder_fn!(emit_u64, u64);
    encoder_fn!(emit_u32, u32);
    encoder_fn!(emit_u16, u16);

    fn emit_u8(&mut self, v: u8) -> Result<(), io::Error> {
        self.write_all(&[v])
    }
    fn emit_slice(&mut self, v: &[u8]) -> Result<(), io::Error> {
        self.write_all(v)
    }
}

impl<R: Read> ReadExt for R {
    decoder_fn!(read_u64, u64, 8);
    decoder_fn!(read_u32, u32, 4);
    decoder_fn!(read_u16, u16, 2);

    fn read_u8(&mut self) -> Result<u8, Error> {
        let mut val = [0; 1];
        self.read_exact(&mut val[..]).map_err(Error::Io)?;
        Ok(val[0])
    }
    fn read_slice(&mut self, slice: &mut [u8]) -> Result<(), Error> {
        self.read_exact(slice).map_err(Error::Io)
    }
}

/// Data which can be encoded in the wire format.
pub trait Encodable {
    /// Encodes the object into `writer`, returning the number of bytes
    /// written.
    fn consensus_encode<W: io::Write>(&self, writer: W) -> Result<usize, io::Error>;
}

/// Data which can be decoded from the wire format.
pub trait Decodable: Sized {
    fn consensus_decode<R: io::Read>(reader: R) -> Result<Self, Error>;
}

/// Compact variable-length unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(pub u64);

impl VarInt {
    /// The exact encoded length in bytes, without performing the encode.
    pub fn len(&self) -> usize {
        match self.0 {
            0..=0xFC => 1,
            0xFD..=0xFFFF => 3,
            0x10000..=0xFFFF_FFFF => 5,
            _ => 9,
        }
    }
}

impl Encodable for VarInt {
    fn consensus_encode<W: io::Write>(&self, mut writer: W) -> Result<usize, io::Error> {
        match self.0 {
            0..=0xFC => {
                writer.emit_u8(self.0 as u8)?;
                Ok(1)
            }
            0xFD..=0xFFFF => {
                writer.emit_u8(0xFD)?;
                writer.emit_u16(self.0 as u16)?;
                Ok(3)
            }
            0x10000..=0xFFFF_FFFF => {
                writer.emit_u8(0xFE)?;
                writer.emit_u32(self.0 as u32)?;
                Ok(5)
            }
            _ => {
                writer.emit_u8(0xFF)?;
                writer.emit_u64(self.0)?;
                Ok(9)
            }
        }
    }
}

impl Decodable for VarInt {
    fn consensus_decode<R: io::Read>(mut reader: R) -> Result<Self, Error> {
        let marker = ReadExt::read_u8(&mut reader)?;
        match marker {
            0xFF => {
                let x = ReadExt::read_u64(&mut reader)?;
                if x < 0x1_0000_0000 {
                    Err(Error::NonMinimalVarInt)
                } else {
                    Ok(VarInt(x))
                }
            }
            0xFE => {
                let x = ReadExt::read_u32(&mut reader)?;
                if x < 0x1_0000 {
                    Err(Error::NonMinimalVarInt)
                } else {
                    Ok(VarInt(u64::from(x)))
                }
            }
            0xFD => {
                let x = ReadExt::read_u16(&mut reader)?;
                if x < 0xFD {
                    Err(Error::NonMinimalVarInt)
                } else {
                    Ok(VarInt(u64::from(x)))
                }
            }
            n => Ok(VarInt(u64::from(n))),
        }
    }
}

macro_rules! impl_int_encodable {
    ($ty:ty, $read_fn:ident, $emit_fn:ident) => {
        impl Encodable for $ty {
            fn consensus_encode<W: io::Write>(&self, mut writer: W) -> Result<usize, io::Error> {
                writer.$emit_fn(*self)?;
                Ok(std::mem::size_of::<$ty>())
            }
        }
        impl Decodable for $ty {
            fn consensus_decode<R: io::Read>(mut reader: R) -> Result<Self, Error> {
                ReadExt::$read_fn(&mut reader)
            }
        }
    };
}

impl_int_encodable!(u8, read_u8, emit_u8);
impl_int_encodable!(u16, read_u16, emit_u16);
impl_int_encodable!(u32, read_u32, emit_u32);
impl_int_encodable!(u64, read_u64, emit_u64);

impl Encodable for Vec<u8> {
    fn consensus_encode<W: io::Write>(&self, mut writer: W) -> Result<usize, io::Error> {
        let len = VarInt(self.len() as u64).consensus_encode(&mut writer)?;
        writer.emit_slice(self)?;
        Ok(len + self.len())
    }
}

impl Decodable for Vec<u8> {
    fn consensus_decode<R: io::Read>(mut reader: R) -> Result<Self, Error> {
        let len = VarInt::consensus_decode(&mut reader)?.0 as usize;
        if len > MAX_VEC_SIZE {
            return Err(Error::OversizedVectorAllocation {
                requested: len,
                max: MAX_VEC_SIZE,
            });
        }
        let mut ret = vec![0u8; len];
        reader.read_slice(&mut ret)?;
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_boundary_encodings() {
        assert_eq!(serialize(&VarInt(0)), vec![0u8]);
        assert_eq!(serialize(&VarInt(0xFC)), vec![0xFCu8]);
        assert_eq!(serialize(&VarInt(0xFD)), vec![0xFDu8, 0xFD, 0]);
        assert_eq!(serialize(&VarInt(0xFFF)), vec![0xFDu8, 0xFF, 0xF]);
        assert_eq!(serialize(&VarInt(0xFFFF)), vec![0xFDu8, 0xFF, 0xFF]);
        assert_eq!(serialize(&VarInt(0x10000)), vec![0xFEu8, 0, 0, 1, 0]);
        assert_eq!(
            serialize(&VarInt(0xFFFF_FFFF)),
            vec![0xFEu8, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(
            serialize(&VarInt(0x1_0000_0000)),
            vec![0xFFu8, 0, 0, 0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn varint_len_matches_encoding() {
        for &value in &[
            0u64,
            1,
            0xFC,
            0xFD,
            0xFFFF,
            0x10000,
            0xFFFF_FFFF,
            0x1_0000_0000,
            u64::MAX,
        ] {
            let encoded = serialize(&VarInt(value));
            assert_eq!(VarInt(value).len(), encoded.len());
            assert_eq!(deserialize::<VarInt>(&encoded).unwrap(), VarInt(value));
        }
    }

    #[test]
    fn varint_rejects_non_minimal() {
        assert!(matches!(
            deserialize::<VarInt>(&[0xFD, 0x10, 0x00]),
            Err(Error::NonMinimalVarInt)
        ));
        assert!(matches!(
            deserialize::<VarInt>(&[0xFE, 0xFF, 0xFF, 0x00, 0x00]),
            Err(Error::NonMinimalVarInt)
        ));
        assert!(matches!(
            deserialize::<VarInt>(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]),
            Err(Error::NonMinimalVarInt)
        ));
    }

    #[test]
    fn varint_rejects_truncated_input() {
        assert!(matches!(deserialize::<VarInt>(&[]), Err(Error::Io(_))));
        assert!(matches!(deserialize::<VarInt>(&[0xFD, 0xFD]), Err(Error::Io(_))));
        assert!(matches!(
            deserialize::<VarInt>(&[0xFE, 1, 2, 3]),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn byte_vectors() {
        let data = vec![1u8, 2, 3];
        assert_eq!(serialize(&data), vec![3u8, 1, 2, 3]);
        assert_eq!(deserialize::<Vec<u8>>(&[3u8, 1, 2, 3]).unwrap(), data);
        assert_eq!(serialize_hex(&data), "03010203");
        // leftover bytes are an error for a full deserialize
        assert!(matches!(
            deserialize::<Vec<u8>>(&[1u8, 2, 3]),
            Err(Error::ParseFailed(_))
        ));
        // oversized length prefix is rejected before allocation
        let oversized = serialize(&VarInt((MAX_VEC_SIZE + 1) as u64));
        assert!(matches!(
            deserialize::<Vec<u8>>(&oversized),
            Err(Error::OversizedVectorAllocation { .. })
        ));
    }

    #[test]
    fn little_endian_primitives() {
        assert_eq!(serialize(&0x0102_0304u32), vec![4u8, 3, 2, 1]);
        assert_eq!(deserialize::<u16>(&[0x34, 0x12]).unwrap(), 0x1234);
        assert_eq!(
            deserialize::<u64>(&[1, 0, 0, 0, 0, 0, 0, 0x80]).unwrap(),
            0x8000_0000_0000_0001
        );
    }
}

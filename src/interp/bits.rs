//! Bit-addressed strings and segment codecs.
//!
//! Bits are numbered from the most significant bit of the first byte.
//! Multi-byte integers are assembled big-endian; little-endian segments
//! swap bytes, so they must span whole bytes.

use std::fmt;

use crate::error::InterpError;
use crate::ir::binary::{BinarySpecifier, Endianness};

/// A sequence of bits of any length.
#[derive(Debug, Clone, Default)]
pub struct Bitstring {
    bytes: Vec<u8>,
    len: u64,
}

impl PartialEq for Bitstring {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && (0..self.len).all(|i| self.bit(i) == other.bit(i))
    }
}

impl Bitstring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() as u64 * 8,
        }
    }

    /// Length in bits.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_binary(&self) -> bool {
        self.len % 8 == 0
    }

    /// The contents as bytes, if the length is a whole number of bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if self.is_binary() {
            Some(&self.bytes[..(self.len / 8) as usize])
        } else {
            None
        }
    }

    fn bit(&self, index: u64) -> bool {
        let byte = self.bytes[(index / 8) as usize];
        (byte >> (7 - index % 8)) & 1 == 1
    }

    pub fn push_bit(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (7 - self.len % 8);
        }
        self.len += 1;
    }

    /// Appends the low `bits` bits of `value`, most significant first.
    pub fn push_uint(&mut self, value: u64, bits: u32) {
        for i in (0..bits).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
    }

    pub fn push_bits(&mut self, other: &Bitstring, bits: u64) {
        for i in 0..bits {
            self.push_bit(other.bit(i));
        }
    }

    /// Reads `bits` bits starting at `offset` as an unsigned big-endian
    /// number. `bits` must be at most 64 and the range in bounds.
    fn read_uint(&self, offset: u64, bits: u32) -> u64 {
        (0..bits as u64).fold(0u64, |acc, i| (acc << 1) | self.bit(offset + i) as u64)
    }

    /// Copies `len` bits starting at `offset`.
    pub fn slice(&self, offset: u64, len: u64) -> Bitstring {
        let mut out = Bitstring::new();
        for i in offset..offset + len {
            out.push_bit(self.bit(i));
        }
        out
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<<")?;
        let whole = self.len / 8;
        for i in 0..whole {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", self.bytes[i as usize])?;
        }
        let tail = (self.len % 8) as u32;
        if tail > 0 {
            if whole > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", self.read_uint(whole * 8, tail), tail)?;
        }
        write!(f, ">>")
    }
}

/// A decoded segment value.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Int(i64),
    Float(f64),
    Bits(Bitstring),
}

/// A value to encode.
#[derive(Debug, Clone, Copy)]
pub enum Encodable<'a> {
    Int(i64),
    Float(f64),
    Bits(&'a Bitstring),
}

fn unsupported(detail: impl Into<String>) -> InterpError {
    InterpError::Unsupported {
        detail: detail.into(),
    }
}

fn swap_bytes(value: u64, bits: u32) -> u64 {
    let mut out = 0u64;
    for i in 0..bits / 8 {
        out = (out << 8) | ((value >> (8 * i)) & 0xff);
    }
    out
}

fn integer_bits(value: u64, bits: u32, endianness: Endianness) -> Result<u64, InterpError> {
    match endianness {
        Endianness::Big => Ok(value),
        Endianness::Little if bits % 8 == 0 => Ok(swap_bytes(value, bits)),
        Endianness::Little => Err(unsupported(format!(
            "little-endian segment of {} bits",
            bits
        ))),
        Endianness::Native => Err(unsupported("unresolved native endianness")),
    }
}

/// Decodes the fixed-width segment at `offset`. Returns `None` when the
/// bits do not form a valid value of the segment's type.
pub fn decode(
    spec: &BinarySpecifier,
    src: &Bitstring,
    offset: u64,
    bits: u64,
) -> Result<Option<Decoded>, InterpError> {
    match *spec {
        BinarySpecifier::Integer {
            signed, endianness, ..
        } => {
            if bits > 64 {
                return Err(unsupported(format!("integer segment of {} bits", bits)));
            }
            let n = bits as u32;
            let raw = integer_bits(src.read_uint(offset, n), n, endianness)?;
            let value = if signed && n > 0 && n < 64 && (raw >> (n - 1)) & 1 == 1 {
                (raw | (!0u64 << n)) as i64
            } else {
                raw as i64
            };
            Ok(Some(Decoded::Int(value)))
        }
        BinarySpecifier::Float { endianness, .. } => {
            let value = match bits {
                32 => {
                    let raw = integer_bits(src.read_uint(offset, 32), 32, endianness)?;
                    f32::from_bits(raw as u32) as f64
                }
                64 => {
                    let raw = integer_bits(src.read_uint(offset, 64), 64, endianness)?;
                    f64::from_bits(raw)
                }
                _ => return Ok(None),
            };
            if value.is_finite() {
                Ok(Some(Decoded::Float(value)))
            } else {
                Ok(None)
            }
        }
        BinarySpecifier::Bytes { .. } if bits % 8 != 0 => Ok(None),
        BinarySpecifier::Bytes { .. } | BinarySpecifier::Bits { .. } => {
            Ok(Some(Decoded::Bits(src.slice(offset, bits))))
        }
        BinarySpecifier::Utf8 | BinarySpecifier::Utf16 { .. } | BinarySpecifier::Utf32 { .. } => {
            Err(unsupported("code point segment decoded with a fixed width"))
        }
    }
}

/// Decodes one code point at `offset`. Returns the code point and the
/// number of bits it occupied, or `None` for invalid or truncated input.
pub fn decode_code_point(
    spec: &BinarySpecifier,
    src: &Bitstring,
    offset: u64,
) -> Result<Option<(i64, u64)>, InterpError> {
    let remaining = src.len() - offset;
    let unit_at = |i: u64, bits: u32, endianness: Endianness| -> Result<Option<u64>, InterpError> {
        let start = offset + i * bits as u64;
        if start + bits as u64 > src.len() {
            return Ok(None);
        }
        integer_bits(src.read_uint(start, bits), bits, endianness).map(Some)
    };
    let (cp, used) = match *spec {
        BinarySpecifier::Utf8 => {
            if remaining < 8 {
                return Ok(None);
            }
            let b0 = src.read_uint(offset, 8);
            let (len, init) = match b0 {
                0x00..=0x7f => (1, b0),
                0xc2..=0xdf => (2, b0 & 0x1f),
                0xe0..=0xef => (3, b0 & 0x0f),
                0xf0..=0xf4 => (4, b0 & 0x07),
                _ => return Ok(None),
            };
            if remaining < len * 8 {
                return Ok(None);
            }
            let mut cp = init;
            for i in 1..len {
                let b = src.read_uint(offset + i * 8, 8);
                if b & 0xc0 != 0x80 {
                    return Ok(None);
                }
                cp = (cp << 6) | (b & 0x3f);
            }
            let min = [0, 0, 0x80, 0x800, 0x10000][len as usize];
            if cp < min {
                return Ok(None);
            }
            (cp, len * 8)
        }
        BinarySpecifier::Utf16 { endianness } => {
            let Some(hi) = unit_at(0, 16, endianness)? else {
                return Ok(None);
            };
            match hi {
                0xd800..=0xdbff => {
                    let Some(lo) = unit_at(1, 16, endianness)? else {
                        return Ok(None);
                    };
                    if !(0xdc00..=0xdfff).contains(&lo) {
                        return Ok(None);
                    }
                    (0x10000 + ((hi - 0xd800) << 10) + (lo - 0xdc00), 32)
                }
                0xdc00..=0xdfff => return Ok(None),
                _ => (hi, 16),
            }
        }
        BinarySpecifier::Utf32 { endianness } => {
            let Some(cp) = unit_at(0, 32, endianness)? else {
                return Ok(None);
            };
            (cp, 32)
        }
        _ => return Err(unsupported("fixed-width segment decoded as a code point")),
    };
    match char::from_u32(cp as u32) {
        Some(_) if cp <= u32::MAX as u64 => Ok(Some((cp as i64, used))),
        _ => Ok(None),
    }
}

/// Appends `value` to `dst` as a fixed-width segment of `bits` bits.
/// Returns `false` when the value cannot be encoded that way.
pub fn encode(
    spec: &BinarySpecifier,
    value: Encodable<'_>,
    bits: u64,
    dst: &mut Bitstring,
) -> Result<bool, InterpError> {
    match (*spec, value) {
        (BinarySpecifier::Integer { endianness, .. }, Encodable::Int(n)) => {
            if bits > 64 {
                return Err(unsupported(format!("integer segment of {} bits", bits)));
            }
            let b = bits as u32;
            let mask = if b == 64 { !0u64 } else { (1u64 << b) - 1 };
            let raw = integer_bits(n as u64 & mask, b, endianness)?;
            dst.push_uint(raw, b);
            Ok(true)
        }
        (BinarySpecifier::Float { endianness, .. }, Encodable::Int(_) | Encodable::Float(_)) => {
            let x = match value {
                Encodable::Int(n) => n as f64,
                Encodable::Float(x) => x,
                Encodable::Bits(_) => return Ok(false),
            };
            match bits {
                32 => {
                    let raw = integer_bits((x as f32).to_bits() as u64, 32, endianness)?;
                    dst.push_uint(raw, 32);
                }
                64 => {
                    let raw = integer_bits(x.to_bits(), 64, endianness)?;
                    dst.push_uint(raw, 64);
                }
                _ => return Ok(false),
            }
            Ok(true)
        }
        (BinarySpecifier::Bytes { .. }, Encodable::Bits(src)) if !src.is_binary() || bits % 8 != 0 => {
            Ok(false)
        }
        (BinarySpecifier::Bytes { .. } | BinarySpecifier::Bits { .. }, Encodable::Bits(src)) => {
            if src.len() < bits {
                return Ok(false);
            }
            dst.push_bits(src, bits);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Appends `cp` in the specifier's UTF encoding. Returns `false` for
/// values that are not Unicode scalar values.
pub fn encode_code_point(
    spec: &BinarySpecifier,
    cp: i64,
    dst: &mut Bitstring,
) -> Result<bool, InterpError> {
    let Some(ch) = u32::try_from(cp).ok().and_then(char::from_u32) else {
        return Ok(false);
    };
    match *spec {
        BinarySpecifier::Utf8 => {
            let mut buf = [0u8; 4];
            for b in ch.encode_utf8(&mut buf).bytes() {
                dst.push_uint(b as u64, 8);
            }
        }
        BinarySpecifier::Utf16 { endianness } => {
            let mut buf = [0u16; 2];
            for unit in ch.encode_utf16(&mut buf).iter() {
                dst.push_uint(integer_bits(*unit as u64, 16, endianness)?, 16);
            }
        }
        BinarySpecifier::Utf32 { endianness } => {
            dst.push_uint(integer_bits(ch as u64, 32, endianness)?, 32);
        }
        _ => return Err(unsupported("fixed-width segment encoded as a code point")),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_slice_unaligned() {
        let mut b = Bitstring::new();
        b.push_uint(0b101, 3);
        b.push_uint(0xff, 8);
        assert_eq!(b.len(), 11);
        assert_eq!(b.slice(3, 8), Bitstring::from_bytes(&[0xff]));
        assert_eq!(b.to_string(), "<<191,7:3>>");
    }

    #[test]
    fn signed_little_endian_integer() {
        let src = Bitstring::from_bytes(&[0xfe, 0xff]);
        let spec = BinarySpecifier::Integer {
            signed: true,
            endianness: Endianness::Little,
            unit: 1,
        };
        assert_eq!(decode(&spec, &src, 0, 16).unwrap(), Some(Decoded::Int(-2)));
    }

    #[test]
    fn utf16_surrogate_pair() {
        let spec = BinarySpecifier::Utf16 {
            endianness: Endianness::Big,
        };
        let mut b = Bitstring::new();
        assert!(encode_code_point(&spec, 0x1f600, &mut b).unwrap());
        assert_eq!(b.len(), 32);
        assert_eq!(decode_code_point(&spec, &b, 0).unwrap(), Some((0x1f600, 32)));
    }
}

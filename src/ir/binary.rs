//! Bit-level segment descriptors.
//!
//! A `BinarySpecifier` says how one segment of a bitstring is decoded or
//! encoded. Combined with an optional size it yields a `SegmentWidth`, the
//! number of bits the segment occupies. Both the match and construction
//! lowerings consume the pair as a `Segment`.

use std::fmt;

use serde::Deserialize;

use crate::error::LowerError;
use crate::ir::value::ValueId;

/// Largest unit a segment may declare.
pub const MAX_UNIT: u32 = 256;

/// Byte order of a multi-byte segment.
///
/// The discriminants are part of the boundary ABI.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Big = 0,
    Little = 1,
    Native = 2,
}

impl Endianness {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Endianness::Big),
            1 => Some(Endianness::Little),
            2 => Some(Endianness::Native),
            _ => None,
        }
    }

    /// Replaces `Native` with the target's byte order.
    pub fn resolve(self, target: Endianness) -> Endianness {
        match self {
            Endianness::Native => target,
            other => other,
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Big => f.write_str("big"),
            Endianness::Little => f.write_str("little"),
            Endianness::Native => f.write_str("native"),
        }
    }
}

/// Segment type tag. The discriminants are part of the boundary ABI.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecifierTag {
    Integer = 0,
    Float = 1,
    Bytes = 2,
    Bits = 3,
    Utf8 = 4,
    Utf16 = 5,
    Utf32 = 6,
}

impl SpecifierTag {
    pub fn from_raw(raw: u32) -> Option<Self> {
        let tag = match raw {
            0 => SpecifierTag::Integer,
            1 => SpecifierTag::Float,
            2 => SpecifierTag::Bytes,
            3 => SpecifierTag::Bits,
            4 => SpecifierTag::Utf8,
            5 => SpecifierTag::Utf16,
            6 => SpecifierTag::Utf32,
            _ => return None,
        };
        Some(tag)
    }
}

/// Decode/encode rule for one segment.
///
/// Each variant carries exactly the fields its tag licenses: a `Bytes`
/// segment has no signedness, a UTF segment has no unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySpecifier {
    Integer {
        signed: bool,
        endianness: Endianness,
        unit: u32,
    },
    Float {
        endianness: Endianness,
        unit: u32,
    },
    Bytes {
        unit: u32,
    },
    Bits {
        unit: u32,
    },
    Utf8,
    Utf16 {
        endianness: Endianness,
    },
    Utf32 {
        endianness: Endianness,
    },
}

/// How many bits a segment occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentWidth {
    /// Known at compile time.
    Fixed(u64),
    /// `unit * size`, where `size` is a term evaluated at run time and must
    /// be a non-negative integer.
    Dynamic { size: ValueId, unit: u32 },
    /// Everything left in the bitstring; the remainder must be a multiple
    /// of `unit`.
    Rest { unit: u32 },
    /// One code point in the specifier's UTF encoding.
    CodePoint,
}

impl SegmentWidth {
    pub fn fixed_bits(&self) -> Option<u64> {
        match self {
            SegmentWidth::Fixed(bits) => Some(*bits),
            _ => None,
        }
    }

    pub fn size_operand(&self) -> Option<ValueId> {
        match self {
            SegmentWidth::Dynamic { size, .. } => Some(*size),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentWidth::Fixed(bits) => write!(f, "{}", bits),
            SegmentWidth::Dynamic { size, unit } => write!(f, "{}*{}", size, unit),
            SegmentWidth::Rest { unit } => write!(f, "rest/{}", unit),
            SegmentWidth::CodePoint => f.write_str("codepoint"),
        }
    }
}

/// The size given to a segment, after constant resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSize {
    Const(u64),
    Value(ValueId),
}

/// A specifier paired with its resolved width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub spec: BinarySpecifier,
    pub width: SegmentWidth,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.spec, self.width)
    }
}

fn check_unit(unit: u32) -> Result<u32, LowerError> {
    if unit == 0 || unit > MAX_UNIT {
        return Err(LowerError::InvalidUnit { unit: unit as i64 });
    }
    Ok(unit)
}

impl BinarySpecifier {
    pub fn integer(signed: bool, endianness: Endianness, unit: u32) -> Result<Self, LowerError> {
        Ok(BinarySpecifier::Integer {
            signed,
            endianness,
            unit: check_unit(unit)?,
        })
    }

    pub fn float(endianness: Endianness, unit: u32) -> Result<Self, LowerError> {
        Ok(BinarySpecifier::Float {
            endianness,
            unit: check_unit(unit)?,
        })
    }

    pub fn bytes(unit: u32) -> Result<Self, LowerError> {
        Ok(BinarySpecifier::Bytes {
            unit: check_unit(unit)?,
        })
    }

    pub fn bits(unit: u32) -> Result<Self, LowerError> {
        Ok(BinarySpecifier::Bits {
            unit: check_unit(unit)?,
        })
    }

    pub fn tag(&self) -> SpecifierTag {
        match self {
            BinarySpecifier::Integer { .. } => SpecifierTag::Integer,
            BinarySpecifier::Float { .. } => SpecifierTag::Float,
            BinarySpecifier::Bytes { .. } => SpecifierTag::Bytes,
            BinarySpecifier::Bits { .. } => SpecifierTag::Bits,
            BinarySpecifier::Utf8 => SpecifierTag::Utf8,
            BinarySpecifier::Utf16 { .. } => SpecifierTag::Utf16,
            BinarySpecifier::Utf32 { .. } => SpecifierTag::Utf32,
        }
    }

    /// The bit-width multiplier, absent for UTF segments.
    pub fn unit(&self) -> Option<u32> {
        match self {
            BinarySpecifier::Integer { unit, .. }
            | BinarySpecifier::Float { unit, .. }
            | BinarySpecifier::Bytes { unit }
            | BinarySpecifier::Bits { unit } => Some(*unit),
            BinarySpecifier::Utf8 | BinarySpecifier::Utf16 { .. } | BinarySpecifier::Utf32 { .. } => {
                None
            }
        }
    }

    pub fn endianness(&self) -> Option<Endianness> {
        match self {
            BinarySpecifier::Integer { endianness, .. }
            | BinarySpecifier::Float { endianness, .. }
            | BinarySpecifier::Utf16 { endianness }
            | BinarySpecifier::Utf32 { endianness } => Some(*endianness),
            BinarySpecifier::Bytes { .. } | BinarySpecifier::Bits { .. } | BinarySpecifier::Utf8 => {
                None
            }
        }
    }

    /// Width in size units when no size is given, `None` when the segment
    /// consumes the rest of the input.
    pub fn default_size(&self) -> Option<u64> {
        match self {
            BinarySpecifier::Integer { .. } => Some(8),
            BinarySpecifier::Float { .. } => Some(64),
            _ => None,
        }
    }

    pub fn is_utf(&self) -> bool {
        matches!(
            self,
            BinarySpecifier::Utf8 | BinarySpecifier::Utf16 { .. } | BinarySpecifier::Utf32 { .. }
        )
    }

    /// Replaces `Native` endianness with the target byte order.
    pub fn resolve_native(self, target: Endianness) -> Self {
        match self {
            BinarySpecifier::Integer {
                signed,
                endianness,
                unit,
            } => BinarySpecifier::Integer {
                signed,
                endianness: endianness.resolve(target),
                unit,
            },
            BinarySpecifier::Float { endianness, unit } => BinarySpecifier::Float {
                endianness: endianness.resolve(target),
                unit,
            },
            BinarySpecifier::Utf16 { endianness } => BinarySpecifier::Utf16 {
                endianness: endianness.resolve(target),
            },
            BinarySpecifier::Utf32 { endianness } => BinarySpecifier::Utf32 {
                endianness: endianness.resolve(target),
            },
            other => other,
        }
    }

    /// Computes how many bits this segment occupies for the given size.
    ///
    /// The width depends only on the tag, unit and size, never on
    /// endianness or signedness.
    pub fn width(&self, size: Option<SegmentSize>) -> Result<SegmentWidth, LowerError> {
        let Some(unit) = self.unit() else {
            if size.is_some() {
                return Err(LowerError::SizeOnUtf { tag: self.tag() });
            }
            return Ok(SegmentWidth::CodePoint);
        };
        let unit64 = unit as u64;
        let width = match size {
            Some(SegmentSize::Const(n)) => {
                let bits = n.checked_mul(unit64).ok_or(LowerError::SegmentTooLarge { size: n, unit })?;
                SegmentWidth::Fixed(bits)
            }
            Some(SegmentSize::Value(size)) => SegmentWidth::Dynamic { size, unit },
            None => match self.default_size() {
                Some(n) => SegmentWidth::Fixed(n * unit64),
                None => SegmentWidth::Rest { unit },
            },
        };
        Ok(width)
    }

    /// Builds a `Segment` for this specifier.
    pub fn segment(&self, size: Option<SegmentSize>) -> Result<Segment, LowerError> {
        Ok(Segment {
            spec: *self,
            width: self.width(size)?,
        })
    }
}

impl fmt::Display for BinarySpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinarySpecifier::Integer {
                signed,
                endianness,
                unit,
            } => {
                let sign = if *signed { "signed" } else { "unsigned" };
                write!(f, "integer-{}-{}-unit:{}", sign, endianness, unit)
            }
            BinarySpecifier::Float { endianness, unit } => {
                write!(f, "float-{}-unit:{}", endianness, unit)
            }
            BinarySpecifier::Bytes { unit } => write!(f, "binary-unit:{}", unit),
            BinarySpecifier::Bits { unit } => write!(f, "bits-unit:{}", unit),
            BinarySpecifier::Utf8 => f.write_str("utf8"),
            BinarySpecifier::Utf16 { endianness } => write!(f, "utf16-{}", endianness),
            BinarySpecifier::Utf32 { endianness } => write!(f, "utf32-{}", endianness),
        }
    }
}

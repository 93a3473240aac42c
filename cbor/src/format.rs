/*!
Wire format definitions shared by the writer and the reader.
*/

use core::fmt;

/// The default bound on simultaneously open arrays and maps while writing.
pub const DEFAULT_MAX_NESTING: usize = 8;

const MAJOR_MASK: u8 = 0xE0;
const MINOR_MASK: u8 = 0x1F;

/// The major type of a CBOR item, as found in the top 3 bits of its leading byte.
///
/// The discriminant is the bit pattern itself, so it can be OR-ed straight
/// onto a length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MajorType {
    Unsigned = 0x00,
    /// Never written, and rejected by every typed read.
    NegativeInteger = 0x20,
    ByteString = 0x40,
    TextString = 0x60,
    Array = 0x80,
    Map = 0xA0,
    /// Never written, and rejected by every typed read.
    Tag = 0xC0,
    Simple = 0xE0,
}

impl MajorType {
    /// Extracts the major type of a descriptor byte.
    pub const fn of(descriptor: u8) -> Self {
        match descriptor & MAJOR_MASK {
            0x00 => Self::Unsigned,
            0x20 => Self::NegativeInteger,
            0x40 => Self::ByteString,
            0x60 => Self::TextString,
            0x80 => Self::Array,
            0xA0 => Self::Map,
            0xC0 => Self::Tag,
            _ => Self::Simple,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MajorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unsigned => "Unsigned Integer",
            Self::NegativeInteger => "Negative Integer",
            Self::ByteString => "Byte String",
            Self::TextString => "Text String",
            Self::Array => "Array",
            Self::Map => "Map",
            Self::Tag => "Tag",
            Self::Simple => "Simple Value",
        })
    }
}

/// Low 5 bits of a descriptor byte.
pub(crate) const fn minor(descriptor: u8) -> u8 {
    descriptor & MINOR_MASK
}

/// The extension width code held in the low 5 bits of a descriptor byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Width {
    One = 0x18,
    Two = 0x19,
    Four = 0x1A,
    Eight = 0x1B,
}

impl Width {
    pub const fn from_minor(minor: u8) -> Option<Self> {
        match minor {
            0x18 => Some(Self::One),
            0x19 => Some(Self::Two),
            0x1A => Some(Self::Four),
            0x1B => Some(Self::Eight),
            _ => None,
        }
    }

    /// The narrowest width able to hold `value`, or `None` if it fits in the
    /// descriptor byte itself.
    pub const fn minimal(value: u64) -> Option<Self> {
        if value < Self::One as u64 {
            None
        } else if value <= u8::MAX as u64 {
            Some(Self::One)
        } else if value <= u16::MAX as u64 {
            Some(Self::Two)
        } else if value <= u32::MAX as u64 {
            Some(Self::Four)
        } else {
            Some(Self::Eight)
        }
    }

    /// Number of big-endian bytes following the descriptor.
    pub const fn extra_bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }
}

/// A simple value (major type 7) as a raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Simple {
    False,
    True,
    Null,
    Undefined,
    /// Any other byte found where a simple value was expected.
    Other(u8),
}

impl Simple {
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::False => Some(false),
            Self::True => Some(true),
            _ => None,
        }
    }
}

impl From<u8> for Simple {
    fn from(value: u8) -> Self {
        match value {
            0xF4 => Self::False,
            0xF5 => Self::True,
            0xF6 => Self::Null,
            0xF7 => Self::Undefined,
            other => Self::Other(other),
        }
    }
}

impl From<Simple> for u8 {
    fn from(value: Simple) -> Self {
        match value {
            Simple::False => 0xF4,
            Simple::True => 0xF5,
            Simple::Null => 0xF6,
            Simple::Undefined => 0xF7,
            Simple::Other(b) => b,
        }
    }
}

impl From<bool> for Simple {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

/// Encoded size of an unsigned integer, or of any length/count prefix.
pub const fn unsigned_size(value: u64) -> usize {
    match Width::minimal(value) {
        None => 1,
        Some(w) => 1 + w.extra_bytes(),
    }
}

/// Encoded size of a byte or text string of `len` bytes.
pub const fn byte_string_size(len: usize) -> usize {
    unsigned_size(len as u64) + len
}

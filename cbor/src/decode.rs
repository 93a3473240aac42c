/*!
Forward CBOR reader over a borrowed buffer.

The reader keeps no nesting state: [`Reader::read_array`] and
[`Reader::read_map`] return the declared count, and the caller must then read
exactly that many items (twice as many for a map). A failed read may have
consumed part of the item, so reading should stop at the first error.
*/

use super::format::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Not enough data for encoded value")]
    NotEnoughData,

    #[error("Invalid minor-type value {0}")]
    InvalidMinorValue(u8),

    #[error("Incorrect type, expecting {expected}, found {found}")]
    IncorrectType {
        expected: MajorType,
        found: MajorType,
    },

    #[error("Value {0} is too large for this platform")]
    TooLarge(u64),

    #[error("Unexpected simple value {0:#04x}")]
    UnexpectedSimple(u8),
}

pub trait FromCbor<'a>: Sized {
    fn from_cbor(reader: &mut Reader<'a>) -> Result<Self, Error>;
}

#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Stops reading, returning the bytes that have not been consumed.
    pub fn finish(self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// The major type of the next item, without consuming anything.
    pub fn peek_major_type(&self) -> Option<MajorType> {
        self.data.get(self.offset).map(|b| MajorType::of(*b))
    }

    fn expect(&self, expected: MajorType) -> Result<(), Error> {
        match self.peek_major_type() {
            None => Err(Error::NotEnoughData),
            Some(found) if found == expected => Ok(()),
            Some(found) => {
                trace!("Expected CBOR {expected} at offset {}, found {found}", self.offset);
                Err(Error::IncorrectType { expected, found })
            }
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if len > self.remaining() {
            trace!(
                "CBOR item needs {len} bytes at offset {}, only {} remain",
                self.offset,
                self.remaining()
            );
            return Err(Error::NotEnoughData);
        }
        let data = self.data;
        let bytes = &data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    /// Reads the argument of the next item, whatever its major type.
    ///
    /// Any of the four extension widths is accepted, even where a narrower
    /// one would do. Values below 24 are reported as [`Width::One`], the
    /// whole item being a single byte. The descriptor is consumed even when
    /// the extension bytes turn out to be missing or invalid.
    pub fn read_unsigned(&mut self) -> Result<(u64, Width), Error> {
        let descriptor = self.take(1)?[0];
        let minor = super::format::minor(descriptor);
        if minor < Width::One as u8 {
            return Ok((minor as u64, Width::One));
        }
        let Some(width) = Width::from_minor(minor) else {
            trace!("Invalid CBOR minor value {minor} at offset {}", self.offset - 1);
            return Err(Error::InvalidMinorValue(minor));
        };
        let value = self
            .take(width.extra_bytes())?
            .iter()
            .fold(0u64, |v, b| (v << 8) | *b as u64);
        Ok((value, width))
    }

    fn read_length(&mut self) -> Result<usize, Error> {
        let (len, _) = self.read_unsigned()?;
        usize::try_from(len).map_err(|_| Error::TooLarge(len))
    }

    fn read_string(&mut self, major: MajorType) -> Result<&'a [u8], Error> {
        self.expect(major)?;
        let len = self.read_length()?;
        self.take(len)
    }

    /// Reads a byte string, borrowing its content from the input.
    pub fn read_data(&mut self) -> Result<&'a [u8], Error> {
        self.read_string(MajorType::ByteString)
    }

    /// Reads a text string, borrowing its content from the input.
    ///
    /// The content is returned as bytes, it is not checked to be UTF-8.
    pub fn read_text(&mut self) -> Result<&'a [u8], Error> {
        self.read_string(MajorType::TextString)
    }

    /// Reads the element count of an array.
    ///
    /// The count is not checked against the remaining input.
    pub fn read_array(&mut self) -> Result<usize, Error> {
        self.expect(MajorType::Array)?;
        self.read_length()
    }

    /// Reads the number of key/value pairs of a map.
    ///
    /// The count is not checked against the remaining input.
    pub fn read_map(&mut self) -> Result<usize, Error> {
        self.expect(MajorType::Map)?;
        self.read_length()
    }

    /// Consumes the next byte as a simple value, whatever it is.
    pub fn read_simple(&mut self) -> Result<Simple, Error> {
        Ok(self.take(1)?[0].into())
    }

    pub fn read<T>(&mut self) -> Result<T, Error>
    where
        T: FromCbor<'a>,
    {
        T::from_cbor(self)
    }
}

impl<'a> FromCbor<'a> for u64 {
    fn from_cbor(reader: &mut Reader<'a>) -> Result<Self, Error> {
        reader.expect(MajorType::Unsigned)?;
        reader.read_unsigned().map(|(v, _)| v)
    }
}

macro_rules! impl_uint_from_cbor {
    ($($ty:ty),*) => {
        $(
            impl<'a> FromCbor<'a> for $ty {
                fn from_cbor(reader: &mut Reader<'a>) -> Result<Self, Error> {
                    let v = reader.read::<u64>()?;
                    v.try_into().map_err(|_| Error::TooLarge(v))
                }
            }
        )*
    };
}

impl_uint_from_cbor!(u8, u16, u32, usize);

impl<'a> FromCbor<'a> for bool {
    fn from_cbor(reader: &mut Reader<'a>) -> Result<Self, Error> {
        reader.expect(MajorType::Simple)?;
        match reader.read_simple()? {
            Simple::False => Ok(false),
            Simple::True => Ok(true),
            other => Err(Error::UnexpectedSimple(other.into())),
        }
    }
}

impl<'a> FromCbor<'a> for &'a [u8] {
    fn from_cbor(reader: &mut Reader<'a>) -> Result<Self, Error> {
        reader.read_data()
    }
}

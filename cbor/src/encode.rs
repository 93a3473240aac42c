/*!
Backward-filling CBOR writer.

Items are prepended: the last item in read order is written first, and a
container is wrapped only after all of its members have been written. Every
failure is sticky, so a long chain of calls needs a single check on
[`Writer::finish`].

```
use tiny_cbor::encode::Writer;

let mut buffer = [0u8; 16];
let mut writer = Writer::new(&mut buffer);
writer
    .open_array()
    .prepend_unsigned(123)
    .prepend_data(&[0x0A, 0x0B, 0x0C])
    .wrap_array();
assert_eq!(
    writer.finish().unwrap(),
    &[0x82, 0x43, 0x0A, 0x0B, 0x0C, 0x18, 0x7B]
);
```
*/

use super::format::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Maximum nesting depth of {0} exceeded")]
    NestingTooDeep(usize),

    #[error("No open array or map to wrap")]
    NoOpenContainer,

    #[error("Map has a key without a value")]
    UnmatchedMapKey,

    #[error("{0} arrays or maps have not been wrapped")]
    UnclosedContainers(usize),
}

pub trait ToCbor {
    fn to_cbor<const MAX_NESTING: usize>(&self, writer: &mut Writer<'_, MAX_NESTING>);
}

/// Writes CBOR into the tail of a caller-supplied buffer.
///
/// `MAX_NESTING` bounds how many arrays and maps may be open at once.
pub struct Writer<'a, const MAX_NESTING: usize = DEFAULT_MAX_NESTING> {
    buffer: &'a mut [u8],
    head: usize,
    depth: usize,
    items: [usize; MAX_NESTING],
    error: Option<Error>,
}

impl<'a> Writer<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self::with_max_nesting(buffer)
    }
}

impl<'a, const MAX_NESTING: usize> Writer<'a, MAX_NESTING> {
    pub fn with_max_nesting(buffer: &'a mut [u8]) -> Self {
        Self {
            head: buffer.len(),
            buffer,
            depth: 0,
            items: [0; MAX_NESTING],
            error: None,
        }
    }

    /// Completes the output, returning the written bytes in read order.
    ///
    /// Fails with the first error encountered, or if any array or map is
    /// still open.
    pub fn finish(self) -> Result<&'a mut [u8], Error> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.depth != 0 {
            debug!("CBOR writer finished with {} open containers", self.depth);
            return Err(Error::UnclosedContainers(self.depth));
        }
        let Self { buffer, head, .. } = self;
        Ok(&mut buffer[head..])
    }

    /// Index of the first written byte, or `None` once the writer has failed.
    pub fn position(&self) -> Option<usize> {
        match self.error {
            Some(_) => None,
            None => Some(self.head),
        }
    }

    /// Free space in front of the written bytes.
    pub fn available(&self) -> usize {
        match self.error {
            Some(_) => 0,
            None => self.head,
        }
    }

    /// Number of currently open arrays and maps.
    ///
    /// Frozen once the writer has failed.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            debug!("CBOR writer failed: {error}");
            self.error = Some(error);
        }
    }

    fn reserve(&mut self, len: usize) -> Option<&mut [u8]> {
        if self.error.is_some() {
            return None;
        }
        if len > self.head {
            self.fail(Error::BufferTooSmall {
                needed: len,
                available: self.head,
            });
            return None;
        }
        self.head -= len;
        Some(&mut self.buffer[self.head..self.head + len])
    }

    fn count_item(&mut self) {
        if let Some(top) = self.depth.checked_sub(1) {
            self.items[top] += 1;
        }
    }

    fn write_unsigned(&mut self, value: u64) -> bool {
        let (descriptor, extra) = match Width::minimal(value) {
            None => (value as u8, 0),
            Some(width) => (width as u8, width.extra_bytes()),
        };
        let Some(slot) = self.reserve(1 + extra) else {
            return false;
        };
        slot[0] = descriptor;
        slot[1..].copy_from_slice(&value.to_be_bytes()[8 - extra..]);
        true
    }

    /// Writes `value` as an unsigned integer, then ORs `major` onto its first byte.
    ///
    /// Relies on `write_unsigned` never setting any of the top 3 bits.
    fn write_head(&mut self, major: MajorType, value: u64) {
        if self.write_unsigned(value) {
            self.buffer[self.head] |= major.bits();
        }
    }

    fn write_simple(&mut self, value: Simple) {
        if let Some(slot) = self.reserve(1) {
            slot[0] = value.into();
        }
    }

    /// Prepends bytes without counting them as an item of the open container.
    pub fn prepend_raw(&mut self, bytes: &[u8]) -> &mut Self {
        if let Some(slot) = self.reserve(bytes.len()) {
            slot.copy_from_slice(bytes);
        }
        self
    }

    /// Prepends an already encoded CBOR item.
    pub fn prepend_object(&mut self, object: &[u8]) -> &mut Self {
        self.prepend_raw(object);
        self.count_item();
        self
    }

    pub fn prepend_unsigned(&mut self, value: u64) -> &mut Self {
        self.write_unsigned(value);
        self.count_item();
        self
    }

    /// Wraps the `data_size` bytes in front of which the writer currently
    /// stands into a byte string.
    ///
    /// The wrapped bytes should have been written with [`Self::prepend_raw`],
    /// as anything written with a counting call is already an item.
    pub fn wrap_data(&mut self, data_size: usize) -> &mut Self {
        self.write_head(MajorType::ByteString, data_size as u64);
        self.count_item();
        self
    }

    pub fn prepend_data(&mut self, data: &[u8]) -> &mut Self {
        self.prepend_raw(data);
        self.wrap_data(data.len())
    }

    /// Prepends a text string. The content is not checked to be UTF-8.
    pub fn prepend_text<T>(&mut self, text: &T) -> &mut Self
    where
        T: AsRef<[u8]> + ?Sized,
    {
        let text = text.as_ref();
        self.prepend_raw(text);
        self.write_head(MajorType::TextString, text.len() as u64);
        self.count_item();
        self
    }

    /// Starts collecting the items prepended from now on into an array.
    pub fn open_array(&mut self) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.depth == MAX_NESTING {
            self.fail(Error::NestingTooDeep(MAX_NESTING));
        } else {
            self.items[self.depth] = 0;
            self.depth += 1;
        }
        self
    }

    /// Prefixes the innermost open array with its length and closes it.
    pub fn wrap_array(&mut self) -> &mut Self {
        self.wrap(MajorType::Array)
    }

    /// Starts collecting the items prepended from now on into a map.
    ///
    /// Values must be prepended before their keys.
    pub fn open_map(&mut self) -> &mut Self {
        self.open_array()
    }

    /// Prefixes the innermost open map with its pair count and closes it.
    pub fn wrap_map(&mut self) -> &mut Self {
        self.wrap(MajorType::Map)
    }

    fn wrap(&mut self, major: MajorType) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        let Some(top) = self.depth.checked_sub(1) else {
            self.fail(Error::NoOpenContainer);
            return self;
        };
        let mut count = self.items[top];
        if major == MajorType::Map {
            if count % 2 != 0 {
                self.fail(Error::UnmatchedMapKey);
                return self;
            }
            count /= 2;
        }
        self.write_head(major, count as u64);
        self.depth = top;
        self.count_item();
        self
    }

    pub fn prepend_null(&mut self) -> &mut Self {
        self.write_simple(Simple::Null);
        self.count_item();
        self
    }

    pub fn prepend_undefined(&mut self) -> &mut Self {
        self.write_simple(Simple::Undefined);
        self.count_item();
        self
    }

    pub fn prepend_bool(&mut self, value: bool) -> &mut Self {
        self.write_simple(value.into());
        self.count_item();
        self
    }

    pub fn prepend<T>(&mut self, value: &T) -> &mut Self
    where
        T: ToCbor + ?Sized,
    {
        value.to_cbor(self);
        self
    }
}

macro_rules! impl_uint_to_cbor {
    ($($ty:ty),*) => {
        $(
            impl ToCbor for $ty {
                fn to_cbor<const MAX_NESTING: usize>(&self, writer: &mut Writer<'_, MAX_NESTING>) {
                    writer.prepend_unsigned(*self as u64);
                }
            }
        )*
    };
}

impl_uint_to_cbor!(u8, u16, u32, u64, usize);

impl ToCbor for bool {
    fn to_cbor<const MAX_NESTING: usize>(&self, writer: &mut Writer<'_, MAX_NESTING>) {
        writer.prepend_bool(*self);
    }
}

impl ToCbor for [u8] {
    fn to_cbor<const MAX_NESTING: usize>(&self, writer: &mut Writer<'_, MAX_NESTING>) {
        writer.prepend_data(self);
    }
}

impl<const N: usize> ToCbor for [u8; N] {
    fn to_cbor<const MAX_NESTING: usize>(&self, writer: &mut Writer<'_, MAX_NESTING>) {
        writer.prepend_data(self);
    }
}

impl ToCbor for str {
    fn to_cbor<const MAX_NESTING: usize>(&self, writer: &mut Writer<'_, MAX_NESTING>) {
        writer.prepend_text(self);
    }
}

impl<T> ToCbor for Option<T>
where
    T: ToCbor,
{
    fn to_cbor<const MAX_NESTING: usize>(&self, writer: &mut Writer<'_, MAX_NESTING>) {
        match self {
            Some(value) => value.to_cbor(writer),
            None => {
                writer.prepend_null();
            }
        }
    }
}

/*!
A minimal CBOR (RFC 8949) codec for memory-constrained targets.

The [`encode::Writer`] fills a caller-owned buffer from its end towards its
start, so composite items are written leaves first and wrapped afterwards,
without a second pass or any back-patching. The [`decode::Reader`] walks a
borrowed buffer forwards and hands out views into it without copying.

Only a subset of CBOR is supported: unsigned integers, definite-length byte
and text strings, arrays, maps, and the simple values `false`, `true`, `null`
and `undefined`.
*/
#![no_std]

#[cfg(test)]
extern crate std;

macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    };
}

pub mod decode;
pub mod encode;
pub mod format;


#[cfg(test)]
mod encode_tests;

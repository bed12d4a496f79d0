//! Read varints from message buffers.
//!
//! Variable length integers (_varints_) are the default encoding of integers
//! in Protocol Buffers messages, including field keys and the length prefixes
//! of length-delimited fields.
//!
//! See <https://protobuf.dev/programming-guides/encoding/#varints>.

use std::ops::Deref;

use crate::protobuf::cursor::ByteCursor;
use crate::protobuf::errors::DecodeError;

/// A decoded varint and the number of bytes it occupied in the input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Varint {
    value: u64,
    len: usize,
}

impl Varint {
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Return the number of encoded bytes that were consumed.
    pub fn byte_size(&self) -> usize {
        self.len
    }
}

/// Read a varint starting at the cursor's current position.
///
/// Each byte contributes its low 7 bits to the value and the high bit
/// indicates whether another byte follows. There is no limit on the number of
/// continuation bytes. Bits which would land beyond the 64th bit of the value
/// are consumed but discarded.
pub fn read_varint(src: &mut ByteCursor) -> Result<Varint, DecodeError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut len = 0;

    loop {
        let byte = src.read_byte()?;
        len += 1;

        // High bit is continuation bit. Low 7 bits are the payload.
        if shift < u64::BITS {
            value |= ((byte & 0x7f) as u64) << shift;
        }
        shift = shift.saturating_add(7);

        if byte & 0x80 == 0 {
            return Ok(Varint { value, len });
        }
    }
}

/// Little-endian byte representation of a scalar field value.
///
/// Decoded varints are converted back into bytes so that scalar and
/// length-delimited values share a single `&[u8]` representation when passed
/// to [`DecodePolicy::on_field`](crate::protobuf::DecodePolicy::on_field).
/// Only as many bytes as are needed to represent the value are kept, with a
/// minimum of one byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScalarBytes {
    bytes: [u8; 8],
    len: usize,
}

impl ScalarBytes {
    pub fn from_u64(value: u64) -> Self {
        let bits = (u64::BITS - value.leading_zeros()) as usize;
        Self {
            bytes: value.to_le_bytes(),
            len: bits.div_ceil(8).max(1),
        }
    }
}

impl Deref for ScalarBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Convert a little-endian byte representation of a scalar back into an
/// integer.
///
/// This is the inverse of [`ScalarBytes::from_u64`] and also accepts the raw
/// 4 and 8 byte values of fixed-width fields. Bytes beyond the eighth are
/// ignored.
pub fn varint_from_le_bytes(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .enumerate()
        .fold(0, |acc, (i, &byte)| acc | ((byte as u64) << (i * 8)))
}

/// Decode a ZigZag-encoded value, as used by `sint32` and `sint64` fields.
///
/// See <https://protobuf.dev/programming-guides/encoding/#signed-ints>.
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

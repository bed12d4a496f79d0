use crate::protobuf::errors::{DecodeError, ErrorKind};

/// Read position within an in-memory message buffer.
///
/// All reads are bounds-checked and return slices which borrow from the
/// input rather than from the cursor, so values handed to a
/// [`DecodePolicy`](crate::protobuf::DecodePolicy) can outlive subsequent
/// reads.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Return the current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return the total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Return the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Check that at least `len` unread bytes are available.
    pub fn check_has_bytes(&self, len: usize) -> Result<(), DecodeError> {
        if len <= self.remaining() {
            Ok(())
        } else {
            Err(ErrorKind::UnexpectedEndOfStream.into())
        }
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or(ErrorKind::UnexpectedEndOfStream)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.check_has_bytes(len)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a fixed-size array of `N` bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<&'a [u8; N], DecodeError> {
        let bytes = self.read_bytes(N)?;
        bytes
            .try_into()
            .map_err(|_| ErrorKind::UnexpectedEndOfStream.into())
    }

    /// Advance over `len` bytes without reading them.
    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.check_has_bytes(len)?;
        self.pos += len;
        Ok(())
    }
}

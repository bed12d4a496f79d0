use thiserror::Error;

/// Errors decoding a Protocol Buffers message.
///
/// Any error aborts the whole [`parse`](crate::protobuf::parse) call. The
/// error records where decoding stopped so that callers processing many
/// messages can report which one failed and why.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("decode failed at offset {offset} (path \"{path}\"): {kind}")]
pub struct DecodeError {
    kind: ErrorKind,
    offset: usize,
    path: String,
}

impl DecodeError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            offset: 0,
            path: String::new(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Return the byte offset of the field that was being decoded.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Return the colon-separated path of the message frames which were open
    /// when the error occurred.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Associate an input offset and field path with this error.
    pub fn with_context(mut self, offset: usize, path: &str) -> Self {
        self.offset = offset;
        self.path = path.to_string();
        self
    }
}

impl From<ErrorKind> for DecodeError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Enum describing the kind of a [`DecodeError`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input ended before a varint, fixed-width value or length-delimited
    /// payload could be fully read.
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    /// A field key contained a wire type which is not supported.
    ///
    /// This is reported for the deprecated group wire types (3 and 4) and for
    /// the two values of the 3-bit wire type field which are unassigned.
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),

    /// A field extends past the end of the submessage which contains it.
    #[error("field extends past the end of its enclosing message")]
    MessageOverrun,

    /// Submessages are nested more deeply than allowed by
    /// [`ParseOptions::max_depth`](crate::protobuf::ParseOptions::max_depth).
    #[error("message nesting exceeds limit of {0}")]
    DepthLimitExceeded(usize),

    /// The input is larger than allowed by
    /// [`ParseOptions::max_input_len`](crate::protobuf::ParseOptions::max_input_len).
    #[error("input of {len} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },

    /// The parser stack was used incorrectly.
    ///
    /// This indicates a bug in the parser rather than a problem with the input.
    #[error("parser stack invariant violated: {0}")]
    InternalStackInvariantViolation(&'static str),
}

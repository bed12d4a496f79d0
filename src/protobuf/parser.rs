use tracing::{debug, trace};

use crate::protobuf::cursor::ByteCursor;
use crate::protobuf::errors::{DecodeError, ErrorKind};
use crate::protobuf::policy::{Decision, DecodePolicy};
use crate::protobuf::stack::ParserStack;
use crate::protobuf::varint::{ScalarBytes, read_varint};
use crate::protobuf::wire::{WireType, read_key};

/// Options which limit the resources a parse can use.
///
/// Parsing is a single pass over the input with memory proportional to the
/// nesting depth, so the defaults impose no limits. Callers decoding
/// untrusted input can bound the work done here.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum length of the input buffer in bytes.
    pub max_input_len: Option<usize>,

    /// Maximum number of nested fields, including the innermost scalar or
    /// captured field. A message with only top-level fields has depth 1.
    pub max_depth: Option<usize>,
}

/// Schema-less Protocol Buffers message parser.
///
/// The parser walks the fields of a message in order and lets a
/// [`DecodePolicy`] decide which embedded messages to descend into and which
/// values to capture. Embedded messages are handled iteratively using an
/// explicit [`ParserStack`] rather than by recursion, so deeply nested input
/// cannot overflow the call stack.
pub struct Parser<'a> {
    cursor: ByteCursor<'a>,
    stack: ParserStack,
    options: ParseOptions,
    fields_visited: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser for the message in `buf` with default options.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, ParseOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: ParseOptions) -> Self {
        Self {
            cursor: ByteCursor::new(buf),
            stack: ParserStack::new(),
            options,
            fields_visited: 0,
        }
    }

    /// Return the number of field keys read so far.
    pub fn fields_visited(&self) -> usize {
        self.fields_visited
    }

    /// Parse the whole message, passing fields to `policy`.
    ///
    /// Either the whole buffer is parsed or an error is returned. Values
    /// delivered to `policy` before an error was encountered are not
    /// retracted.
    pub fn parse<P: DecodePolicy + ?Sized>(&mut self, policy: &mut P) -> Result<(), DecodeError> {
        if let Some(limit) = self.options.max_input_len {
            let len = self.cursor.len();
            if len > limit {
                return Err(ErrorKind::InputTooLarge { len, limit }.into());
            }
        }

        while !self.cursor.is_at_end() {
            let field_start = self.cursor.position();
            self.parse_field(policy).map_err(|err| {
                let path = self.stack.field_path();
                debug!(offset = field_start, path, error = %err.kind(), "parse failed");
                err.with_context(field_start, path)
            })?;
        }

        // Every frame is closed as soon as the cursor reaches its end, and no
        // frame may end beyond the input, so reaching the end closes them all.
        if !self.stack.is_empty() {
            return Err(DecodeError::new(ErrorKind::InternalStackInvariantViolation(
                "frames remain open at end of input",
            ))
            .with_context(self.cursor.position(), self.stack.field_path()));
        }

        debug!(
            len = self.cursor.len(),
            fields = self.fields_visited,
            "parse complete"
        );
        Ok(())
    }

    /// Process one field key and its value, then close any embedded messages
    /// which end where the field ends.
    fn parse_field<P: DecodePolicy + ?Sized>(&mut self, policy: &mut P) -> Result<(), DecodeError> {
        let key = read_key(&mut self.cursor)?;
        self.fields_visited += 1;
        self.stack.push_frame(key.number, None);

        if let Some(max_depth) = self.options.max_depth {
            if self.stack.depth() > max_depth {
                return Err(ErrorKind::DepthLimitExceeded(max_depth).into());
            }
        }

        match key.wire_type {
            WireType::Varint => {
                let value = read_varint(&mut self.cursor)?;
                let bytes = ScalarBytes::from_u64(value.value());
                policy.on_field(key.wire_type, key.number, &bytes, self.stack.path());
                self.stack.pop_frame();
            }
            WireType::Fixed64 => {
                let bytes = self.cursor.read_array::<8>()?;
                policy.on_field(key.wire_type, key.number, bytes, self.stack.path());
                self.stack.pop_frame();
            }
            WireType::Fixed32 => {
                let bytes = self.cursor.read_array::<4>()?;
                policy.on_field(key.wire_type, key.number, bytes, self.stack.path());
                self.stack.pop_frame();
            }
            WireType::LengthDelimited => {
                let len = read_varint(&mut self.cursor)?.value();
                let len = usize::try_from(len).map_err(|_| ErrorKind::UnexpectedEndOfStream)?;

                let decision = policy.decide(key.number, self.stack.path().parent());
                trace!(
                    number = key.number,
                    len,
                    path = self.stack.field_path(),
                    ?decision,
                    "length-delimited field"
                );

                match decision {
                    Decision::Skip => {
                        self.cursor.skip(len)?;
                        self.stack.pop_frame();
                    }
                    Decision::CaptureBytes => {
                        let bytes = self.cursor.read_bytes(len)?;
                        policy.on_field(key.wire_type, key.number, bytes, self.stack.path());
                        self.stack.pop_frame();
                    }
                    Decision::ParseAsMessage => {
                        self.cursor.check_has_bytes(len)?;
                        let end = self.cursor.position() + len;
                        if self
                            .stack
                            .enclosing_end()
                            .is_some_and(|parent_end| end > parent_end)
                        {
                            return Err(ErrorKind::MessageOverrun.into());
                        }

                        // Leave the frame open. Subsequent fields are read as
                        // children of this one until the cursor reaches `end`.
                        self.stack.update_frame(end)?;
                    }
                }
            }
            WireType::StartGroup | WireType::EndGroup => {
                // `read_key` rejects group wire types.
                return Err(ErrorKind::UnsupportedWireType(key.wire_type as u8).into());
            }
        }

        self.close_frames()
    }

    /// Pop embedded messages whose content has been fully consumed.
    ///
    /// Embedded messages have no end marker, only the length prefix which was
    /// recorded when the message was entered, so they are closed when the
    /// cursor reaches the recorded end.
    fn close_frames(&mut self) -> Result<(), DecodeError> {
        let pos = self.cursor.position();
        while let Some(frame) = self.stack.peek_frame() {
            match frame.end {
                Some(end) if end == pos => {
                    self.stack.pop_frame();
                }
                Some(end) if end < pos => {
                    return Err(ErrorKind::MessageOverrun.into());
                }
                _ => break,
            }
        }
        Ok(())
    }
}

/// Parse a message with default options, passing fields to `policy`.
///
/// This is a shorthand for `Parser::new(buf).parse(policy)`.
pub fn parse<P: DecodePolicy + ?Sized>(buf: &[u8], policy: &mut P) -> Result<(), DecodeError> {
    Parser::new(buf).parse(policy)
}

/// Parse a message with custom options, passing fields to `policy`.
pub fn parse_with_options<P: DecodePolicy + ?Sized>(
    buf: &[u8],
    options: ParseOptions,
    policy: &mut P,
) -> Result<(), DecodeError> {
    Parser::with_options(buf, options).parse(policy)
}

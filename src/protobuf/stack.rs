use std::cell::OnceCell;

use smallvec::SmallVec;

use crate::protobuf::errors::{DecodeError, ErrorKind};
use crate::protobuf::path::FieldPath;

/// Number of frames stored inline before the stack spills to the heap. Real
/// messages rarely nest more deeply than this.
const INLINE_DEPTH: usize = 16;

/// A field which the parser is currently inside.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub number: u64,

    /// Offset at which the field's content ends. This is set only once the
    /// field is known to be a length-delimited field that is being parsed as
    /// an embedded message.
    pub end: Option<usize>,
}

/// Stack of the fields that the parser is currently inside, outermost first.
///
/// Field numbers and end offsets are stored in separate arrays so that the
/// current [`FieldPath`] can be handed out as a slice without copying.
#[derive(Debug, Default)]
pub struct ParserStack {
    numbers: SmallVec<[u64; INLINE_DEPTH]>,
    ends: SmallVec<[Option<usize>; INLINE_DEPTH]>,

    /// Textual form of `numbers`, computed on demand.
    path_str: OnceCell<String>,
}

impl ParserStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of open frames.
    pub fn depth(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Push a new innermost frame.
    pub fn push_frame(&mut self, number: u64, end: Option<usize>) {
        self.numbers.push(number);
        self.ends.push(end);
        self.path_str.take();
    }

    /// Set the end offset of the innermost frame.
    pub fn update_frame(&mut self, end: usize) -> Result<(), DecodeError> {
        let last = self.ends.last_mut().ok_or(ErrorKind::InternalStackInvariantViolation(
            "update_frame called on empty stack",
        ))?;
        *last = Some(end);
        Ok(())
    }

    /// Return the innermost frame without removing it.
    pub fn peek_frame(&self) -> Option<Frame> {
        let number = *self.numbers.last()?;
        let end = *self.ends.last()?;
        Some(Frame { number, end })
    }

    /// Remove and return the innermost frame.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        let number = self.numbers.pop()?;
        let end = self.ends.pop()?;
        self.path_str.take();
        Some(Frame { number, end })
    }

    /// Return the end offset of the innermost frame, other than the top one,
    /// which has a known end.
    ///
    /// This is the boundary which the content of the innermost frame must not
    /// cross.
    pub fn enclosing_end(&self) -> Option<usize> {
        let (_, outer) = self.ends.split_last()?;
        outer.iter().rev().find_map(|end| *end)
    }

    /// Return the field numbers of all open frames.
    pub fn path(&self) -> FieldPath<'_> {
        FieldPath::new(&self.numbers)
    }

    /// Return the colon-separated field numbers of all open frames.
    ///
    /// The string is computed on first access and cached until the next push
    /// or pop.
    pub fn field_path(&self) -> &str {
        self.path_str.get_or_init(|| self.path().to_string())
    }
}

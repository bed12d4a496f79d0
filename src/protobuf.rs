//! Schema-less Protocol Buffers wire-format decoder.
//!
//! This module walks an encoded [Protocol Buffers](https://protobuf.dev/)
//! message field by field without a compiled `.proto` definition. A
//! caller-supplied [`DecodePolicy`] decides, for each length-delimited field,
//! whether to skip it, capture its bytes or descend into it as an embedded
//! message. Decisions are based only on the field's [`FieldPath`], the
//! sequence of field numbers leading to it from the root message.
//!
//! # Prerequisites
//!
//! It is helpful to understand how Protocol Buffers messages are encoded.
//! See <https://protobuf.dev/programming-guides/encoding/> for a guide.
//!
//! # Decoding a message
//!
//! 1. Obtain the message as a byte slice. Any transport encoding (base64,
//!    hex) must be removed first.
//! 2. Create a policy. This can be a type implementing [`DecodePolicy`], a
//!    pair of closures wrapped in [`FnPolicy`] or one of the policies in
//!    [`policies`](crate::policies).
//! 3. Call [`parse`], or [`Parser::with_options`] to limit input size or
//!    nesting depth.
//! 4. Read the results accumulated by the policy.
//!
//! Skipped fields are advanced over without being copied, so extracting a
//! few values from a large message is cheap.
//!
//! # Limitations
//!
//! The deprecated group wire types are rejected with
//! [`ErrorKind::UnsupportedWireType`]. There is no support for encoding.

mod cursor;
mod errors;
mod parser;
mod path;
mod policy;
mod stack;
pub mod varint;
mod wire;

pub use cursor::ByteCursor;
pub use errors::{DecodeError, ErrorKind};
pub use parser::{ParseOptions, Parser, parse, parse_with_options};
pub use path::{FieldPath, PATH_SEPARATOR, parse_field_path};
pub use policy::{Decision, DecodePolicy, FnPolicy};
pub use stack::{Frame, ParserStack};
pub use wire::{FieldKey, WireType, read_key};

#[cfg(test)]
mod tests;

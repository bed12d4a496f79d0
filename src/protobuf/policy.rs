use crate::protobuf::path::FieldPath;
use crate::protobuf::wire::WireType;

/// How the parser should handle a length-delimited field.
///
/// The wire format does not distinguish between embedded messages, strings,
/// bytes and packed repeated fields, so the parser asks the policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Advance past the field without reading its contents.
    Skip,

    /// Parse the field's contents as an embedded message.
    ParseAsMessage,

    /// Pass the field's contents to [`DecodePolicy::on_field`].
    CaptureBytes,
}

/// Caller-supplied logic which decides which fields of a message are visited
/// and receives their values.
///
/// Policies only see the position of each field in the message tree, never a
/// schema. A policy that wants the value of field 2 inside field 5 for
/// example, would return [`Decision::ParseAsMessage`] for field 5 at the
/// root, [`Decision::CaptureBytes`] for field 2 inside it, and
/// [`Decision::Skip`] for everything else.
///
/// ```
/// use protoscan::protobuf::{parse, Decision, DecodePolicy, FieldPath, WireType};
///
/// #[derive(Default)]
/// struct Name(Option<String>);
///
/// impl DecodePolicy for Name {
///     fn decide(&mut self, number: u64, parent: FieldPath) -> Decision {
///         match (parent.as_slice(), number) {
///             ([], 5) => Decision::ParseAsMessage,
///             ([5], 2) => Decision::CaptureBytes,
///             _ => Decision::Skip,
///         }
///     }
///
///     fn on_field(&mut self, _wire_type: WireType, _number: u64, value: &[u8], path: FieldPath) {
///         if path == [5, 2] {
///             self.0 = Some(String::from_utf8_lossy(value).into_owned());
///         }
///     }
/// }
///
/// // Field 5 { field 1 = 150, field 2 = "hi" }
/// let message = [0x2a, 0x07, 0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i'];
/// let mut name = Name::default();
/// parse(&message, &mut name).unwrap();
/// assert_eq!(name.0.as_deref(), Some("hi"));
/// ```
pub trait DecodePolicy {
    /// Decide how to handle a length-delimited field with a given number.
    ///
    /// `parent` is the path of the message containing the field. It does not
    /// include `number`. This is called before the field's contents are read.
    fn decide(&mut self, number: u64, parent: FieldPath) -> Decision;

    /// Receive the value of a field.
    ///
    /// This is called for every varint, fixed32 and fixed64 field in the
    /// messages that are visited, and for length-delimited fields for which
    /// [`decide`](DecodePolicy::decide) returned [`Decision::CaptureBytes`].
    ///
    /// `path` is the path of the field itself, so its last element is
    /// `number`. Varint values are passed as their little-endian byte
    /// representation, see [`ScalarBytes`](crate::protobuf::varint::ScalarBytes).
    /// Fixed-width values are passed as their raw little-endian bytes.
    fn on_field(&mut self, wire_type: WireType, number: u64, value: &[u8], path: FieldPath);
}

impl<P: DecodePolicy + ?Sized> DecodePolicy for &mut P {
    fn decide(&mut self, number: u64, parent: FieldPath) -> Decision {
        (**self).decide(number, parent)
    }

    fn on_field(&mut self, wire_type: WireType, number: u64, value: &[u8], path: FieldPath) {
        (**self).on_field(wire_type, number, value, path)
    }
}

impl<P: DecodePolicy + ?Sized> DecodePolicy for Box<P> {
    fn decide(&mut self, number: u64, parent: FieldPath) -> Decision {
        (**self).decide(number, parent)
    }

    fn on_field(&mut self, wire_type: WireType, number: u64, value: &[u8], path: FieldPath) {
        (**self).on_field(wire_type, number, value, path)
    }
}

/// A [`DecodePolicy`] built from a pair of closures.
pub struct FnPolicy<D, F> {
    decide: D,
    on_field: F,
}

impl<D, F> FnPolicy<D, F>
where
    D: FnMut(u64, FieldPath) -> Decision,
    F: FnMut(WireType, u64, &[u8], FieldPath),
{
    pub fn new(decide: D, on_field: F) -> Self {
        Self { decide, on_field }
    }
}

impl<D, F> DecodePolicy for FnPolicy<D, F>
where
    D: FnMut(u64, FieldPath) -> Decision,
    F: FnMut(WireType, u64, &[u8], FieldPath),
{
    fn decide(&mut self, number: u64, parent: FieldPath) -> Decision {
        (self.decide)(number, parent)
    }

    fn on_field(&mut self, wire_type: WireType, number: u64, value: &[u8], path: FieldPath) {
        (self.on_field)(wire_type, number, value, path)
    }
}

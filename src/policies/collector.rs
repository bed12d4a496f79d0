use crate::policies::PathSelector;
use crate::protobuf::varint::varint_from_le_bytes;
use crate::protobuf::{Decision, DecodePolicy, FieldPath, WireType};

/// An owned copy of a field value delivered to a policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedField {
    /// Path of the field, ending with its own number.
    pub path: Vec<u64>,
    pub wire_type: WireType,
    pub value: Vec<u8>,
}

impl CapturedField {
    pub fn number(&self) -> u64 {
        self.path.last().copied().unwrap_or_default()
    }

    pub fn path(&self) -> FieldPath<'_> {
        FieldPath::new(&self.path)
    }

    /// Return the value as an unsigned integer, if this is a scalar field.
    pub fn as_u64(&self) -> Option<u64> {
        match self.wire_type {
            WireType::Varint | WireType::Fixed32 | WireType::Fixed64 => {
                Some(varint_from_le_bytes(&self.value))
            }
            _ => None,
        }
    }

    /// Return the value as text, if this is a length-delimited field
    /// containing valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self.wire_type {
            WireType::LengthDelimited => std::str::from_utf8(&self.value).ok(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
enum Mode {
    Selected(PathSelector),
    RootFields,
}

/// Policy which records a copy of every field value it receives.
///
/// The collector either captures the targets of a [`PathSelector`], or every
/// field of the root message without descending into any embedded messages.
#[derive(Clone, Debug)]
pub struct FieldCollector {
    mode: Mode,
    fields: Vec<CapturedField>,
}

impl FieldCollector {
    /// Create a collector which captures the targets of `selector`.
    ///
    /// Scalar fields in the messages which are parsed on the way to the
    /// targets are not recorded unless they are targets themselves.
    pub fn new(selector: PathSelector) -> Self {
        Self {
            mode: Mode::Selected(selector),
            fields: Vec::new(),
        }
    }

    /// Create a collector which captures every field of the root message.
    pub fn root_fields() -> Self {
        Self {
            mode: Mode::RootFields,
            fields: Vec::new(),
        }
    }

    /// Return the captured fields in the order they were encountered.
    pub fn fields(&self) -> &[CapturedField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<CapturedField> {
        self.fields
    }
}

impl DecodePolicy for FieldCollector {
    fn decide(&mut self, number: u64, parent: FieldPath) -> Decision {
        match &self.mode {
            Mode::Selected(selector) => selector.decide(number, parent),
            Mode::RootFields => Decision::CaptureBytes,
        }
    }

    fn on_field(&mut self, wire_type: WireType, _number: u64, value: &[u8], path: FieldPath) {
        let keep = match &self.mode {
            Mode::Selected(selector) => selector.is_target(path),
            Mode::RootFields => true,
        };
        if keep {
            self.fields.push(CapturedField {
                path: path.to_vec(),
                wire_type,
                value: value.to_vec(),
            });
        }
    }
}

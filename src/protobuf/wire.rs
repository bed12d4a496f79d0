use std::fmt;

use crate::protobuf::cursor::ByteCursor;
use crate::protobuf::errors::{DecodeError, ErrorKind};
use crate::protobuf::varint::read_varint;

/// Physical encoding of a field's value.
///
/// See <https://protobuf.dev/programming-guides/encoding/#structure>.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum WireType {
    /// Integer value encoded as a varint.
    Varint = 0,

    /// 64-bit little-endian fixed-width value.
    Fixed64 = 1,

    /// A length prefix followed by that many bytes.
    LengthDelimited = 2,

    /// Deprecated start-of-group type. Not supported by the parser.
    StartGroup = 3,

    /// Deprecated end-of-group type. Not supported by the parser.
    EndGroup = 4,

    /// 32-bit little-endian fixed-width value.
    Fixed32 = 5,
}

impl WireType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Varint => "varint",
            Self::Fixed64 => "fixed64",
            Self::LengthDelimited => "length_delimited",
            Self::StartGroup => "start_group",
            Self::EndGroup => "end_group",
            Self::Fixed32 => "fixed32",
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = ErrorKind;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            3 => Ok(Self::StartGroup),
            4 => Ok(Self::EndGroup),
            5 => Ok(Self::Fixed32),
            _ => Err(ErrorKind::UnsupportedWireType(val)),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire type and field number decoded from the key which precedes each field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldKey {
    pub wire_type: WireType,

    /// Field number. The wire format places no upper bound on this, so
    /// numbers larger than any real schema would use are accepted as-is.
    pub number: u64,
}

impl FieldKey {
    /// Split a decoded key varint into wire type and field number.
    ///
    /// Group wire types are rejected since the parser cannot determine where
    /// a group ends without tracking additional state.
    pub fn from_varint(key: u64) -> Result<Self, ErrorKind> {
        let wire_type = WireType::try_from((key & 0x7) as u8)?;
        if matches!(wire_type, WireType::StartGroup | WireType::EndGroup) {
            return Err(ErrorKind::UnsupportedWireType(wire_type as u8));
        }
        Ok(Self {
            wire_type,
            number: key >> 3,
        })
    }
}

/// Read a field key at the cursor's current position.
pub fn read_key(src: &mut ByteCursor) -> Result<FieldKey, DecodeError> {
    let key = read_varint(src)?;
    Ok(FieldKey::from_varint(key.value())?)
}

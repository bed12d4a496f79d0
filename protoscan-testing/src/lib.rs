//! Internal testing utilities for the protoscan crates.
//!
//! This provides an encoder for building Protocol Buffers fixtures by hand,
//! and a helper for table-driven tests.

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Wire type of varint fields.
pub const VARINT: u64 = 0;
/// Wire type of 64-bit fixed-width fields.
pub const FIXED_64: u64 = 1;
/// Wire type of length-delimited fields.
pub const LENGTH_DELIMITED: u64 = 2;
/// Wire type of the deprecated start-group marker.
pub const START_GROUP: u64 = 3;
/// Wire type of the deprecated end-group marker.
pub const END_GROUP: u64 = 4;
/// Wire type of 32-bit fixed-width fields.
pub const FIXED_32: u64 = 5;

/// Encode `val` as a base-128 varint.
pub fn encode_varint(mut val: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(10);
    loop {
        let byte = (val & 0x7f) as u8;
        val >>= 7;
        if val == 0 {
            bytes.push(byte);
            return bytes;
        }
        bytes.push(byte | 0x80);
    }
}

/// Encode the key which precedes a field with a given wire type and number.
pub fn encode_key(wire_type: u64, number: u64) -> Vec<u8> {
    encode_varint(wire_type | (number << 3))
}

/// Builder for encoded messages used as test fixtures.
///
/// ```
/// use protoscan_testing::MessageBuilder;
///
/// let inner = MessageBuilder::new().string(1, "uatom");
/// let msg = MessageBuilder::new().varint(1, 150).message(2, inner).build();
/// assert_eq!(msg, [0x08, 0x96, 0x01, 0x12, 0x07, 0x0a, 0x05, b'u', b'a', b't', b'o', b'm']);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a varint field.
    pub fn varint(mut self, number: u64, value: u64) -> Self {
        self.buf.extend(encode_key(VARINT, number));
        self.buf.extend(encode_varint(value));
        self
    }

    /// Append a 32-bit fixed-width field.
    pub fn fixed32(mut self, number: u64, value: u32) -> Self {
        self.buf.extend(encode_key(FIXED_32, number));
        self.buf.extend(value.to_le_bytes());
        self
    }

    /// Append a 64-bit fixed-width field.
    pub fn fixed64(mut self, number: u64, value: u64) -> Self {
        self.buf.extend(encode_key(FIXED_64, number));
        self.buf.extend(value.to_le_bytes());
        self
    }

    /// Append a length-delimited field containing `value`.
    pub fn bytes(mut self, number: u64, value: impl AsRef<[u8]>) -> Self {
        let value = value.as_ref();
        self.buf.extend(encode_key(LENGTH_DELIMITED, number));
        self.buf.extend(encode_varint(value.len() as u64));
        self.buf.extend(value);
        self
    }

    /// Append a length-delimited field containing UTF-8 text.
    pub fn string(self, number: u64, value: &str) -> Self {
        self.bytes(number, value.as_bytes())
    }

    /// Append a length-delimited field containing an embedded message.
    pub fn message(self, number: u64, msg: MessageBuilder) -> Self {
        self.bytes(number, msg.buf)
    }

    /// Append a key for a field with an arbitrary wire type, without a value.
    pub fn key(mut self, wire_type: u64, number: u64) -> Self {
        self.buf.extend(encode_key(wire_type, number));
        self
    }

    /// Append raw bytes.
    pub fn raw(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.buf.extend(bytes.as_ref());
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Utility for table-driven tests.
///
/// Define a `Case` struct deriving `Debug`, build a collection of cases and
/// call `test_each` with the test body. Every case is run, even if earlier
/// ones panic, and a single panic listing all failing cases is raised at the
/// end.
///
/// ```
/// use protoscan_testing::{TestCases, encode_varint};
///
/// #[derive(Debug)]
/// struct Case {
///     value: u64,
///     len: usize,
/// }
///
/// let cases = [Case { value: 1, len: 1 }, Case { value: 300, len: 2 }];
/// cases.test_each(|case| assert_eq!(encode_varint(case.value).len(), case.len));
/// ```
///
/// Cases and values captured by the test function must be
/// [unwind safe](std::panic::UnwindSafe). Wrap values which are not in
/// [`AssertUnwindSafe`](std::panic::AssertUnwindSafe).
pub trait TestCases {
    type Case;

    /// Call `test` with a reference to each case.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Call `test` with each case by value.
    ///
    /// Each case is formatted before the test runs so that it can be reported
    /// if the test panics.
    fn test_each_value(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe;
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        I::Item: Debug + RefUnwindSafe,
    {
        let mut failures = Vec::new();
        for case in self {
            if std::panic::catch_unwind(|| test(&case)).is_err() {
                failures.push(format!("{:?}", case));
            }
        }
        report_failures(&failures);
    }

    fn test_each_value(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        I::Item: Debug + UnwindSafe,
    {
        let test = &test;
        let failures: Vec<String> = self
            .into_iter()
            .filter_map(|case| {
                let desc = format!("{:?}", case);
                std::panic::catch_unwind(move || test(case))
                    .is_err()
                    .then_some(desc)
            })
            .collect();
        report_failures(&failures);
    }
}

fn report_failures(failures: &[String]) {
    assert!(
        failures.is_empty(),
        "{} test cases failed: [{}]",
        failures.len(),
        failures.join(", ")
    );
}

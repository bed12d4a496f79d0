//! Formatting of per-message results as text or JSON.

use protoscan::policies::{CapturedField, Fee};
use protoscan::protobuf::WireType;
use serde::Serialize;

/// Values extracted from one input message.
#[derive(Debug, Default, Serialize)]
pub struct MessageOutput {
    pub line: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldOutput>>,
}

impl MessageOutput {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            ..Default::default()
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct FieldOutput {
    /// Field path in `"2:2:1"` form.
    pub path: String,
    pub wire_type: WireType,

    /// Hex-encoded raw value.
    pub value: String,
}

impl From<&CapturedField> for FieldOutput {
    fn from(field: &CapturedField) -> Self {
        FieldOutput {
            path: field.path().to_string(),
            wire_type: field.wire_type,
            value: hex::encode(&field.value),
        }
    }
}

/// Format a field value for display.
///
/// Integers are shown in decimal, printable text is quoted and anything else
/// is shown as hex.
pub fn format_value(field: &CapturedField) -> String {
    if let Some(value) = field.as_u64() {
        return value.to_string();
    }
    match field.as_str() {
        Some(text) if !text.chars().any(|ch| ch.is_control()) => format!("{:?}", text),
        _ => format!("0x{}", hex::encode(&field.value)),
    }
}

/// Format the result for a message as lines of text.
pub fn format_text(output: &MessageOutput, fields: &[CapturedField]) -> String {
    let line = output.line;
    let mut lines = Vec::new();

    if let Some(error) = &output.error {
        lines.push(format!("{}: error: {}", line, error));
    } else if let Some(fee) = &output.fee {
        let gas = fee
            .gas_limit
            .map(|gas_limit| format!(" (gas limit {})", gas_limit))
            .unwrap_or_default();
        lines.push(format!("{}: fee {} {}{}", line, fee.amount, fee.denom, gas));
    } else if output.fields.is_none() {
        lines.push(format!("{}: no fee", line));
    } else if fields.is_empty() {
        lines.push(format!("{}: no fields", line));
    } else {
        lines.extend(fields.iter().map(|field| {
            format!(
                "{}: {} {} {}",
                line,
                field.path(),
                field.wire_type,
                format_value(field)
            )
        }));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

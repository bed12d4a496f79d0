//! Reading hex-encoded messages from a file or stdin.

use std::fs;
use std::io::{self, Read};

/// A message read from one line of the input.
pub struct InputMessage {
    /// 1-based line number in the input.
    pub line: usize,

    /// The decoded message, or the reason the line is not valid hex.
    pub bytes: Result<Vec<u8>, hex::FromHexError>,
}

/// Read the whole input from `path`, or stdin if `path` is `None` or `"-"`.
pub fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        None | Some("-") => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        Some(path) => fs::read_to_string(path),
    }
}

/// Split input text into hex-encoded messages, one per line.
///
/// Surrounding whitespace and an optional `0x` prefix are removed. Blank lines
/// are skipped but still counted, so line numbers match the input.
pub fn parse_messages(text: &str) -> Vec<InputMessage> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line_text = line.trim();
            if line_text.is_empty() {
                return None;
            }
            let digits = line_text
                .strip_prefix("0x")
                .or_else(|| line_text.strip_prefix("0X"))
                .unwrap_or(line_text);
            Some(InputMessage {
                line: i + 1,
                bytes: hex::decode(digits),
            })
        })
        .collect()
}

use std::fmt;
use std::num::ParseIntError;

/// Separator between field numbers in the textual form of a field path.
pub const PATH_SEPARATOR: char = ':';

/// Position of a field in a message tree, as the sequence of field numbers
/// leading to it from the root message.
///
/// This is a borrowed view over the parser's stack. Use the [`Display`]
/// implementation to get the textual form, eg. `"2:2:1:2"`. The root path is
/// empty and formats as `""`.
///
/// [`Display`]: std::fmt::Display
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath<'a> {
    numbers: &'a [u64],
}

impl<'a> FieldPath<'a> {
    pub fn new(numbers: &'a [u64]) -> Self {
        Self { numbers }
    }

    pub fn as_slice(&self) -> &'a [u64] {
        self.numbers
    }

    /// Return the number of fields in the path.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Return the number of the innermost field.
    pub fn last(&self) -> Option<u64> {
        self.numbers.last().copied()
    }

    /// Return the path with the innermost field removed.
    ///
    /// The parent of the root path is the root path.
    pub fn parent(&self) -> FieldPath<'a> {
        match self.numbers.split_last() {
            Some((_, parent)) => FieldPath::new(parent),
            None => *self,
        }
    }

    /// Return true if this path starts with all of `prefix`.
    pub fn starts_with(&self, prefix: &[u64]) -> bool {
        self.numbers.starts_with(prefix)
    }

    /// Return true if `self` followed by `number` equals `target`.
    pub fn child_matches(&self, number: u64, target: &[u64]) -> bool {
        target.len() == self.numbers.len() + 1
            && target.starts_with(self.numbers)
            && target.last() == Some(&number)
    }

    pub fn to_vec(&self) -> Vec<u64> {
        self.numbers.to_vec()
    }
}

impl PartialEq<[u64]> for FieldPath<'_> {
    fn eq(&self, other: &[u64]) -> bool {
        self.numbers == other
    }
}

impl<const N: usize> PartialEq<[u64; N]> for FieldPath<'_> {
    fn eq(&self, other: &[u64; N]) -> bool {
        self.numbers == other
    }
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, number) in self.numbers.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            write!(f, "{}", number)?;
        }
        Ok(())
    }
}

/// Parse the textual form of a field path, eg. `"2:2:1:2"`.
///
/// Surrounding whitespace is ignored. An empty string is the root path.
pub fn parse_field_path(path: &str) -> Result<Vec<u64>, ParseIntError> {
    let path = path.trim();
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split(PATH_SEPARATOR)
        .map(|number| number.trim().parse())
        .collect()
}

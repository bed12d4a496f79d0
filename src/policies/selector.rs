use std::num::ParseIntError;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::protobuf::{Decision, FieldPath, parse_field_path};

/// Decides how to handle fields given a set of target field paths.
///
/// Fields on the way to a target are parsed as embedded messages, targets
/// themselves are captured and everything else is skipped. A path which is
/// both a target and a prefix of another target is parsed as a message so
/// that the deeper target remains reachable.
///
/// This is a building block for policies such as
/// [`FieldCollector`](super::FieldCollector) and
/// [`FeeExtractor`](super::FeeExtractor).
#[derive(Clone, Debug, Default)]
pub struct PathSelector {
    targets: FxHashSet<Vec<u64>>,

    /// All non-empty strict prefixes of `targets`.
    prefixes: FxHashSet<Vec<u64>>,
}

impl PathSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a selector from target paths in textual form, eg. `"2:2:1:1"`.
    pub fn from_paths<S: AsRef<str>>(
        paths: impl IntoIterator<Item = S>,
    ) -> Result<Self, ParseIntError> {
        let mut selector = Self::new();
        for path in paths {
            selector.add_target(&parse_field_path(path.as_ref())?);
        }
        Ok(selector)
    }

    /// Add a target path. Empty paths are ignored.
    pub fn add_target(&mut self, path: &[u64]) {
        if path.is_empty() {
            return;
        }
        for len in 1..path.len() {
            self.prefixes.insert(path[..len].to_vec());
        }
        self.targets.insert(path.to_vec());
    }

    pub fn with_target(mut self, path: &[u64]) -> Self {
        self.add_target(path);
        self
    }

    /// Return the number of distinct target paths.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Return true if `path` is one of the target paths.
    pub fn is_target(&self, path: FieldPath) -> bool {
        self.targets.contains(path.as_slice())
    }

    /// Decide how to handle a length-delimited field numbered `number` in
    /// the message at `parent`.
    pub fn decide(&self, number: u64, parent: FieldPath) -> Decision {
        let mut path: SmallVec<[u64; 16]> = SmallVec::from_slice(parent.as_slice());
        path.push(number);

        if self.prefixes.contains(path.as_slice()) {
            Decision::ParseAsMessage
        } else if self.targets.contains(path.as_slice()) {
            Decision::CaptureBytes
        } else {
            Decision::Skip
        }
    }
}

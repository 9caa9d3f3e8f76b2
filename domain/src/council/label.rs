//! Anonymized response labels.
//!
//! Stage-1 answers are shown to judges as `Response A`, `Response B`, ...
//! so that no judge knows which worker wrote what. [`LabelMap`] is the
//! per-run key that turns labels back into workers during aggregation.

use crate::core::worker::WorkerId;
use crate::council::record::ResponseRecord;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Common prefix of every label.
pub const LABEL_PREFIX: &str = "Response ";

/// An anonymized response identifier such as `"Response B"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Wrap an already-formatted label (e.g. text extracted from a verdict).
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Label for the response at `index` in stage-1 order.
    ///
    /// `0 -> "Response A"`, `25 -> "Response Z"`, `26 -> "Response AA"`.
    pub fn for_index(index: usize) -> Self {
        let mut letters = Vec::new();
        let mut n = index + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        let suffix: String = letters.into_iter().rev().collect();
        Self(format!("{}{}", LABEL_PREFIX, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Bijection between labels and workers for one run
///
/// Built once from the stage-1 records and read-only afterwards.
/// Placeholders get no label, so each answering worker appears exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: Vec<(Label, WorkerId)>,
}

impl LabelMap {
    /// Assign labels to the answered records, in record order.
    ///
    /// A worker that appears twice (which a well-formed stage-1 output never
    /// does for answered records) keeps its first label.
    pub fn from_records(records: &[ResponseRecord]) -> Self {
        let mut entries: Vec<(Label, WorkerId)> = Vec::new();
        for record in records.iter().filter(|r| !r.is_placeholder()) {
            if entries.iter().any(|(_, w)| w == &record.worker) {
                continue;
            }
            entries.push((Label::for_index(entries.len()), record.worker.clone()));
        }
        Self { entries }
    }

    /// Resolve a label; unknown labels yield `None`.
    pub fn resolve(&self, label: &Label) -> Option<&WorkerId> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, w)| w)
    }

    /// Label assigned to a worker, if it answered.
    pub fn label_of(&self, worker: &WorkerId) -> Option<&Label> {
        self.entries
            .iter()
            .find(|(_, w)| w == worker)
            .map(|(l, _)| l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &WorkerId)> {
        self.entries.iter().map(|(l, w)| (l, w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Label, WorkerId)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (Label, WorkerId)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for LabelMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, worker) in &self.entries {
            map.serialize_entry(label, worker)?;
        }
        map.end()
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ids::CollectionId;

/// Which activity of a collection was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompletionKind {
    Flashcards,
    Quiz,
}

impl CompletionKind {
    pub const ALL: [CompletionKind; 2] = [CompletionKind::Flashcards, CompletionKind::Quiz];
}

impl fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionKind::Flashcards => f.write_str("flashcards"),
            CompletionKind::Quiz => f.write_str("quiz"),
        }
    }
}

/// Set of completed collections for one [`CompletionKind`].
///
/// Stored as a JSON array. Older data kept a `{ "<id>": true }` object, which
/// is still accepted when reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletionSet(BTreeSet<CollectionId>);

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSet {
    List(Vec<CollectionId>),
    Flags(BTreeMap<CollectionId, bool>),
}

impl CompletionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection; returns `false` if it was already present.
    pub fn insert(&mut self, id: CollectionId) -> bool {
        self.0.insert(id)
    }

    #[must_use]
    pub fn contains(&self, id: &CollectionId) -> bool {
        self.0.contains(id)
    }

    pub fn extend(&mut self, other: &CompletionSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectionId> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a stored set.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the value is neither an id array nor an
    /// object of flags.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let set = match serde_json::from_str::<StoredSet>(raw)? {
            StoredSet::List(ids) => ids.into_iter().collect(),
            StoredSet::Flags(flags) => flags
                .into_iter()
                .filter_map(|(id, done)| done.then_some(id))
                .collect(),
        };
        Ok(Self(set))
    }

    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<CollectionId> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = CollectionId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

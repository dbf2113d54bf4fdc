//! Generic matching and classification
//!
//! One algorithm, applied per category: key both sides by canonical
//! identity, partition into added / removed / changed / unchanged, and
//! keep every partition sorted by key. Models may expose entries and
//! members in arbitrary order; the `BTreeMap` indexing here is what
//! makes the result (and therefore the rendered report) reproducible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::archive::ArchiveEntry;
use crate::error::PakdiffError;
use crate::model::{ClassSummary, FieldDecl, MethodDecl};

/// Canonical identity and size metric of a diffable item
pub trait DiffKey {
    /// Identity used for matching across two artifacts; lexicographic
    /// ordering of this key defines report order.
    fn key(&self) -> String;

    /// Size/count metric carried into change deltas.
    fn metric(&self) -> u64;

    /// Whether two items with equal identity count as unchanged.
    fn same(&self, other: &Self) -> bool {
        self.metric() == other.metric()
    }
}

impl DiffKey for ArchiveEntry {
    fn key(&self) -> String {
        self.path.clone()
    }

    fn metric(&self) -> u64 {
        self.uncompressed_size
    }

    /// Compressed size alone is compression noise; only content
    /// (checksum) or uncompressed size count as a change.
    fn same(&self, other: &Self) -> bool {
        self.uncompressed_size == other.uncompressed_size && self.crc32 == other.crc32
    }
}

impl DiffKey for ClassSummary {
    fn key(&self) -> String {
        self.name.clone()
    }

    fn metric(&self) -> u64 {
        self.code_size
    }

    fn same(&self, other: &Self) -> bool {
        self.code_size == other.code_size
            && self.method_count == other.method_count
            && self.field_count == other.field_count
    }
}

impl DiffKey for MethodDecl {
    fn key(&self) -> String {
        format!("{} {}{}", self.owner, self.name, self.descriptor)
    }

    fn metric(&self) -> u64 {
        self.code_size
    }
}

impl DiffKey for FieldDecl {
    fn key(&self) -> String {
        format!("{} {}: {}", self.owner, self.name, self.descriptor)
    }

    /// Fields have no size of their own; identity equality is enough.
    fn metric(&self) -> u64 {
        0
    }
}

/// An item present in both artifacts with a detected difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changed<T> {
    /// The item as found in the old artifact
    pub old: T,
    /// The item as found in the new artifact
    pub new: T,
}

impl<T: DiffKey> Changed<T> {
    /// Signed metric delta, new minus old.
    pub fn delta(&self) -> i64 {
        self.new.metric() as i64 - self.old.metric() as i64
    }
}

/// The partitioned outcome of matching one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDiff<T> {
    /// Present only in the new artifact, sorted by key
    pub added: Vec<T>,
    /// Present only in the old artifact, sorted by key
    pub removed: Vec<T>,
    /// Present in both with a difference, sorted by key
    pub changed: Vec<Changed<T>>,
    /// Items present in both and identical
    pub unchanged_count: usize,
    /// Total metric of unchanged items
    pub unchanged_size: u64,
}

// Derived Default would require `T: Default`
impl<T> Default for CategoryDiff<T> {
    fn default() -> Self {
        CategoryDiff {
            added: Vec::new(),
            removed: Vec::new(),
            changed: Vec::new(),
            unchanged_count: 0,
            unchanged_size: 0,
        }
    }
}

impl<T: DiffKey> CategoryDiff<T> {
    /// Whether the category holds no detected difference at all.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Net metric delta of this category:
    /// `Σ added − Σ removed + Σ changed deltas`.
    pub fn net_delta(&self) -> i64 {
        let added: i64 = self.added.iter().map(|i| i.metric() as i64).sum();
        let removed: i64 = self.removed.iter().map(|i| i.metric() as i64).sum();
        let changed: i64 = self.changed.iter().map(Changed::delta).sum();
        added - removed + changed
    }
}

/// Match one category of the old and new models.
///
/// # Errors
///
/// Returns [`PakdiffError::UnmatchedCategory`] when one side contains
/// two items with the same identity; that violates the model
/// construction contract and is a defect, not a recoverable state.
pub(crate) fn partition<T: DiffKey + Clone>(
    category: &'static str,
    old: &[T],
    new: &[T],
) -> Result<CategoryDiff<T>, PakdiffError> {
    let old_map = index(category, old)?;
    let new_map = index(category, new)?;

    let mut result = CategoryDiff::default();
    for (key, old_item) in &old_map {
        match new_map.get(key) {
            None => result.removed.push(old_item.clone()),
            Some(new_item) if old_item.same(new_item) => {
                result.unchanged_count += 1;
                result.unchanged_size += old_item.metric();
            }
            Some(new_item) => result.changed.push(Changed {
                old: old_item.clone(),
                new: new_item.clone(),
            }),
        }
    }
    for (key, new_item) in &new_map {
        if !old_map.contains_key(key) {
            result.added.push(new_item.clone());
        }
    }

    Ok(result)
}

fn index<T: DiffKey + Clone>(
    category: &'static str,
    items: &[T],
) -> Result<BTreeMap<String, T>, PakdiffError> {
    let mut map = BTreeMap::new();
    for item in items {
        let key = item.key();
        if map.insert(key.clone(), item.clone()).is_some() {
            return Err(PakdiffError::UnmatchedCategory { category, key });
        }
    }
    Ok(map)
}

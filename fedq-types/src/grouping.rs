//! Grouping keys and the structurally keyed grouping map.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::canonical::CanonicalKey;
use crate::value::Value;

/// The tuple of group-by values identifying one group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupKey(Vec<Value>);

impl GroupKey {
    pub fn new(values: Vec<Value>) -> Self {
        GroupKey(values)
    }

    /// Key of the single group used when no group-by columns are given.
    pub fn empty() -> Self {
        GroupKey(Vec::new())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Tuple(self.0)
    }
}

impl CanonicalKey for GroupKey {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        self.0.as_slice().write_canonical(out);
    }
}

impl From<Vec<Value>> for GroupKey {
    fn from(values: Vec<Value>) -> Self {
        GroupKey(values)
    }
}

impl FromIterator<Value> for GroupKey {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        GroupKey(iter.into_iter().collect())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

/// Per-group state keyed by structural equality of [`GroupKey`]s.
///
/// Slots are addressed by the canonical encoding of the key, so a key built
/// independently from equal values (for example a freshly decoded record)
/// finds the slot created by an earlier record. Entries are kept in insertion
/// order and are never removed.
#[derive(Clone, Debug)]
pub struct GroupingMap<V> {
    index: FxHashMap<Box<[u8]>, usize>,
    entries: Vec<(GroupKey, V)>,
}

impl<V> Default for GroupingMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> GroupingMap<V> {
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(capacity);
        Self {
            index,
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    fn slot(&self, key: &GroupKey) -> Option<usize> {
        self.index.get(key.canonical_bytes().as_slice()).copied()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&V> {
        self.slot(key).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &GroupKey) -> Option<&mut V> {
        self.slot(key).map(move |idx| &mut self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &GroupKey) -> bool {
        self.slot(key).is_some()
    }

    /// Store `value` for `key`, returning the value it replaced.
    pub fn set(&mut self, key: GroupKey, value: V) -> Option<V> {
        let encoded = key.canonical_bytes().into_boxed_slice();
        if let Some(&idx) = self.index.get(&encoded) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }
        self.index.insert(encoded, self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Return the slot for `key`, creating it with `init` if absent.
    pub fn get_or_insert_with<F>(&mut self, key: &GroupKey, init: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let encoded = key.canonical_bytes().into_boxed_slice();
        let idx = match self.index.get(&encoded) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(encoded, idx);
                self.entries.push((key.clone(), init()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<V> IntoIterator for GroupingMap<V> {
    type Item = (GroupKey, V);
    type IntoIter = std::vec::IntoIter<(GroupKey, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

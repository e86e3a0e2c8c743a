//! Deduplicating intern tables
//!
//! Workbooks reference shared strings and styles by index. An
//! [`InternTable`] hands out those indices: identical keys get the same
//! index, new keys are appended, nothing is ever removed.

use std::hash::{Hash, Hasher};

use ahash::AHashMap;

/// Append-only table mapping keys to stable `u32` indices
#[derive(Debug, Clone)]
pub struct InternTable<K = String> {
    /// Entries in insertion order
    entries: Vec<K>,
    /// Key → first index holding it
    index_map: AHashMap<K, u32>,
}

impl<K> Default for InternTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index_map: AHashMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> InternTable<K> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the index for a key, appending it if it is new
    pub fn intern(&mut self, key: K) -> u32 {
        if let Some(&idx) = self.index_map.get(&key) {
            return idx;
        }
        let idx = self.entries.len() as u32;
        self.index_map.insert(key.clone(), idx);
        self.entries.push(key);
        idx
    }

    /// Append a key unconditionally, returning its new index
    ///
    /// Lookups through [`index_of`](Self::index_of) keep resolving to the
    /// first copy of a duplicated key.
    pub fn force_intern(&mut self, key: K) -> u32 {
        let idx = self.entries.len() as u32;
        self.index_map.entry(key.clone()).or_insert(idx);
        self.entries.push(key);
        idx
    }

    /// Get a key by index
    pub fn get(&self, index: u32) -> Option<&K> {
        self.entries.get(index as usize)
    }

    /// Get the index of a key without inserting it
    pub fn index_of(&self, key: &K) -> Option<u32> {
        self.index_map.get(key).copied()
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries with their indices
    pub fn iter(&self) -> impl Iterator<Item = (u32, &K)> {
        self.entries.iter().enumerate().map(|(i, k)| (i as u32, k))
    }
}

impl InternTable<String> {
    /// Look up a string key by `&str`
    pub fn index_of_str(&self, key: &str) -> Option<u32> {
        self.index_map.get(key).copied()
    }
}

#[cfg(feature = "serde")]
impl<K: serde::Serialize> serde::Serialize for InternTable<K> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, K> serde::Deserialize<'de> for InternTable<K>
where
    K: serde::Deserialize<'de> + Hash + Eq + Clone,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<K>::deserialize(deserializer)?;
        let mut table = InternTable::new();
        for entry in entries {
            table.force_intern(entry);
        }
        Ok(table)
    }
}

/// Hash canonical bytes into a 64-bit key
///
/// Used to key the style table: callers serialize a style to its canonical
/// byte form and intern the resulting hash.
pub fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = ahash::AHasher::default();
    bytes.hash(&mut hasher);
    hasher.finish()
}

//! Insertion-ordered dict objects.

use hashbrown::HashTable;

use crate::{
    exception::{ExcType, RunResult},
    hashing::str_hash,
    heap::Heap,
    intern::Interns,
    resource::ResourceTracker,
    value::Value,
};

/// A mapping preserving insertion order.
///
/// # Storage Strategy
/// Uses a `HashTable<usize>` for hash lookups combined with a dense
/// `Vec<DictEntry>` that preserves insertion order. The hash table maps key
/// hashes to indices in the entries vector, giving O(1) lookups while keeping
/// deterministic iteration order — which matters here because unmatched
/// keyword arguments must be reported in the order the caller wrote them.
#[derive(Debug, Default)]
pub struct Dict {
    /// indices mapping from the entry hash to its index.
    indices: HashTable<usize>,
    /// entries is a dense vec maintaining entry order.
    entries: Vec<DictEntry>,
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
struct DictEntry {
    key: Value,
    value: Value,
    /// the hash is kept per entry so the index can be rebuilt without
    /// re-reading key content from the heap
    hash: u64,
}

impl Dict {
    /// Creates a new empty dict.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dict has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces an entry.
    ///
    /// # Errors
    /// Returns a `TypeError` if the key is an unhashable type (list, dict).
    pub fn set(
        &mut self,
        key: Value,
        value: Value,
        heap: &Heap<impl ResourceTracker>,
        interns: &Interns,
    ) -> RunResult<()> {
        let Some(hash) = key.key_hash(heap, interns) else {
            return Err(ExcType::type_error_unhashable(key.type_of(heap)));
        };
        let entries = &self.entries;
        let found = self
            .indices
            .find(hash, |&i| {
                entries[i].hash == hash && entries[i].key.equals(key, heap, interns)
            })
            .copied();
        match found {
            Some(i) => self.entries[i].value = value,
            None => {
                let i = self.entries.len();
                self.indices.insert_unique(hash, i, |&j| self.entries[j].hash);
                self.entries.push(DictEntry { key, value, hash });
            }
        }
        Ok(())
    }

    /// Looks up a value by string key.
    ///
    /// Used for keyword-argument matching, where keys are parameter names.
    #[must_use]
    pub fn get_str(&self, name: &str, heap: &Heap<impl ResourceTracker>, interns: &Interns) -> Option<Value> {
        let hash = str_hash(name);
        let entries = &self.entries;
        self.indices
            .find(hash, |&i| {
                entries[i].hash == hash && entries[i].key.as_str(heap, interns) == Some(name)
            })
            .map(|&i| entries[i].value)
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> DictIter<'_> {
        DictIter(self.entries.iter())
    }

    /// Rebuilds the hash index from entries with precomputed hashes.
    fn from_entries(entries: Vec<DictEntry>) -> Self {
        let mut indices = HashTable::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            indices.insert_unique(entry.hash, i, |&j| entries[j].hash);
        }
        Self { indices, entries }
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (Value, Value);
    type IntoIter = DictIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over dict `(key, value)` pairs in insertion order.
#[derive(Debug)]
pub struct DictIter<'a>(std::slice::Iter<'a, DictEntry>);

impl Iterator for DictIter<'_> {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|e| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for DictIter<'_> {}

impl serde::Serialize for Dict {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = serializer.serialize_struct("Dict", 1)?;
        st.serialize_field("entries", &self.entries)?;
        st.end()
    }
}

impl<'de> serde::Deserialize<'de> for Dict {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct DictRepr {
            entries: Vec<DictEntry>,
        }
        let repr = DictRepr::deserialize(deserializer)?;
        Ok(Self::from_entries(repr.entries))
    }
}

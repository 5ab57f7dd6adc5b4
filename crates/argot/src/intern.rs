//! String interning for identifiers crossing the host/script call boundary.
//!
//! Keyword-argument names and short string values arrive at native functions
//! many times over; interning stores each unique string once and hands out a
//! compact [`StringId`] index. Lookups are needed only for keyword matching
//! and diagnostics, so the interner optimizes for cheap `intern` + `get_str`.

use ahash::AHashMap;

/// Index into the string interner's storage.
///
/// Uses `u32` to save space; ~4 billion unique interns is more than enough
/// for any realistic embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct StringId(u32);

impl StringId {
    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interned string storage.
///
/// Strings are stored in insertion order; `lookup` is backed by a hash map so
/// re-interning an existing string is O(1) and returns the original id.
#[derive(Debug, Default)]
pub struct Interns {
    strings: Vec<String>,
    lookup: AHashMap<String, StringId>,
}

impl Interns {
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string, returning its id.
    ///
    /// Returns the existing id if the string was interned before.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }
        let id = StringId(u32::try_from(self.strings.len()).expect("interner overflow"));
        self.strings.push(s.to_owned());
        self.lookup.insert(s.to_owned(), id);
        id
    }

    /// Returns the string content for an id.
    ///
    /// # Panics
    /// Panics if the id did not come from this interner.
    #[must_use]
    pub fn get_str(&self, id: StringId) -> &str {
        &self.strings[id.index()]
    }

    /// Returns the id for a string if it has been interned.
    #[must_use]
    pub fn get(&self, s: &str) -> Option<StringId> {
        self.lookup.get(s).copied()
    }

    /// Number of interned strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns true if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

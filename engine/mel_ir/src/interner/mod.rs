//! String interner backing [`Name`].
//!
//! Interned strings are leaked so lookups can hand out `&'static str`
//! without lifetime plumbing through the parser and evaluator. The interner
//! lives for the whole embedding; the leak is bounded by the set of distinct
//! identifiers and string literals ever compiled.
//!
//! A single `RwLock` guards the storage. Evaluation is single-threaded, but
//! the interner is shared across engine instances (one per event dispatch or
//! script run), so reads from concurrent embedder threads stay safe.

use crate::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

struct InternStore {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name::raw`.
    strings: Vec<&'static str>,
}

/// String interner providing O(1) interning and lookup.
pub struct Interner {
    store: RwLock<InternStore>,
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        let empty: &'static str = "";
        map.insert(empty, 0);
        Interner {
            store: RwLock::new(InternStore {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its `Name`.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned.
        {
            let guard = self.store.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name::from_raw(idx);
            }
        }

        let mut guard = self.store.write();
        // Re-check under the write lock; another thread may have won.
        if let Some(&idx) = guard.map.get(s) {
            return Name::from_raw(idx);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).unwrap_or_else(|_| {
            // Over 4 billion distinct strings; the embedding has bigger problems.
            panic!("interner capacity exceeded")
        });
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Intern an owned string without re-allocating its contents.
    pub fn intern_owned(&self, s: String) -> Name {
        {
            let guard = self.store.read();
            if let Some(&idx) = guard.map.get(s.as_str()) {
                return Name::from_raw(idx);
            }
        }
        let mut guard = self.store.write();
        if let Some(&idx) = guard.map.get(s.as_str()) {
            return Name::from_raw(idx);
        }
        let leaked: &'static str = Box::leak(s.into_boxed_str());
        let idx = u32::try_from(guard.strings.len())
            .unwrap_or_else(|_| panic!("interner capacity exceeded"));
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Look up the string for a `Name`.
    ///
    /// Interned strings are leaked, so the reference is `'static`.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.store.read();
        guard.strings[name.index()]
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.store.read().strings.len()
    }

    /// Whether the interner holds only the pre-interned empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;

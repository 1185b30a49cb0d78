//! Symbol interning shared by words, set/get/lit-words, refinement names, path
//! segments, and object field names.
//!
//! Grounded on the teacher's string-interning module (`intern.rs`): an append-only
//! table mapping strings to small integer IDs so that symbol comparison anywhere in
//! the runtime (word equality, path segment lookup, `select`'s "lit-word and word
//! compare as the same symbol" rule) is an integer compare. Unlike the teacher, Viro
//! only interns identifiers — string *literals* are ordinary owned `String`s inside
//! series buffers, since they are mutable values, not immutable constants.

use ahash::AHashMap;

/// Interned identifier. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Process-wide (or per-evaluator) symbol table.
#[derive(Debug, Default)]
pub struct Symbols {
    by_name: AHashMap<String, SymbolId>,
    names: Vec<String>,
}

impl Symbols {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `name`, returning its stable ID. Repeated calls with an equal string
    /// return the same ID.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = SymbolId(u32::try_from(self.names.len()).expect("symbol table overflow"));
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Resolves an already-interned ID back to its textual spelling.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this table — an internal-consistency bug.
    #[must_use]
    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id.index()]
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable_and_deduplicates() {
        let mut syms = Symbols::new();
        let a = syms.intern("foo");
        let b = syms.intern("bar");
        let c = syms.intern("foo");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(syms.name(a), "foo");
        assert_eq!(syms.name(b), "bar");
    }
}

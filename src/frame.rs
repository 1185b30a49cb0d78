//! Frame store & binding environment (§3.3/§4.D).
//!
//! Grounded on the teacher's `namespace.rs`: an index-addressed arena (`Namespaces {
//! stack: Vec<Namespace> }`) so that closures and prototype chains can reference a
//! parent frame by index without forming an ownership cycle. The teacher resolves
//! variables by a compile-time slot index into a `Vec<Value>`; Viro has no compile
//! step, so frames here are `IndexMap<SymbolId, Binding>` resolved dynamically by
//! symbol, with `IndexMap` (not `Vec`) giving the insertion-ordered reflection
//! `all_bindings()`/§4.D requires directly.

use indexmap::IndexMap;

use crate::{error::Error, symbol::SymbolId, value::Value};

/// Index into the frame arena. Stable for the lifetime of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u32);

impl FrameId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Frame index of the root frame, created first and never removed (§3.3).
pub const ROOT_FRAME: FrameId = FrameId(0);

/// Disambiguates lookup semantics where the evaluator cares (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Root,
    Lexical,
    Object,
    /// Scratch frame collecting an `object`/`make object!` spec block's
    /// top-level set-words (§4.I.1): a re-`put` of a name already bound
    /// locally here is a duplicate field, not an ordinary reassignment.
    ObjectSpec,
}

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    mutable: bool,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    parent: Option<FrameId>,
    bindings: IndexMap<SymbolId, Binding>,
}

/// The process-wide (per-evaluator) frame arena.
#[derive(Debug)]
pub struct Frames {
    arena: Vec<Frame>,
}

impl Frames {
    /// Creates the arena with the root frame pre-allocated at index 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: vec![Frame {
                kind: FrameKind::Root,
                parent: None,
                bindings: IndexMap::new(),
            }],
        }
    }

    /// Appends a new frame with the given parent and kind. O(1).
    pub fn new_frame(&mut self, parent: Option<FrameId>, kind: FrameKind) -> FrameId {
        let id = FrameId(u32::try_from(self.arena.len()).expect("frame arena overflow"));
        self.arena.push(Frame {
            kind,
            parent,
            bindings: IndexMap::new(),
        });
        id
    }

    #[must_use]
    pub fn kind(&self, frame: FrameId) -> FrameKind {
        self.arena[frame.index()].kind
    }

    #[must_use]
    pub fn parent(&self, frame: FrameId) -> Option<FrameId> {
        self.arena[frame.index()].parent
    }

    /// Walks the parent chain for `symbol`, returning the value and the frame that
    /// owns the binding.
    pub fn get(&self, frame: FrameId, symbol: SymbolId) -> Option<(Value, FrameId)> {
        let mut current = Some(frame);
        while let Some(id) = current {
            if let Some(binding) = self.arena[id.index()].bindings.get(&symbol) {
                return Some((binding.value.clone(), id));
            }
            current = self.arena[id.index()].parent;
        }
        None
    }

    /// Writes to the frame that owns `symbol` in the chain, else creates it locally
    /// in `frame` (§4.D `put`).
    pub fn put(&mut self, frame: FrameId, symbol: SymbolId, value: Value) -> Result<(), Error> {
        let mut current = Some(frame);
        while let Some(id) = current {
            if let Some(binding) = self.arena[id.index()].bindings.get_mut(&symbol) {
                binding.value = value;
                return Ok(());
            }
            current = self.arena[id.index()].parent;
        }
        self.define(frame, symbol, value);
        Ok(())
    }

    /// Creates `symbol` locally in `frame` regardless of parent bindings (§4.D `define`).
    pub fn define(&mut self, frame: FrameId, symbol: SymbolId, value: Value) {
        self.arena[frame.index()].bindings.insert(symbol, Binding { value, mutable: true });
    }

    /// True if `symbol` is bound directly in `frame` (not walking parents).
    #[must_use]
    pub fn has_local(&self, frame: FrameId, symbol: SymbolId) -> bool {
        self.arena[frame.index()].bindings.contains_key(&symbol)
    }

    /// Removes a local binding, returning its prior value if present. Used by the
    /// no-scope call protocol's save/restore discipline (§4.G.2 step 4).
    pub fn remove_local(&mut self, frame: FrameId, symbol: SymbolId) -> Option<Value> {
        self.arena[frame.index()]
            .bindings
            .shift_remove(&symbol)
            .map(|b| b.value)
    }

    /// Insertion-ordered list of `(symbol, value)` pairs for reflection (`words-of`/
    /// `values-of`).
    #[must_use]
    pub fn all_bindings(&self, frame: FrameId) -> Vec<(SymbolId, Value)> {
        self.arena[frame.index()]
            .bindings
            .iter()
            .map(|(sym, b)| (*sym, b.value.clone()))
            .collect()
    }
}

impl Default for Frames {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbols;

    #[test]
    fn put_walks_parent_chain_but_define_is_local() {
        let mut symbols = Symbols::new();
        let sym = symbols.intern("x");
        let mut frames = Frames::new();
        frames.define(ROOT_FRAME, sym, Value::None);
        let child = frames.new_frame(Some(ROOT_FRAME), FrameKind::Lexical);
        // put() should find the symbol in root and update it there, not shadow it.
        frames.put(child, sym, Value::Logic(true)).unwrap();
        assert!(!frames.has_local(child, sym));
        assert_eq!(frames.get(ROOT_FRAME, sym).unwrap().0, Value::Logic(true));
    }
}

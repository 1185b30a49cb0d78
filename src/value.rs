//! The tagged value universe (§3.1) plus `Mold`/`Form` text projections (§4.A).
//!
//! Grounded on the teacher's `value.rs`: a hybrid design where small immediate values
//! are stored inline and reference-typed values point at shared, heap-allocated data.
//! The teacher routes every heap value through one central arena (`Ref(HeapId)`) with
//! manual refcounting, because it also needs to serialize/snapshot that arena for
//! session forking. Viro has no snapshot feature (out of scope per §1), so reference
//! kinds here hold `Rc`/`Rc<RefCell<_>>` directly — same "shared mutable buffer"
//! semantics (§3.2), far less bookkeeping. Frames (`FrameId`, see `frame.rs`) are the
//! one place that keeps the teacher's index-arena shape, because §3.3 asks for it by
//! name (closures and prototype chains need cycle-safe parent links).

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    decimal::Decimal,
    error::{self, EvalResult},
    function::FunctionData,
    series::Series,
    symbol::{SymbolId, Symbols},
};

/// A first-class datatype token, e.g. `integer!`. Also used as the dispatch key for
/// the action registry (§4.E) and as the `type?` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    Logic,
    Integer,
    Decimal,
    String,
    Binary,
    Block,
    Paren,
    Word,
    SetWord,
    GetWord,
    LitWord,
    Path,
    SetPath,
    GetPath,
    Datatype,
    Bitset,
    Function,
    Object,
    Port,
    Error,
}

impl ValueType {
    /// Type names render with a trailing `!` (e.g. `integer!`) per §4.A.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none!",
            Self::Logic => "logic!",
            Self::Integer => "integer!",
            Self::Decimal => "decimal!",
            Self::String => "string!",
            Self::Binary => "binary!",
            Self::Block => "block!",
            Self::Paren => "paren!",
            Self::Word => "word!",
            Self::SetWord => "set-word!",
            Self::GetWord => "get-word!",
            Self::LitWord => "lit-word!",
            Self::Path => "path!",
            Self::SetPath => "set-path!",
            Self::GetPath => "get-path!",
            Self::Datatype => "datatype!",
            Self::Bitset => "bitset!",
            Self::Function => "function!",
            Self::Object => "object!",
            Self::Port => "port!",
            Self::Error => "error!",
        }
    }
}

/// One segment of a path expression (§3.1/§4.C). The first segment of a parsed path
/// is always a word (the base symbol resolved in the current frame chain, §4.I.2);
/// later segments may additionally be an index or a paren to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Word(SymbolId),
    Index(i64),
    Paren(Series),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathData {
    pub segments: Vec<PathSegment>,
}

/// A character/byte membership set (§3.1). Stored as a sparse set of code points —
/// simple and correct; the spec does not require a packed bitmap representation.
#[derive(Debug, Default)]
pub struct BitsetData(pub std::collections::BTreeSet<u32>);

/// Minimal port shape (§3.1/§6): scheme + location + state. The driver vtable itself
/// is an out-of-scope host collaborator — the core only owns this handle shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Closed,
    Open,
    Eof,
    Error,
}

#[derive(Debug)]
pub struct PortData {
    pub scheme: SymbolId,
    pub location: String,
    pub state: PortState,
}

#[derive(Debug, Clone)]
pub enum Value {
    None,
    Logic(bool),
    Integer(i64),
    Decimal(Decimal),
    String(Series),
    Binary(Series),
    Block(Series),
    Paren(Series),
    Word(SymbolId),
    SetWord(SymbolId),
    GetWord(SymbolId),
    LitWord(SymbolId),
    Path(Rc<PathData>),
    SetPath(Rc<PathData>),
    GetPath(Rc<PathData>),
    Datatype(ValueType),
    Bitset(Rc<RefCell<BitsetData>>),
    Function(Rc<FunctionData>),
    /// An object's own frame index (see `frame.rs`); the frame arena is the shared
    /// mutable store, so no extra `Rc<RefCell<_>>` wrapper is needed here.
    Object(crate::frame::FrameId),
    Port(Rc<RefCell<PortData>>),
    Error(Rc<error::Error>),
}

impl Value {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::None => ValueType::None,
            Self::Logic(_) => ValueType::Logic,
            Self::Integer(_) => ValueType::Integer,
            Self::Decimal(_) => ValueType::Decimal,
            Self::String(_) => ValueType::String,
            Self::Binary(_) => ValueType::Binary,
            Self::Block(_) => ValueType::Block,
            Self::Paren(_) => ValueType::Paren,
            Self::Word(_) => ValueType::Word,
            Self::SetWord(_) => ValueType::SetWord,
            Self::GetWord(_) => ValueType::GetWord,
            Self::LitWord(_) => ValueType::LitWord,
            Self::Path(_) => ValueType::Path,
            Self::SetPath(_) => ValueType::SetPath,
            Self::GetPath(_) => ValueType::GetPath,
            Self::Datatype(_) => ValueType::Datatype,
            Self::Bitset(_) => ValueType::Bitset,
            Self::Function(_) => ValueType::Function,
            Self::Object(_) => ValueType::Object,
            Self::Port(_) => ValueType::Port,
            Self::Error(_) => ValueType::Error,
        }
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::None | Self::Logic(false))
    }

    /// Structural equality (§4.A): by value for immutable kinds, element-wise from
    /// the current head for series. Reference kinds without a documented value
    /// comparison (function, object, port) compare by identity.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Logic(a), Self::Logic(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a.cmp_value(b) == std::cmp::Ordering::Equal,
            (Self::String(a), Self::String(b)) | (Self::Binary(a), Self::Binary(b)) => a.equals(b),
            (Self::Block(a), Self::Block(b)) | (Self::Paren(a), Self::Paren(b)) => a.equals(b),
            (Self::Word(a), Self::Word(b))
            | (Self::SetWord(a), Self::SetWord(b))
            | (Self::GetWord(a), Self::GetWord(b))
            | (Self::LitWord(a), Self::LitWord(b)) => a == b,
            (Self::Path(a), Self::Path(b))
            | (Self::SetPath(a), Self::SetPath(b))
            | (Self::GetPath(a), Self::GetPath(b)) => a.segments == b.segments,
            (Self::Datatype(a), Self::Datatype(b)) => a == b,
            (Self::Bitset(a), Self::Bitset(b)) => Rc::ptr_eq(a, b) || a.borrow().0 == b.borrow().0,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Port(a), Self::Port(b)) => Rc::ptr_eq(a, b),
            (Self::Error(a), Self::Error(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Fresh-buffer copy for reference types; value copy (no-op) for immediates. Used
    /// by `copy`/`copy --part` (§4.H) and by `make`'s field inheritance (§4.I).
    #[must_use]
    pub fn copy(&self) -> Self {
        match self {
            Self::String(s) => Self::String(s.copy(None)),
            Self::Binary(s) => Self::Binary(s.copy(None)),
            Self::Block(s) => Self::Block(s.copy(None)),
            Self::Paren(s) => Self::Paren(s.copy(None)),
            other => other.clone(),
        }
    }

    /// Re-parseable text projection (§4.A).
    #[must_use]
    pub fn mold(&self, symbols: &Symbols) -> String {
        let mut out = String::new();
        self.mold_into(symbols, &mut out);
        out
    }

    /// Human-presentation text projection (§4.A): strings lose their quotes, and a
    /// top-level block loses its brackets (the `print`/`form` convention).
    #[must_use]
    pub fn form(&self, symbols: &Symbols) -> String {
        match self {
            Self::String(s) => s.with_str(|s| s.to_string()),
            Self::Block(s) | Self::Paren(s) => {
                let mut out = String::new();
                s.for_each(|v, i| {
                    if i > 0 {
                        out.push(' ');
                    }
                    v.mold_into(symbols, &mut out);
                });
                out
            }
            other => other.mold(symbols),
        }
    }

    fn mold_into(&self, symbols: &Symbols, out: &mut String) {
        match self {
            Self::None => out.push_str("none"),
            Self::Logic(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Integer(i) => out.push_str(&i.to_string()),
            Self::Decimal(d) => out.push_str(&d.to_string()),
            Self::String(s) => {
                out.push('"');
                s.with_str(|text| {
                    for ch in text.chars() {
                        match ch {
                            '"' => out.push_str("^\""),
                            '\\' => out.push_str("^^"),
                            '\n' => out.push_str("^/"),
                            _ => out.push(ch),
                        }
                    }
                });
                out.push('"');
            }
            Self::Binary(s) => {
                out.push_str("#{");
                let bytes = s.to_bytes();
                let truncate = bytes.len() > 64;
                let shown = if truncate { &bytes[..8] } else { &bytes[..] };
                for (i, b) in shown.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(&format!("{b:02X}"));
                }
                if truncate {
                    out.push_str(&format!(" ... ({} bytes)", bytes.len()));
                }
                out.push('}');
            }
            Self::Block(s) | Self::Paren(s) => {
                let (open, close) = if matches!(self, Self::Paren(_)) { ('(', ')') } else { ('[', ']') };
                out.push(open);
                s.for_each(|v, i| {
                    if i > 0 {
                        out.push(' ');
                    }
                    v.mold_into(symbols, out);
                });
                out.push(close);
            }
            Self::Word(sym) => out.push_str(symbols.name(*sym)),
            Self::SetWord(sym) => {
                out.push_str(symbols.name(*sym));
                out.push(':');
            }
            Self::GetWord(sym) => {
                out.push(':');
                out.push_str(symbols.name(*sym));
            }
            Self::LitWord(sym) => {
                out.push('\'');
                out.push_str(symbols.name(*sym));
            }
            Self::Path(p) | Self::GetPath(p) | Self::SetPath(p) => {
                if matches!(self, Self::GetPath(_)) {
                    out.push(':');
                }
                for (i, seg) in p.segments.iter().enumerate() {
                    if i > 0 {
                        out.push('.');
                    }
                    match seg {
                        PathSegment::Word(sym) => out.push_str(symbols.name(*sym)),
                        PathSegment::Index(n) => out.push_str(&n.to_string()),
                        PathSegment::Paren(s) => {
                            out.push('(');
                            s.for_each(|v, i| {
                                if i > 0 {
                                    out.push(' ');
                                }
                                v.mold_into(symbols, out);
                            });
                            out.push(')');
                        }
                    }
                }
                if matches!(self, Self::SetPath(_)) {
                    out.push(':');
                }
            }
            Self::Datatype(t) => out.push_str(t.name()),
            Self::Bitset(_) => out.push_str("make bitset! []"),
            Self::Function(_) => out.push_str("make function! []"),
            Self::Object(_) => out.push_str("make object! []"),
            Self::Port(_) => out.push_str("make port! []"),
            Self::Error(e) => out.push_str(&format!("make error! [{}]", e.id())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value_type().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_have_bang_suffix() {
        assert_eq!(Value::Integer(1).value_type().name(), "integer!");
        assert_eq!(Value::None.value_type().name(), "none!");
    }

    #[test]
    fn integer_equality_is_by_value() {
        assert!(Value::Integer(42).equals(&Value::Integer(42)));
        assert!(!Value::Integer(42).equals(&Value::Integer(43)));
    }
}

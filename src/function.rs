//! Function/refinement call protocol (§4.G): parameter specs, the native call
//! table shape, and frame setup for a user function call.
//!
//! Grounded on the teacher's `function.rs`/`signature.rs`, which separate "what a
//! callable expects" (a signature) from "the code that runs" (bytecode or a native
//! pointer). Viro keeps that split — [`Param`] is the signature, [`FunctionData`]
//! is the callable — but the signature vocabulary is REBOL-family: positional
//! parameters that may be literal (lit-word, unevaluated) or evaluated, plus
//! `--name [value]` refinements, rather than Python's positional/keyword/defaults.

use smallvec::SmallVec;

use crate::{
    error::{self, EvalResult},
    frame::{FrameId, FrameKind, Frames},
    series::Series,
    symbol::{SymbolId, Symbols},
    value::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// A plain positional argument. `literal` parameters receive the call-site
    /// expression unevaluated (lit-word parameter, §4.G.1).
    Positional { literal: bool },
    /// A `--name` refinement. `value_param` is set when the refinement also binds
    /// a following value (`--part count`); `None` means it is a bare flag.
    Refinement { value_param: Option<SymbolId> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: SymbolId,
    pub kind: ParamKind,
}

impl Param {
    #[must_use]
    pub fn is_refinement(&self) -> bool {
        matches!(self.kind, ParamKind::Refinement { .. })
    }
}

/// Parses a function spec block (e.g. `[a 'b --part count]`) into its parameter
/// list (§4.G.1). Word → evaluated positional, lit-word → unevaluated positional,
/// a word spelled `--name` → refinement, optionally followed by one more plain
/// word naming the value it binds.
pub fn parse_spec(spec: &Series, symbols: &Symbols) -> EvalResult<Vec<Param>> {
    let mut params = Vec::new();
    let mut i = 1usize;
    let len = spec.length();
    while i as usize <= len {
        let value = spec.pick(i as i64)?;
        match value {
            Value::Word(name) => {
                if symbols.name(name).starts_with("--") {
                    let mut value_param = None;
                    if (i + 1) as usize <= len {
                        if let Value::Word(next) = spec.pick(i as i64 + 1)? {
                            if !symbols.name(next).starts_with("--") {
                                value_param = Some(next);
                                i += 1;
                            }
                        }
                    }
                    params.push(Param { name, kind: ParamKind::Refinement { value_param } });
                } else {
                    params.push(Param { name, kind: ParamKind::Positional { literal: false } });
                }
            }
            Value::LitWord(name) => {
                params.push(Param { name, kind: ParamKind::Positional { literal: true } });
            }
            other => {
                return Err(error::syntax_error(format!(
                    "function spec expects word or lit-word parameters, got {}",
                    other.value_type().name()
                )));
            }
        }
        i += 1;
    }
    Ok(params)
}

/// Positional args (already resolved per §4.G.1) plus any refinements the call
/// site supplied, each with its evaluated value (`None` for a bare flag). `frame`
/// is the lexical frame the call was made from — natives that themselves
/// evaluate a block argument (`if`, `while`, `do`, `fn`'s closure capture) need it
/// to stay lexically scoped rather than always running at the root frame.
#[derive(Debug)]
pub struct CallArgs {
    pub positional: SmallVec<[Value; 4]>,
    pub refinements: Vec<(SymbolId, Option<Value>)>,
    pub frame: FrameId,
}

impl CallArgs {
    #[must_use]
    pub fn new(frame: FrameId) -> Self {
        Self {
            positional: SmallVec::new(),
            refinements: Vec::new(),
            frame,
        }
    }

    #[must_use]
    pub fn refinement(&self, name: SymbolId) -> Option<&Option<Value>> {
        self.refinements.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

pub type NativeFn = fn(&mut crate::eval::Evaluator, &CallArgs) -> EvalResult<Value>;

/// A callable value: either a Rust-native implementation or a user-defined
/// closure over a block body and its defining lexical frame (§3.1/§4.G).
#[derive(Debug)]
pub enum FunctionData {
    Native {
        name: SymbolId,
        params: Vec<Param>,
        func: NativeFn,
        /// Whether this native also participates in the infix call-chain fold
        /// (§4.F.1): the arithmetic/comparison operators (`+ - * / = < > ...`)
        /// may appear either as an ordinary prefix call or mid-statement, using
        /// the value already produced to their left as the first argument.
        infix: bool,
    },
    User {
        params: Vec<Param>,
        body: Series,
        parent_frame: FrameId,
        /// `--no-scope` (§4.G.2 step 4): the call binds parameters into the
        /// caller's own frame instead of a fresh child frame.
        no_scope: bool,
    },
}

impl FunctionData {
    #[must_use]
    pub fn params(&self) -> &[Param] {
        match self {
            Self::Native { params, .. } => params,
            Self::User { params, .. } => params,
        }
    }

    #[must_use]
    pub fn is_infix(&self) -> bool {
        matches!(self, Self::Native { infix: true, .. })
    }
}

impl PartialEq for FunctionData {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

/// Builds the lexical frame for a user function call: one child of the function's
/// defining frame (not the caller's frame, giving lexical rather than dynamic
/// scoping), with each parameter bound to its resolved argument (§4.G.2).
pub fn bind_user_call(frames: &mut Frames, params: &[Param], args: &CallArgs, parent_frame: FrameId) -> EvalResult<FrameId> {
    let call_frame = frames.new_frame(Some(parent_frame), FrameKind::Lexical);
    let mut positional_iter = args.positional.iter();
    for param in params {
        match &param.kind {
            ParamKind::Positional { .. } => {
                let value = positional_iter
                    .next()
                    .cloned()
                    .ok_or_else(|| error::arg_count("function call", params.iter().filter(|p| !p.is_refinement()).count(), args.positional.len()))?;
                frames.define(call_frame, param.name, value);
            }
            ParamKind::Refinement { value_param } => {
                let present = args.refinement(param.name);
                frames.define(call_frame, param.name, Value::Logic(present.is_some()));
                if let Some(value_name) = value_param {
                    let value = present.and_then(Clone::clone).unwrap_or(Value::None);
                    frames.define(call_frame, *value_name, value);
                }
            }
        }
    }
    Ok(call_frame)
}

/// Binds a `--no-scope` call's parameters directly into the caller's `frame`,
/// saving any preexisting local bindings so [`restore_no_scope_call`] can put
/// them back once the body has run (§4.G.2 step 4).
pub fn bind_no_scope_call(frames: &mut Frames, params: &[Param], args: &CallArgs, frame: FrameId) -> Vec<(SymbolId, Option<Value>)> {
    let mut saved = Vec::new();
    let mut positional_iter = args.positional.iter();
    let mut bind = |frames: &mut Frames, saved: &mut Vec<(SymbolId, Option<Value>)>, name: SymbolId, value: Value| {
        saved.push((name, frames.remove_local(frame, name)));
        frames.define(frame, name, value);
    };
    for param in params {
        match &param.kind {
            ParamKind::Positional { .. } => {
                if let Some(value) = positional_iter.next().cloned() {
                    bind(frames, &mut saved, param.name, value);
                }
            }
            ParamKind::Refinement { value_param } => {
                let present = args.refinement(param.name);
                let flag = Value::Logic(present.is_some());
                bind(frames, &mut saved, param.name, flag);
                if let Some(value_name) = value_param {
                    let value = present.and_then(Clone::clone).unwrap_or(Value::None);
                    bind(frames, &mut saved, *value_name, value);
                }
            }
        }
    }
    saved
}

/// Restores bindings saved by [`bind_no_scope_call`]: names with a prior value
/// get it back, names that did not previously exist are removed.
pub fn restore_no_scope_call(frames: &mut Frames, frame: FrameId, saved: Vec<(SymbolId, Option<Value>)>) {
    for (name, prior) in saved {
        match prior {
            Some(value) => frames.define(frame, name, value),
            None => {
                frames.remove_local(frame, name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_spec_recognizes_positional_literal_and_refinement() {
        let mut symbols = Symbols::new();
        let a = symbols.intern("a");
        let b = symbols.intern("b");
        let part = symbols.intern("--part");
        let count = symbols.intern("count");
        let spec = Series::new_block(vec![Value::Word(a), Value::LitWord(b), Value::Word(part), Value::Word(count)]);
        let params = parse_spec(&spec, &symbols).unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].kind, ParamKind::Positional { literal: false });
        assert_eq!(params[1].kind, ParamKind::Positional { literal: true });
        assert_eq!(params[2].kind, ParamKind::Refinement { value_param: Some(count) });
    }
}

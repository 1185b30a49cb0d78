//! The tree-walking evaluator (§3.4/§4.F): left-to-right, no operator precedence,
//! homoiconic block-of-values evaluation.
//!
//! Grounded on the teacher's call-frame push/pop and `resource.rs` depth-guard
//! pattern (`eval.rs`/`vm.rs`), adapted from instruction-pointer bytecode dispatch
//! to direct recursive evaluation over parsed value blocks — there is no compile
//! step here, so "dispatch" means matching on the [`Value`] kind currently under
//! the cursor (§4.F.2), not decoding an opcode.

use std::rc::Rc;

use crate::{
    error::{self, EvalResult},
    frame::{FrameId, FrameKind, Frames, ROOT_FRAME},
    function::{self, CallArgs, FunctionData, Param, ParamKind},
    io::{NoPrint, PrintWriter},
    object,
    parser::{self, LocationTable, SourceLoc},
    registry::{self, TypeRegistry},
    resource::{ResourceLimits, ResourceTracker},
    sandbox::{CapabilitySet, SandboxRoot},
    series::Series,
    symbol::{SymbolId, Symbols},
    tracer::{NoopTracer, Tracer},
    value::Value,
};

/// Owns every piece of mutable interpreter state for one program run: the symbol
/// table, the frame arena, the action registry, the recursion guard, and the
/// ambient seams (tracer, output writer, sandbox).
pub struct Evaluator {
    symbols: Symbols,
    frames: Frames,
    registry: TypeRegistry,
    resource: ResourceTracker,
    tracer: Box<dyn Tracer>,
    writer: Box<dyn PrintWriter>,
    sandbox: Option<SandboxRoot>,
    capabilities: CapabilitySet,
    locations: Option<LocationTable>,
}

impl Evaluator {
    #[must_use]
    pub fn new(limits: ResourceLimits, tracer: Box<dyn Tracer>, writer: Box<dyn PrintWriter>) -> Self {
        let mut symbols = Symbols::new();
        let registry = registry::install_actions(&mut symbols);
        let mut evaluator = Self {
            symbols,
            frames: Frames::new(),
            registry,
            resource: ResourceTracker::new(limits),
            tracer,
            writer,
            sandbox: None,
            capabilities: CapabilitySet::none(),
            locations: None,
        };
        crate::natives::install_natives(&mut evaluator);
        evaluator
    }

    /// Convenience constructor for tests and simple embeddings: default limits, a
    /// no-op tracer, and discarded output.
    #[must_use]
    pub fn new_default() -> Self {
        Self::new(ResourceLimits::default(), Box::new(NoopTracer), Box::new(NoPrint))
    }

    #[must_use]
    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut Symbols {
        &mut self.symbols
    }

    #[must_use]
    pub fn frames(&self) -> &Frames {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut Frames {
        &mut self.frames
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn writer_mut(&mut self) -> &mut dyn PrintWriter {
        self.writer.as_mut()
    }

    pub fn set_sandbox(&mut self, root: SandboxRoot, capabilities: CapabilitySet) {
        self.sandbox = Some(root);
        self.capabilities = capabilities;
    }

    #[must_use]
    pub fn sandbox(&self) -> Option<&SandboxRoot> {
        self.sandbox.as_ref()
    }

    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn define_native(&mut self, name: &str, params: Vec<function::Param>, func: function::NativeFn) {
        self.define_native_impl(name, params, func, false);
    }

    /// Like [`Self::define_native`], but the native also folds as an infix
    /// operator mid-statement (§4.F.1) — the arithmetic and comparison words.
    pub fn define_infix_native(&mut self, name: &str, params: Vec<function::Param>, func: function::NativeFn) {
        self.define_native_impl(name, params, func, true);
    }

    fn define_native_impl(&mut self, name: &str, params: Vec<function::Param>, func: function::NativeFn, infix: bool) {
        let sym = self.symbols.intern(name);
        if self.frames.has_local(ROOT_FRAME, sym) {
            log::warn!("native '{name}' redefines an existing root binding");
        }
        let value = Value::Function(Rc::new(FunctionData::Native { name: sym, params, func, infix }));
        self.frames.define(ROOT_FRAME, sym, value);
    }

    /// Binds a plain value (not a function) at the root frame — used for the
    /// `none`/`true`/`false` words and the `word!`-style datatype tokens (§4.A),
    /// which are ordinary word lookups rather than dedicated literal syntax.
    pub fn define_constant(&mut self, name: &str, value: Value) {
        let sym = self.symbols.intern(name);
        if self.frames.has_local(ROOT_FRAME, sym) {
            log::warn!("constant '{name}' redefines an existing root binding");
        }
        self.frames.define(ROOT_FRAME, sym, value);
    }

    /// Parses `source` and evaluates it at the root frame, recording locations for
    /// error reporting (§8 end-to-end entry point).
    pub fn run(&mut self, source: &str) -> EvalResult<Value> {
        let (block, locations) = parser::parse(source, &mut self.symbols)?;
        self.locations = Some(locations);
        self.do_block(block, ROOT_FRAME)
    }

    fn attach_location(&self, mut err: error::Error, block: &Series, index: usize) -> error::Error {
        if let Some(locations) = &self.locations {
            if let Some(loc) = locations.lookup(block, index) {
                err.fill_location(loc);
            }
        }
        err
    }

    /// Evaluates every statement in `block` left to right, returning the value of
    /// the last one (§3.4 `do`). An empty block evaluates to `none`.
    pub fn do_block(&mut self, block: Series, frame: FrameId) -> EvalResult<Value> {
        let len = block.length() as i64;
        let mut idx: i64 = 1;
        let mut result = Value::None;
        while idx <= len {
            let start = idx;
            let (value, next) = self
                .eval_statement(&block, idx, frame)
                .map_err(|e| self.attach_location(e, &block, (start - 1) as usize))?;
            result = value;
            idx = next;
        }
        Ok(result)
    }

    /// Evaluates one full statement: a unit (§4.F.2), then folds any number of
    /// trailing infix operators left-associatively (§4.F.1) — `3 + 4 * 2` reduces
    /// as `(3 + 4) * 2`, never by grouping the right-hand side of an operator with
    /// what follows it. This is the operation used for a block's top-level
    /// statements, a function's positional/refinement argument values, and a
    /// set-word/set-path's right-hand side — anywhere the grammar says "evaluate
    /// the next expression".
    fn eval_statement(&mut self, block: &Series, idx: i64, frame: FrameId) -> EvalResult<(Value, i64)> {
        let (mut value, mut idx) = self.eval_unit(block, idx, frame)?;
        while let Some(op) = self.peek_infix(block, idx, frame) {
            idx += 1;
            let (rhs, next) = self.eval_unit(block, idx, frame)?;
            idx = next;
            value = self.call_infix(&op, value, rhs, frame)?;
        }
        Ok((value, idx))
    }

    /// If the value at `idx` is a word bound to an infix-marked native, returns
    /// that function without consuming `idx` — otherwise `None`, leaving the
    /// cursor for the caller to treat as the start of the next statement. Never
    /// raises `no-value` for an unresolved word; that is the next statement's
    /// concern, not this peek's.
    fn peek_infix(&self, block: &Series, idx: i64, frame: FrameId) -> Option<Rc<FunctionData>> {
        let Ok(Value::Word(sym)) = block.pick(idx) else { return None };
        let (Value::Function(func), _) = self.frames.get(frame, sym)? else { return None };
        func.is_infix().then_some(func)
    }

    /// Invokes an infix-folded native directly with its already-evaluated left
    /// and right operands, through the same depth guard and tracer hooks an
    /// ordinary call uses (§4.G.3).
    fn call_infix(&mut self, func: &Rc<FunctionData>, lhs: Value, rhs: Value, frame: FrameId) -> EvalResult<Value> {
        let FunctionData::Native { func: native, .. } = func.as_ref() else {
            unreachable!("only natives are ever marked infix")
        };
        let mut args = CallArgs::new(frame);
        args.positional.push(lhs);
        args.positional.push(rhs);

        self.resource.enter()?;
        let depth = self.resource.depth();
        let name = func_display_name(func, &self.symbols);
        self.tracer.on_call(&name, depth);
        let result = native(self, &args);
        self.resource.exit();
        if let Ok(value) = &result {
            self.tracer.on_return(&name, depth, value, &self.symbols);
        }
        result
    }

    /// Evaluates exactly one unit starting at the 1-based position `idx` within
    /// `block`: a literal, a paren/path/word resolution, or (when a word resolves
    /// to a function) a full prefix call gathering that function's own arguments.
    /// Returns the value and the position just past it (§4.F.2). Does not itself
    /// fold a trailing infix operator — see [`Self::eval_statement`].
    fn eval_unit(&mut self, block: &Series, idx: i64, frame: FrameId) -> EvalResult<(Value, i64)> {
        let current = block.pick(idx)?;
        self.tracer.on_expr(&current, &self.symbols);
        match current {
            Value::Paren(inner) => {
                let result = self.do_block(inner, frame)?;
                Ok((result, idx + 1))
            }
            Value::LitWord(sym) => Ok((Value::Word(sym), idx + 1)),
            Value::GetWord(sym) => {
                let (value, _) = self
                    .frames
                    .get(frame, sym)
                    .ok_or_else(|| error::no_value(self.symbols.name(sym)))?;
                Ok((value, idx + 1))
            }
            Value::SetWord(sym) => {
                let (value, next) = self.eval_statement(block, idx + 1, frame)?;
                if self.frames.kind(frame) == FrameKind::ObjectSpec && self.frames.has_local(frame, sym) {
                    return Err(error::object_field_duplicate(self.symbols.name(sym)));
                }
                self.frames.put(frame, sym, value.clone())?;
                Ok((value, next))
            }
            Value::GetPath(path) => {
                let value = object::path_get(self, &path, frame)?;
                Ok((value, idx + 1))
            }
            Value::SetPath(path) => {
                let (value, next) = self.eval_statement(block, idx + 1, frame)?;
                object::path_set(self, &path, frame, value.clone())?;
                Ok((value, next))
            }
            Value::Path(path) => {
                let resolved = object::path_get(self, &path, frame)?;
                if let Value::Function(func) = resolved {
                    self.call_function(&func, block, idx + 1, frame)
                } else {
                    Ok((resolved, idx + 1))
                }
            }
            Value::Word(sym) => {
                let (value, _) = self
                    .frames
                    .get(frame, sym)
                    .ok_or_else(|| error::no_value(self.symbols.name(sym)))?;
                if let Value::Function(func) = value {
                    self.call_function(&func, block, idx + 1, frame)
                } else {
                    Ok((value, idx + 1))
                }
            }
            // None, Logic, Integer, Decimal, String, Binary, Block, Datatype, Bitset,
            // Function, Object, Port, Error: self-evaluating (§4.F.2).
            other => Ok((other, idx + 1)),
        }
    }

    /// Resolves one positional argument starting at `idx`: the raw value for a
    /// literal (lit-word) parameter, otherwise a fully evaluated expression,
    /// including any trailing infix fold (§4.G.1) — `fact n - 1` gathers `n - 1`
    /// as one argument the same way a top-level statement would.
    fn eval_argument(&mut self, block: &Series, idx: i64, frame: FrameId, literal: bool) -> EvalResult<(Value, i64)> {
        if literal {
            Ok((block.pick(idx)?, idx + 1))
        } else {
            self.eval_statement(block, idx, frame)
        }
    }

    /// Calls `func`, consuming positional arguments and any recognized
    /// `--refinement` tokens starting at `idx` in `block` (§4.G.2). A refinement
    /// token is recognized whenever it's encountered in the stream, not only
    /// after all positionals are filled — the `--no-scope` call shape (§8) writes
    /// its refinement before the positionals it flags, so scanning only trails
    /// positionals would miss it. Refinement values are always evaluated even
    /// when the refinement itself is optional.
    fn call_function(&mut self, func: &Rc<FunctionData>, block: &Series, mut idx: i64, frame: FrameId) -> EvalResult<(Value, i64)> {
        let params = func.params().to_vec();
        let mut args = CallArgs::new(frame);
        let positional_params: Vec<&Param> = params.iter().filter(|p| !p.is_refinement()).collect();
        let mut next_positional = 0usize;

        loop {
            if let Ok(Value::Word(word)) = block.pick(idx) {
                let already_seen = args.refinements.iter().any(|(n, _)| *n == word);
                if !already_seen {
                    if let Some(matched) = params.iter().find(|p| p.is_refinement() && p.name == word) {
                        idx += 1;
                        let ParamKind::Refinement { value_param } = &matched.kind else { unreachable!() };
                        let value_param = *value_param;
                        let value = if value_param.is_some() {
                            let (value, next) = self.eval_statement(block, idx, frame)?;
                            idx = next;
                            Some(value)
                        } else {
                            None
                        };
                        args.refinements.push((matched.name, value));
                        continue;
                    }
                }
            }
            if next_positional < positional_params.len() {
                let param = positional_params[next_positional];
                let literal = matches!(&param.kind, ParamKind::Positional { literal } if *literal);
                let (value, next) = self.eval_argument(block, idx, frame, literal)?;
                args.positional.push(value);
                idx = next;
                next_positional += 1;
                continue;
            }
            break;
        }

        self.resource.enter()?;
        let depth = self.resource.depth();
        let name = func_display_name(func, &self.symbols);
        self.tracer.on_call(&name, depth);

        let result = match func.as_ref() {
            FunctionData::Native { func: native, .. } => native(self, &args),
            FunctionData::User { body, parent_frame, no_scope, .. } => {
                let body = body.clone();
                if *no_scope {
                    let saved = function::bind_no_scope_call(&mut self.frames, &params, &args, frame);
                    let result = self.do_block(body, frame);
                    function::restore_no_scope_call(&mut self.frames, frame, saved);
                    result
                } else {
                    match function::bind_user_call(&mut self.frames, &params, &args, *parent_frame) {
                        Ok(call_frame) => self.do_block(body, call_frame),
                        Err(e) => Err(e),
                    }
                }
            }
        };
        self.resource.exit();

        if let Ok(value) = &result {
            self.tracer.on_return(&name, depth, value, &self.symbols);
        }
        Ok((result?, idx))
    }

    /// Evaluates a single already-obtained value as if it were the sole element of
    /// a one-item block — used by `do` on a non-block argument and by `reduce`.
    pub fn eval_one(&mut self, value: &Value, frame: FrameId) -> EvalResult<Value> {
        match value {
            Value::Block(block) | Value::Paren(block) => self.do_block(block.clone(), frame),
            Value::String(s) => {
                let text = s.with_str(|t| t.to_string());
                self.run_in_frame(&text, frame)
            }
            other => Ok(other.clone()),
        }
    }

    fn run_in_frame(&mut self, source: &str, frame: FrameId) -> EvalResult<Value> {
        let (block, locations) = parser::parse(source, &mut self.symbols)?;
        self.locations = Some(locations);
        self.do_block(block, frame)
    }

    pub fn intern(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    /// Evaluates `body` in a fresh frame and returns every top-level set-word
    /// binding it produced, in source order — the shape an `object`/`make object!`
    /// spec block defines its fields in (§4.I.1). `enclosing` lets the block see
    /// the lexical scope it was written in.
    pub fn do_block_collect_set_words(&mut self, body: Series, enclosing: FrameId) -> EvalResult<Vec<(SymbolId, Value)>> {
        let scratch = self.frames.new_frame(Some(enclosing), FrameKind::ObjectSpec);
        self.do_block(body, scratch)?;
        Ok(self.frames.all_bindings(scratch))
    }
}

fn func_display_name(func: &FunctionData, symbols: &Symbols) -> String {
    match func {
        FunctionData::Native { name, .. } => symbols.name(*name).to_string(),
        FunctionData::User { .. } => "<anonymous>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_literals_self_evaluate() {
        let mut evaluator = Evaluator::new_default();
        let result = evaluator.run("42").unwrap();
        assert_eq!(result, Value::Integer(42));
    }

    #[test]
    fn set_word_binds_and_returns_the_value() {
        let mut evaluator = Evaluator::new_default();
        let result = evaluator.run("x: 10 x").unwrap();
        assert_eq!(result, Value::Integer(10));
    }

    #[test]
    fn calling_add_dispatches_through_the_registry() {
        let mut evaluator = Evaluator::new_default();
        let result = evaluator.run("+ 2 3").unwrap();
        assert_eq!(result, Value::Integer(5));
    }

    #[test]
    fn infix_plus_folds_left_to_right_with_no_precedence() {
        let mut evaluator = Evaluator::new_default();
        let result = evaluator.run("2 + 3 * 4").unwrap();
        assert_eq!(result, Value::Integer(20));
    }

    #[test]
    fn unbound_word_is_a_no_value_error() {
        let mut evaluator = Evaluator::new_default();
        let err = evaluator.run("nope").unwrap_err();
        assert_eq!(err.id(), error::ErrorId::NoValue);
    }

    #[test]
    fn literal_block_does_not_auto_execute() {
        let mut evaluator = Evaluator::new_default();
        let result = evaluator.run("[1 2 3]").unwrap();
        assert!(matches!(result, Value::Block(_)));
    }
}

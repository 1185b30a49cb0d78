//! Bootstrap native table (§4.G.4): the fixed set of Rust-implemented functions
//! installed into the root frame before any user code runs.
//!
//! Grounded on the shape of the teacher's builtin-registration pass (each module
//! under `builtins/` registers its functions into the global namespace at startup)
//! — the bodies themselves are Viro-specific, since the teacher's builtins are
//! Python stdlib surface with no counterpart here. Installed in-process rather
//! than loaded from a bootstrap script (§4.G.4): there is no file system access
//! required just to start the evaluator.

use crate::{
    decimal::Decimal,
    error::{self, EvalResult},
    eval::Evaluator,
    function::{CallArgs, Param, ParamKind},
    object,
    series::{Series, TrimOptions},
    value::{Value, ValueType},
};

fn spec(evaluator: &mut Evaluator, names: &[&str]) -> Vec<Param> {
    names
        .iter()
        .map(|n| Param {
            name: evaluator.intern(n),
            kind: ParamKind::Positional { literal: false },
        })
        .collect()
}

fn spec_with_refinement(evaluator: &mut Evaluator, positionals: &[&str], refinement: &str, value_param: &str) -> Vec<Param> {
    let mut params = spec(evaluator, positionals);
    let refinement_name = evaluator.intern(refinement);
    let value_name = evaluator.intern(value_param);
    params.push(Param {
        name: refinement_name,
        kind: ParamKind::Refinement { value_param: Some(value_name) },
    });
    params
}

fn spec_with_flag(evaluator: &mut Evaluator, positionals: &[&str], flag: &str) -> Vec<Param> {
    let mut params = spec(evaluator, positionals);
    let name = evaluator.intern(flag);
    params.push(Param { name, kind: ParamKind::Refinement { value_param: None } });
    params
}

fn dispatch_action(evaluator: &mut Evaluator, action: &str, receiver: &Value, rest: &[Value]) -> EvalResult<Value> {
    let sym = evaluator.intern(action);
    evaluator.registry().dispatch(sym, receiver, rest, evaluator.symbols())
}

fn arg(args: &CallArgs, i: usize, name: &str) -> EvalResult<Value> {
    args.positional.get(i).cloned().ok_or_else(|| error::arg_count(name, i + 1, args.positional.len()))
}

macro_rules! series_unary {
    ($fn_name:ident, $action:literal) => {
        fn $fn_name(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
            let receiver = arg(args, 0, $action)?;
            dispatch_action(evaluator, $action, &receiver, &[])
        }
    };
}

macro_rules! series_binary {
    ($fn_name:ident, $action:literal) => {
        fn $fn_name(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
            let receiver = arg(args, 0, $action)?;
            let rest = arg(args, 1, $action)?;
            dispatch_action(evaluator, $action, &receiver, &[rest])
        }
    };
}

series_unary!(native_first, "first");
series_unary!(native_last, "last");
series_unary!(native_length_q, "length?");
series_unary!(native_empty_q, "empty?");
series_unary!(native_head_q, "head?");
series_unary!(native_tail_q, "tail?");
series_unary!(native_index_q, "index?");
series_unary!(native_head, "head");
series_unary!(native_tail, "tail");
series_unary!(native_next, "next");
series_unary!(native_back, "back");
series_unary!(native_clear, "clear");
series_unary!(native_reverse, "reverse");
series_unary!(native_sort, "sort");

series_binary!(native_skip, "skip");
series_binary!(native_at, "at");
series_binary!(native_pick, "pick");
series_binary!(native_append, "append");
series_binary!(native_insert, "insert");
series_binary!(native_change, "change");

/// `split s delim`: breaks a string on every occurrence of a substring delimiter,
/// or a binary on every occurrence of a byte. An empty string delimiter is a
/// domain error — there is no well-defined way to split on nothing.
fn native_split(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let series = arg(args, 0, "split")?;
    let delim = arg(args, 1, "split")?;
    match (&series, &delim) {
        (Value::String(s), Value::String(d)) => {
            let haystack = s.with_str(|t| t.to_string());
            let pattern = d.with_str(|t| t.to_string());
            if pattern.is_empty() {
                return Err(error::invalid_operation("split delimiter must not be empty"));
            }
            let parts = haystack.split(pattern.as_str()).map(|part| Value::String(Series::new_string(part))).collect();
            Ok(Value::Block(Series::new_block(parts)))
        }
        (Value::Binary(s), Value::Integer(n)) => {
            let byte = u8::try_from(*n).map_err(|_| error::invalid_operation("split delimiter must be a byte value 0-255"))?;
            let bytes = s.to_bytes();
            let parts = bytes.split(|b| *b == byte).map(|chunk| Value::Binary(Series::new_binary(chunk.to_vec()))).collect();
            Ok(Value::Block(Series::new_block(parts)))
        }
        (other, _) => Err(error::type_mismatch("split", "string! or binary!", other.value_type().name())),
    }
}

fn series_of(v: &Value) -> EvalResult<&Series> {
    match v {
        Value::String(s) | Value::Binary(s) | Value::Block(s) | Value::Paren(s) => Ok(s),
        other => Err(error::type_mismatch("find", "a series type", other.value_type().name())),
    }
}

fn rewrap(ty: ValueType, s: Series) -> Value {
    match ty {
        ValueType::String => Value::String(s),
        ValueType::Binary => Value::Binary(s),
        ValueType::Paren => Value::Paren(s),
        _ => Value::Block(s),
    }
}

/// `find series value --last`: linear search for `value`, re-headed at the match.
/// `--last` searches back from the tail instead of forward from the head.
fn native_find(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let receiver = arg(args, 0, "find")?;
    let needle = arg(args, 1, "find")?;
    let last_sym = evaluator.intern("--last");
    let series = series_of(&receiver)?;
    let found = if args.refinement(last_sym).is_some() { series.find_last(&needle) } else { series.find(&needle) };
    Ok(found.map_or(Value::None, |s| rewrap(receiver.value_type(), s)))
}

/// `select series value --default d`: the element following `value`, or `d`
/// (default `none`) when `value` isn't present.
fn native_select(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let receiver = arg(args, 0, "select")?;
    let needle = arg(args, 1, "select")?;
    let default_sym = evaluator.intern("--default");
    let result = series_of(&receiver)?.select(&needle)?;
    match (&result, args.refinement(default_sym)) {
        (Value::None, Some(Some(default))) => Ok(default.clone()),
        _ => Ok(result),
    }
}

fn trim_spec(evaluator: &mut Evaluator) -> Vec<Param> {
    let mut params = spec(evaluator, &["series"]);
    for flag in ["--head", "--tail", "--auto", "--lines", "--all"] {
        let name = evaluator.intern(flag);
        params.push(Param { name, kind: ParamKind::Refinement { value_param: None } });
    }
    let with_name = evaluator.intern("--with");
    let value_name = evaluator.intern("chars");
    params.push(Param { name: with_name, kind: ParamKind::Refinement { value_param: Some(value_name) } });
    params
}

/// `trim series --head --tail --auto --lines --all --with x`: by default strips
/// leading and trailing whitespace from a string or leading/trailing `none`
/// values from a block; the refinements narrow or widen that scope (§4.H).
/// `--head`/`--tail` are mutually exclusive, as are `--all`/`--with`; `--auto`
/// and `--lines` only apply to strings.
fn native_trim(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let receiver = arg(args, 0, "trim")?;
    let head = args.refinement(evaluator.intern("--head")).is_some();
    let tail = args.refinement(evaluator.intern("--tail")).is_some();
    let auto = args.refinement(evaluator.intern("--auto")).is_some();
    let lines = args.refinement(evaluator.intern("--lines")).is_some();
    let all = args.refinement(evaluator.intern("--all")).is_some();
    let with = match args.refinement(evaluator.intern("--with")) {
        Some(Some(value)) => Some(value.clone()),
        _ => None,
    };

    if head && tail {
        return Err(error::invalid_operation("trim: --head and --tail are mutually exclusive"));
    }
    if all && with.is_some() {
        return Err(error::invalid_operation("trim: --with and --all are mutually exclusive"));
    }
    if (auto || lines) && !matches!(receiver, Value::String(_)) {
        return Err(error::invalid_operation("trim: --auto and --lines apply only to string!"));
    }

    let opts = TrimOptions { head, tail, all, auto, lines, with };
    series_of(&receiver)?.trim(&opts)?;
    Ok(receiver)
}

fn native_poke(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let receiver = arg(args, 0, "poke")?;
    let index = arg(args, 1, "poke")?;
    let value = arg(args, 2, "poke")?;
    dispatch_action(evaluator, "poke", &receiver, &[index, value])
}

fn part_refinement(args: &CallArgs, evaluator: &mut Evaluator) -> Vec<Value> {
    let part_sym = evaluator.intern("--part");
    match args.refinement(part_sym) {
        Some(Some(value)) => vec![value.clone()],
        _ => vec![],
    }
}

fn native_copy(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let receiver = arg(args, 0, "copy")?;
    let rest = part_refinement(args, evaluator);
    dispatch_action(evaluator, "copy", &receiver, &rest)
}

fn native_remove(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let receiver = arg(args, 0, "remove")?;
    let rest = part_refinement(args, evaluator);
    dispatch_action(evaluator, "remove", &receiver, &rest)
}

fn native_take(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let receiver = arg(args, 0, "take")?;
    let rest = part_refinement(args, evaluator);
    dispatch_action(evaluator, "take", &receiver, &rest)
}

fn native_equal_q(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "=")?;
    let b = arg(args, 1, "=")?;
    Ok(Value::Logic(a.equals(&b)))
}

fn native_not_equal_q(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "<>")?;
    let b = arg(args, 1, "<>")?;
    Ok(Value::Logic(!a.equals(&b)))
}

fn numeric_compare(a: &Value, b: &Value) -> EvalResult<std::cmp::Ordering> {
    fn as_decimal(v: &Value) -> EvalResult<Decimal> {
        match v {
            Value::Integer(i) => Ok(Decimal::from_i64(*i)),
            Value::Decimal(d) => Ok(d.clone()),
            other => Err(error::type_mismatch("compare", "integer! or decimal!", other.value_type().name())),
        }
    }
    Ok(as_decimal(a)?.cmp_value(&as_decimal(b)?))
}

fn native_lesser_q(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "<")?;
    let b = arg(args, 1, "<")?;
    Ok(Value::Logic(numeric_compare(&a, &b)? == std::cmp::Ordering::Less))
}

fn native_greater_q(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, ">")?;
    let b = arg(args, 1, ">")?;
    Ok(Value::Logic(numeric_compare(&a, &b)? == std::cmp::Ordering::Greater))
}

fn native_lesser_or_equal_q(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "<=")?;
    let b = arg(args, 1, "<=")?;
    Ok(Value::Logic(numeric_compare(&a, &b)? != std::cmp::Ordering::Greater))
}

fn native_greater_or_equal_q(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, ">=")?;
    let b = arg(args, 1, ">=")?;
    Ok(Value::Logic(numeric_compare(&a, &b)? != std::cmp::Ordering::Less))
}

fn native_add(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "+")?;
    let b = arg(args, 1, "+")?;
    dispatch_action(evaluator, "add", &a, &[b])
}

fn native_subtract(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "-")?;
    let b = arg(args, 1, "-")?;
    dispatch_action(evaluator, "subtract", &a, &[b])
}

fn native_multiply(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "*")?;
    let b = arg(args, 1, "*")?;
    dispatch_action(evaluator, "multiply", &a, &[b])
}

fn native_divide(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "/")?;
    let b = arg(args, 1, "/")?;
    dispatch_action(evaluator, "divide", &a, &[b])
}

fn native_power(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let base = arg(args, 0, "**")?;
    let exponent = arg(args, 1, "**")?;
    let Value::Integer(exponent) = exponent else {
        return Err(error::type_mismatch("**", "integer!", exponent.value_type().name()));
    };
    let exponent: u32 = exponent.try_into().map_err(|_| error::type_mismatch("**", "non-negative integer!", "negative integer!"))?;
    match base {
        Value::Integer(b) => b.checked_pow(exponent).map(Value::Integer).ok_or_else(error::math_overflow),
        Value::Decimal(d) => {
            let mut result = Decimal::from_i64(1);
            for _ in 0..exponent {
                result = result.mul(&d)?;
            }
            Ok(Value::Decimal(result))
        }
        other => Err(error::type_mismatch("**", "integer! or decimal!", other.value_type().name())),
    }
}

fn native_negate(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "negate")?;
    dispatch_action(evaluator, "negate", &a, &[])
}

fn native_not(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "not")?;
    Ok(Value::Logic(!a.is_truthy()))
}

fn native_and(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "and")?;
    let b = arg(args, 1, "and")?;
    Ok(Value::Logic(a.is_truthy() && b.is_truthy()))
}

fn native_or(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let a = arg(args, 0, "or")?;
    let b = arg(args, 1, "or")?;
    Ok(Value::Logic(a.is_truthy() || b.is_truthy()))
}

fn native_if(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let cond = arg(args, 0, "if")?;
    let branch = arg(args, 1, "if")?;
    if cond.is_truthy() {
        evaluator.eval_one(&branch, args.frame)
    } else {
        Ok(Value::None)
    }
}

fn native_either(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let cond = arg(args, 0, "either")?;
    let then_branch = arg(args, 1, "either")?;
    let else_branch = arg(args, 2, "either")?;
    evaluator.eval_one(&if cond.is_truthy() { then_branch } else { else_branch }, args.frame)
}

fn native_while(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let cond = arg(args, 0, "while")?;
    let body = arg(args, 1, "while")?;
    let Value::Block(cond_block) = &cond else {
        return Err(error::type_mismatch("while", "block!", cond.value_type().name()));
    };
    let mut result = Value::None;
    loop {
        let cond_value = evaluator.do_block(cond_block.clone(), args.frame)?;
        if !cond_value.is_truthy() {
            break;
        }
        result = evaluator.eval_one(&body, args.frame)?;
    }
    Ok(result)
}

fn native_do(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let value = arg(args, 0, "do")?;
    evaluator.eval_one(&value, args.frame)
}

fn native_reduce(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let value = arg(args, 0, "reduce")?;
    let Value::Block(block) = &value else {
        return Err(error::type_mismatch("reduce", "block!", value.value_type().name()));
    };
    let mut out = Vec::with_capacity(block.length());
    for i in 1..=block.length() as i64 {
        let item = block.pick(i)?;
        out.push(evaluator.eval_one(&item, args.frame)?);
    }
    Ok(Value::Block(Series::new_block(out)))
}

fn native_fn(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let spec_value = arg(args, 0, "fn")?;
    let body_value = arg(args, 1, "fn")?;
    let (Value::Block(spec_block), Value::Block(body)) = (&spec_value, &body_value) else {
        return Err(error::type_mismatch("fn", "block! block!", "other"));
    };
    let no_scope_sym = evaluator.intern("--no-scope");
    let no_scope = args.refinement(no_scope_sym).is_some();
    let params = crate::function::parse_spec(spec_block, evaluator.symbols())?;
    let func = crate::function::FunctionData::User {
        params,
        body: body.clone(),
        parent_frame: args.frame,
        no_scope,
    };
    Ok(Value::Function(std::rc::Rc::new(func)))
}

fn native_does(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let body_value = arg(args, 0, "does")?;
    let Value::Block(body) = &body_value else {
        return Err(error::type_mismatch("does", "block!", body_value.value_type().name()));
    };
    let func = crate::function::FunctionData::User {
        params: Vec::new(),
        body: body.clone(),
        parent_frame: args.frame,
        no_scope: false,
    };
    Ok(Value::Function(std::rc::Rc::new(func)))
}

fn object_fields_from_block(evaluator: &mut Evaluator, body: &Series, enclosing: crate::frame::FrameId) -> EvalResult<Vec<(crate::symbol::SymbolId, Value)>> {
    let result = evaluator.do_block_collect_set_words(body.clone(), enclosing)?;
    Ok(result)
}

fn native_object(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let body_value = arg(args, 0, "object")?;
    let Value::Block(body) = &body_value else {
        return Err(error::type_mismatch("object", "block!", body_value.value_type().name()));
    };
    let fields = object_fields_from_block(evaluator, body, args.frame)?;
    let frame = object::make_object(evaluator, None, &fields)?;
    Ok(Value::Object(frame))
}

fn native_make(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let datatype = arg(args, 0, "make")?;
    let spec_value = arg(args, 1, "make")?;
    match datatype {
        Value::Datatype(ValueType::Object) => {
            let Value::Block(body) = &spec_value else {
                return Err(error::type_mismatch("make object!", "block!", spec_value.value_type().name()));
            };
            let fields = object_fields_from_block(evaluator, body, args.frame)?;
            let frame = object::make_object(evaluator, None, &fields)?;
            Ok(Value::Object(frame))
        }
        Value::Object(prototype) => {
            let Value::Block(body) = &spec_value else {
                return Err(error::type_mismatch("make object!", "block!", spec_value.value_type().name()));
            };
            let fields = object_fields_from_block(evaluator, body, args.frame)?;
            let frame = object::make_object(evaluator, Some(prototype), &fields)?;
            Ok(Value::Object(frame))
        }
        Value::Datatype(ValueType::Bitset) => Ok(Value::Bitset(std::rc::Rc::new(std::cell::RefCell::new(crate::value::BitsetData::default())))),
        other => Err(error::type_mismatch("make", "a datatype or object!", other.value_type().name())),
    }
}

fn native_type_q(_evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let value = arg(args, 0, "type?")?;
    Ok(Value::Datatype(value.value_type()))
}

fn native_words_of(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let value = arg(args, 0, "words-of")?;
    match value {
        Value::Object(frame) => {
            let words = evaluator
                .frames()
                .all_bindings(frame)
                .into_iter()
                .map(|(sym, _)| Value::Word(sym))
                .collect();
            Ok(Value::Block(Series::new_block(words)))
        }
        Value::Function(func) => {
            let words = func.params().iter().map(|p| Value::Word(p.name)).collect();
            Ok(Value::Block(Series::new_block(words)))
        }
        other => Err(error::type_mismatch("words-of", "object! or function!", other.value_type().name())),
    }
}

fn native_values_of(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let value = arg(args, 0, "values-of")?;
    match value {
        Value::Object(frame) => {
            let values = evaluator.frames().all_bindings(frame).into_iter().map(|(_, v)| v).collect();
            Ok(Value::Block(Series::new_block(values)))
        }
        other => Err(error::type_mismatch("values-of", "object!", other.value_type().name())),
    }
}

fn render_print_text(evaluator: &Evaluator, value: &Value) -> String {
    value.form(evaluator.symbols())
}

fn native_print(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let value = arg(args, 0, "print")?;
    let text = render_print_text(evaluator, &value);
    evaluator.writer_mut().print_line(&text);
    Ok(Value::None)
}

fn native_prin(evaluator: &mut Evaluator, args: &CallArgs) -> EvalResult<Value> {
    let value = arg(args, 0, "prin")?;
    let text = render_print_text(evaluator, &value);
    evaluator.writer_mut().print(&text);
    Ok(Value::None)
}

/// Installs every bootstrap native into the root frame (§4.G.4).
pub fn install_natives(evaluator: &mut Evaluator) {
    macro_rules! install {
        ($name:literal, $params:expr, $func:expr) => {{
            let params = $params;
            evaluator.define_native($name, params, $func);
        }};
    }
    macro_rules! install_infix {
        ($name:literal, $params:expr, $func:expr) => {{
            let params = $params;
            evaluator.define_infix_native($name, params, $func);
        }};
    }

    install!("first", spec(evaluator, &["series"]), native_first);
    install!("last", spec(evaluator, &["series"]), native_last);
    install!("length?", spec(evaluator, &["series"]), native_length_q);
    install!("empty?", spec(evaluator, &["series"]), native_empty_q);
    install!("head?", spec(evaluator, &["series"]), native_head_q);
    install!("tail?", spec(evaluator, &["series"]), native_tail_q);
    install!("index?", spec(evaluator, &["series"]), native_index_q);
    install!("head", spec(evaluator, &["series"]), native_head);
    install!("tail", spec(evaluator, &["series"]), native_tail);
    install!("next", spec(evaluator, &["series"]), native_next);
    install!("back", spec(evaluator, &["series"]), native_back);
    install!("clear", spec(evaluator, &["series"]), native_clear);
    install!("reverse", spec(evaluator, &["series"]), native_reverse);
    install!("trim", trim_spec(evaluator), native_trim);
    install!("sort", spec(evaluator, &["series"]), native_sort);

    install!("skip", spec(evaluator, &["series", "offset"]), native_skip);
    install!("at", spec(evaluator, &["series", "index"]), native_at);
    install!("pick", spec(evaluator, &["series", "index"]), native_pick);
    install!("append", spec(evaluator, &["series", "value"]), native_append);
    install!("insert", spec(evaluator, &["series", "value"]), native_insert);
    install!("change", spec(evaluator, &["series", "value"]), native_change);
    install!("find", spec_with_flag(evaluator, &["series", "value"], "--last"), native_find);
    install!("select", spec_with_refinement(evaluator, &["series", "value"], "--default", "fallback"), native_select);
    install!("split", spec(evaluator, &["series", "delim"]), native_split);
    install!("poke", spec(evaluator, &["series", "index", "value"]), native_poke);

    install!("copy", spec_with_refinement(evaluator, &["series"], "--part", "count"), native_copy);
    install!("remove", spec_with_refinement(evaluator, &["series"], "--part", "count"), native_remove);
    install!("take", spec_with_refinement(evaluator, &["series"], "--part", "count"), native_take);

    // Arithmetic and comparison words are infix-capable (§4.F.1): they can be
    // called as ordinary prefix words (`+ 2 3`) or, more commonly, appear
    // mid-statement, folding the value already produced to their left.
    install_infix!("+", spec(evaluator, &["a", "b"]), native_add);
    install_infix!("-", spec(evaluator, &["a", "b"]), native_subtract);
    install_infix!("*", spec(evaluator, &["a", "b"]), native_multiply);
    install_infix!("/", spec(evaluator, &["a", "b"]), native_divide);
    install_infix!("**", spec(evaluator, &["a", "b"]), native_power);

    install_infix!("=", spec(evaluator, &["a", "b"]), native_equal_q);
    install_infix!("<>", spec(evaluator, &["a", "b"]), native_not_equal_q);
    install_infix!("<", spec(evaluator, &["a", "b"]), native_lesser_q);
    install_infix!(">", spec(evaluator, &["a", "b"]), native_greater_q);
    install_infix!("<=", spec(evaluator, &["a", "b"]), native_lesser_or_equal_q);
    install_infix!(">=", spec(evaluator, &["a", "b"]), native_greater_or_equal_q);

    install!("negate", spec(evaluator, &["a"]), native_negate);

    install!("not", spec(evaluator, &["value"]), native_not);
    install!("and", spec(evaluator, &["a", "b"]), native_and);
    install!("or", spec(evaluator, &["a", "b"]), native_or);

    install!("if", spec(evaluator, &["condition", "branch"]), native_if);
    install!("either", spec(evaluator, &["condition", "then-branch", "else-branch"]), native_either);
    install!("while", spec(evaluator, &["condition", "body"]), native_while);
    install!("do", spec(evaluator, &["value"]), native_do);
    install!("reduce", spec(evaluator, &["block"]), native_reduce);

    install!("fn", spec_with_flag(evaluator, &["spec", "body"], "--no-scope"), native_fn);
    install!("does", spec(evaluator, &["body"]), native_does);
    install!("make", spec(evaluator, &["datatype", "spec"]), native_make);
    install!("object", spec(evaluator, &["body"]), native_object);

    install!("type?", spec(evaluator, &["value"]), native_type_q);
    install!("words-of", spec(evaluator, &["value"]), native_words_of);
    install!("values-of", spec(evaluator, &["value"]), native_values_of);

    install!("print", spec(evaluator, &["value"]), native_print);
    install!("prin", spec(evaluator, &["value"]), native_prin);

    install_constants(evaluator);
}

/// Binds the words that are ordinary lookups rather than dedicated literal
/// syntax (§4.A): `none`/`true`/`false`, and one `name!` word per datatype so
/// that `make object! [...]`/`type? x = string!` resolve through the same word
/// lookup as everything else.
fn install_constants(evaluator: &mut Evaluator) {
    evaluator.define_constant("none", Value::None);
    evaluator.define_constant("true", Value::Logic(true));
    evaluator.define_constant("false", Value::Logic(false));

    for datatype in [
        ValueType::None,
        ValueType::Logic,
        ValueType::Integer,
        ValueType::Decimal,
        ValueType::String,
        ValueType::Binary,
        ValueType::Block,
        ValueType::Paren,
        ValueType::Word,
        ValueType::SetWord,
        ValueType::GetWord,
        ValueType::LitWord,
        ValueType::Path,
        ValueType::SetPath,
        ValueType::GetPath,
        ValueType::Datatype,
        ValueType::Bitset,
        ValueType::Function,
        ValueType::Object,
        ValueType::Port,
        ValueType::Error,
    ] {
        evaluator.define_constant(datatype.name(), Value::Datatype(datatype));
    }
}

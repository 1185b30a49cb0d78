//! Action dispatch registry (§4.E): open, type-keyed method tables.
//!
//! Grounded on the teacher's type-method dispatch (each `types/*.rs` module
//! registers its own method table keyed by name), adapted from Python's fixed
//! dunder-method slots to Viro's open action-word set (§4.E): any type may
//! implement any action word, and a type that doesn't raises `action-no-impl`
//! rather than falling back to a default.

use ahash::AHashMap;

use crate::{
    decimal::Decimal,
    error::{self, ErrorId, EvalResult},
    series::Series,
    symbol::{SymbolId, Symbols},
    value::{Value, ValueType},
};

/// One action implementation: receiver, positional args (already evaluated), and
/// the evaluator's symbol table (for error messages and word-shaped results).
pub type ActionFn = fn(&Value, &[Value], &Symbols) -> EvalResult<Value>;

#[derive(Default)]
pub struct TypeRegistry {
    table: AHashMap<ValueType, AHashMap<SymbolId, ActionFn>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, ty: ValueType, action: SymbolId, f: ActionFn) {
        self.table.entry(ty).or_default().insert(action, f);
    }

    #[must_use]
    pub fn has(&self, ty: ValueType, action: SymbolId) -> bool {
        self.table.get(&ty).is_some_and(|m| m.contains_key(&action))
    }

    pub fn dispatch(&self, action: SymbolId, receiver: &Value, args: &[Value], symbols: &Symbols) -> EvalResult<Value> {
        let ty = receiver.value_type();
        match self.table.get(&ty).and_then(|m| m.get(&action)) {
            Some(f) => f(receiver, args, symbols),
            None => Err(error::action_no_impl(symbols.name(action), ty.name())),
        }
    }
}

/// Builds the default registry covering arithmetic (integer/decimal) and the
/// shared series action set (string/binary/block/paren), per §4.H.
pub fn install_actions(symbols: &mut Symbols) -> TypeRegistry {
    let mut reg = TypeRegistry::new();
    register_numeric(&mut reg, symbols);
    for ty in [ValueType::String, ValueType::Binary, ValueType::Block, ValueType::Paren] {
        register_series(&mut reg, symbols, ty);
    }
    reg
}

fn as_decimal(v: &Value) -> EvalResult<Decimal> {
    match v {
        Value::Integer(i) => Ok(Decimal::from_i64(*i)),
        Value::Decimal(d) => Ok(d.clone()),
        other => Err(error::type_mismatch("math", "integer! or decimal!", other.value_type().name())),
    }
}

fn numeric_binop(
    name: &str,
    int_op: fn(i64, i64) -> EvalResult<i64>,
    dec_op: fn(&Decimal, &Decimal) -> EvalResult<Decimal>,
) -> impl Fn(&Value, &[Value], &Symbols) -> EvalResult<Value> {
    move |receiver, args, _symbols| {
        let Some(other) = args.first() else {
            return Err(error::arg_count(name, 1, 0));
        };
        match (receiver, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(int_op(*a, *b)?)),
            _ => Ok(Value::Decimal(dec_op(&as_decimal(receiver)?, &as_decimal(other)?)?)),
        }
    }
}

fn register_numeric(reg: &mut TypeRegistry, symbols: &mut Symbols) {
    let add = symbols.intern("add");
    let subtract = symbols.intern("subtract");
    let multiply = symbols.intern("multiply");
    let divide = symbols.intern("divide");
    let negate = symbols.intern("negate");
    let equal = symbols.intern("equal?");
    let lesser = symbols.intern("lesser?");
    let greater = symbols.intern("greater?");

    fn int_add(a: i64, b: i64) -> EvalResult<i64> {
        a.checked_add(b).ok_or_else(error::math_overflow)
    }
    fn int_sub(a: i64, b: i64) -> EvalResult<i64> {
        a.checked_sub(b).ok_or_else(error::math_overflow)
    }
    fn int_mul(a: i64, b: i64) -> EvalResult<i64> {
        a.checked_mul(b).ok_or_else(error::math_overflow)
    }
    fn int_div(a: i64, b: i64) -> EvalResult<i64> {
        if b == 0 {
            return Err(error::zero_divide());
        }
        a.checked_div(b).ok_or_else(error::math_overflow)
    }

    for ty in [ValueType::Integer, ValueType::Decimal] {
        reg.register(ty, add, numeric_binop("add", int_add, Decimal::add) as ActionFn);
        reg.register(ty, subtract, numeric_binop("subtract", int_sub, Decimal::sub) as ActionFn);
        reg.register(ty, multiply, numeric_binop("multiply", int_mul, Decimal::mul) as ActionFn);
        reg.register(ty, divide, numeric_binop("divide", int_div, Decimal::div) as ActionFn);

        reg.register(ty, negate, |receiver, _args, _symbols| match receiver {
            Value::Integer(i) => i.checked_neg().map(Value::Integer).ok_or_else(error::math_overflow),
            Value::Decimal(d) => Ok(Value::Decimal(d.neg())),
            other => Err(error::type_mismatch("negate", "integer! or decimal!", other.value_type().name())),
        });

        reg.register(ty, equal, |receiver, args, _symbols| {
            let other = args.first().ok_or_else(|| error::arg_count("equal?", 1, 0))?;
            Ok(Value::Logic(receiver.equals(other)))
        });

        reg.register(ty, lesser, |receiver, args, _symbols| {
            let other = args.first().ok_or_else(|| error::arg_count("lesser?", 1, 0))?;
            Ok(Value::Logic(as_decimal(receiver)?.cmp_value(&as_decimal(other)?) == std::cmp::Ordering::Less))
        });

        reg.register(ty, greater, |receiver, args, _symbols| {
            let other = args.first().ok_or_else(|| error::arg_count("greater?", 1, 0))?;
            Ok(Value::Logic(as_decimal(receiver)?.cmp_value(&as_decimal(other)?) == std::cmp::Ordering::Greater))
        });
    }
}

fn series_of(v: &Value) -> EvalResult<&Series> {
    match v {
        Value::String(s) | Value::Binary(s) | Value::Block(s) | Value::Paren(s) => Ok(s),
        other => Err(error::type_mismatch("series action", "a series type", other.value_type().name())),
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

fn part_count(r: &Value, args: &[Value]) -> EvalResult<Option<usize>> {
    match args.first() {
        Some(Value::Integer(n)) if *n >= 0 => Ok(Some(*n as usize)),
        Some(Value::Integer(n)) => Err(error::out_of_bounds(*n, series_of(r)?.length(), 0)),
        _ => Ok(None),
    }
}

fn register_series(reg: &mut TypeRegistry, symbols: &mut Symbols, ty: ValueType) {
    macro_rules! act {
        ($name:literal, $f:expr) => {
            reg.register(ty, symbols.intern($name), $f);
        };
    }

    act!("first", |r, _a, _s| series_of(r)?.first());
    act!("last", |r, _a, _s| series_of(r)?.last());
    act!("length?", |r, _a, _s| Ok(Value::Integer(series_of(r)?.length() as i64)));
    act!("empty?", |r, _a, _s| Ok(Value::Logic(series_of(r)?.is_empty())));
    act!("head?", |r, _a, _s| Ok(Value::Logic(series_of(r)?.is_at_head())));
    act!("tail?", |r, _a, _s| Ok(Value::Logic(series_of(r)?.is_at_tail())));
    act!("index?", |r, _a, _s| Ok(Value::Integer(series_of(r)?.index())));
    act!("head", |r, _a, _s| Ok(rewrap(r.value_type(), series_of(r)?.head())));
    act!("tail", |r, _a, _s| Ok(rewrap(r.value_type(), series_of(r)?.tail())));
    act!("next", |r, _a, _s| Ok(rewrap(r.value_type(), series_of(r)?.next())));
    act!("back", |r, _a, _s| Ok(rewrap(r.value_type(), series_of(r)?.back())));
    act!("clear", |r, _a, _s| {
        series_of(r)?.clear();
        Ok(r.clone())
    });
    act!("reverse", |r, _a, _s| {
        series_of(r)?.reverse();
        Ok(r.clone())
    });
    act!("sort", |r, _a, _s| {
        series_of(r)?.sort()?;
        Ok(r.clone())
    });

    act!("skip", |r, a, _s| {
        let Some(Value::Integer(n)) = a.first() else {
            return Err(error::type_mismatch("skip", "integer!", "missing argument"));
        };
        Ok(rewrap(r.value_type(), series_of(r)?.skip(*n)))
    });
    act!("at", |r, a, _s| {
        let Some(Value::Integer(n)) = a.first() else {
            return Err(error::type_mismatch("at", "integer!", "missing argument"));
        };
        Ok(rewrap(r.value_type(), series_of(r)?.at(*n)?))
    });
    act!("pick", |r, a, _s| {
        let Some(Value::Integer(n)) = a.first() else {
            return Err(error::type_mismatch("pick", "integer!", "missing argument"));
        };
        match series_of(r)?.pick(*n) {
            Err(e) if e.id() == ErrorId::OutOfBounds => Ok(Value::None),
            other => other,
        }
    });
    act!("poke", |r, a, _s| {
        let Some(Value::Integer(n)) = a.first() else {
            return Err(error::type_mismatch("poke", "integer!", "missing argument"));
        };
        let value = a.get(1).ok_or_else(|| error::arg_count("poke", 2, a.len()))?;
        series_of(r)?.poke(*n, value)?;
        Ok(r.clone())
    });
    act!("append", |r, a, _s| {
        let value = a.first().ok_or_else(|| error::arg_count("append", 1, 0))?;
        series_of(r)?.append(value)?;
        Ok(r.clone())
    });
    act!("insert", |r, a, _s| {
        let value = a.first().ok_or_else(|| error::arg_count("insert", 1, 0))?;
        series_of(r)?.insert(value)?;
        Ok(r.clone())
    });
    act!("change", |r, a, _s| {
        let value = a.first().ok_or_else(|| error::arg_count("change", 1, 0))?;
        series_of(r)?.change(value)?;
        Ok(r.clone())
    });
    act!("remove", |r, a, _s| {
        let count = part_count(r, a)?;
        series_of(r)?.remove(count)?;
        Ok(r.clone())
    });
    act!("take", |r, a, _s| {
        let count = part_count(r, a)?;
        series_of(r)?.take(count)
    });
    act!("copy", |r, a, _s| {
        let count = part_count(r, a)?;
        Ok(rewrap(r.value_type(), series_of(r)?.copy(count)))
    });
    act!("equal?", |r, a, _s| {
        let other = a.first().ok_or_else(|| error::arg_count("equal?", 1, 0))?;
        Ok(Value::Logic(r.equals(other)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_finds_registered_integer_action() {
        let mut symbols = Symbols::new();
        let reg = install_actions(&mut symbols);
        let add = symbols.lookup("add").unwrap();
        let result = reg.dispatch(add, &Value::Integer(2), &[Value::Integer(3)], &symbols).unwrap();
        assert_eq!(result, Value::Integer(5));
    }

    #[test]
    fn dispatch_on_unregistered_action_errors() {
        let mut symbols = Symbols::new();
        let reg = install_actions(&mut symbols);
        let missing = symbols.intern("frobnicate");
        assert!(reg.dispatch(missing, &Value::Integer(2), &[], &symbols).is_err());
    }

    #[test]
    fn series_action_dispatches_across_block_and_string() {
        let mut symbols = Symbols::new();
        let reg = install_actions(&mut symbols);
        let first = symbols.lookup("first").unwrap();
        let block = Value::Block(Series::new_block(vec![Value::Integer(9)]));
        assert_eq!(reg.dispatch(first, &block, &[], &symbols).unwrap(), Value::Integer(9));
        let string = Value::String(Series::new_string("hi"));
        assert_eq!(reg.dispatch(first, &string, &[], &symbols).unwrap(), Value::String(Series::new_string("h")));
    }
}

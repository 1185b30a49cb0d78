//! Object model & path evaluation (§4.I): prototype-chained objects over the
//! frame arena, plus path read/write/invoke.
//!
//! Grounded on the teacher's `object.rs`, which also layers "instance attributes"
//! over a parent-linked lookup chain for inheritance. Viro reuses the frame arena
//! itself as that chain (`FrameKind::Object`, parent = the prototype) instead of a
//! separate attribute-table type, since frames already provide exactly the
//! insertion-ordered, parent-walking lookup §4.I needs.

use crate::{
    error::{self, EvalResult},
    eval::Evaluator,
    frame::{FrameId, FrameKind},
    symbol::{SymbolId, Symbols},
    value::{PathData, PathSegment, Value},
};

/// Field names a script may not assign directly (§4.I.1).
const RESERVED_FIELDS: &[&str] = &["parent", "spec", "self"];

/// Builds a new object frame. `prototype` is the parent frame for inherited field
/// lookup (set by `make` when copying an existing object, §4.I.1); `fields` are
/// this object's own field initializers, each evaluated already.
pub fn make_object(
    evaluator: &mut Evaluator,
    prototype: Option<FrameId>,
    fields: &[(SymbolId, Value)],
) -> EvalResult<FrameId> {
    let object_frame = evaluator.frames_mut().new_frame(prototype, FrameKind::Object);
    let mut seen = std::collections::HashSet::new();
    for (name, value) in fields {
        let spelling = evaluator.symbols().name(*name).to_string();
        if RESERVED_FIELDS.contains(&spelling.as_str()) {
            return Err(error::reserved_field(&spelling));
        }
        if !seen.insert(*name) {
            return Err(error::object_field_duplicate(&spelling));
        }
        evaluator.frames_mut().define(object_frame, *name, value.clone());
    }
    Ok(object_frame)
}

fn field_name(symbols: &Symbols, sym: SymbolId) -> String {
    symbols.name(sym).to_string()
}

fn resolve_index_segment(evaluator: &mut Evaluator, segment: &PathSegment, base_frame: FrameId) -> EvalResult<Option<i64>> {
    match segment {
        PathSegment::Index(n) => Ok(Some(*n)),
        PathSegment::Paren(body) => match evaluator.do_block(*body, base_frame)? {
            Value::Integer(n) => Ok(Some(n)),
            _ => Ok(None),
        },
        PathSegment::Word(_) => Ok(None),
    }
}

/// Reads a path expression against `base_frame` (§4.I.2): the first segment
/// resolves a word in the lexical chain, later segments step through object
/// fields or series positions.
pub fn path_get(evaluator: &mut Evaluator, path: &PathData, base_frame: FrameId) -> EvalResult<Value> {
    let PathSegment::Word(first) = path.segments[0] else {
        return Err(error::syntax_error("path must begin with a word"));
    };
    let (mut current, _) = evaluator
        .frames()
        .get(base_frame, first)
        .ok_or_else(|| error::no_value(&field_name(evaluator.symbols(), first)))?;

    for segment in &path.segments[1..] {
        current = step(evaluator, &current, segment, base_frame)?;
    }
    Ok(current)
}

fn step(evaluator: &mut Evaluator, current: &Value, segment: &PathSegment, base_frame: FrameId) -> EvalResult<Value> {
    if matches!(current, Value::None) {
        return Err(error::none_path());
    }
    match current {
        Value::Object(frame) => {
            let PathSegment::Word(field) = segment else {
                return Err(error::type_mismatch("path", "word segment for object", "index"));
            };
            evaluator
                .frames()
                .get(*frame, *field)
                .map(|(v, _)| v)
                .ok_or_else(|| error::no_such_field(&field_name(evaluator.symbols(), *field)))
        }
        Value::String(s) | Value::Binary(s) | Value::Block(s) | Value::Paren(s) => {
            let index = resolve_index_segment(evaluator, segment, base_frame)?
                .ok_or_else(|| error::type_mismatch("path", "integer index for series", "word"))?;
            s.pick(index)
        }
        other => Err(error::type_mismatch("path", "object! or a series", other.value_type().name())),
    }
}

/// Writes `value` at the end of a path expression (§4.I.2 `set-path`): all but
/// the last segment are walked read-only, then the final segment is assigned.
pub fn path_set(evaluator: &mut Evaluator, path: &PathData, base_frame: FrameId, value: Value) -> EvalResult<()> {
    let PathSegment::Word(first) = path.segments[0] else {
        return Err(error::syntax_error("path must begin with a word"));
    };
    if path.segments.len() == 1 {
        evaluator.frames_mut().put(base_frame, first, value)?;
        return Ok(());
    }
    let (mut current, _) = evaluator
        .frames()
        .get(base_frame, first)
        .ok_or_else(|| error::no_value(&field_name(evaluator.symbols(), first)))?;

    for segment in &path.segments[1..path.segments.len() - 1] {
        current = step(evaluator, &current, segment, base_frame)?;
    }

    let last = &path.segments[path.segments.len() - 1];
    match &current {
        Value::Object(frame) => {
            let PathSegment::Word(field) = last else {
                return Err(error::type_mismatch("path", "word segment for object", "index"));
            };
            if !evaluator.frames().has_local(*frame, *field) {
                return Err(error::no_such_field(&field_name(evaluator.symbols(), *field)));
            }
            evaluator.frames_mut().define(*frame, *field, value);
            Ok(())
        }
        Value::String(s) | Value::Binary(s) | Value::Block(s) | Value::Paren(s) => {
            let index = resolve_index_segment(evaluator, last, base_frame)?
                .ok_or_else(|| error::type_mismatch("path", "integer index for series", "word"))?;
            s.poke(index, &value)
        }
        other => Err(error::type_mismatch("path", "object! or a series", other.value_type().name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eval::Evaluator, value::Value};

    #[test]
    fn path_get_reads_nested_object_field() {
        let mut evaluator = Evaluator::new_default();
        let inner_name = evaluator.symbols_mut().intern("x");
        let inner = make_object(&mut evaluator, None, &[(inner_name, Value::Integer(7))]).unwrap();
        let outer_name = evaluator.symbols_mut().intern("inner");
        let outer = make_object(&mut evaluator, None, &[(outer_name, Value::Object(inner))]).unwrap();

        let outer_sym = evaluator.symbols_mut().intern("o");
        evaluator.frames_mut().define(crate::frame::ROOT_FRAME, outer_sym, Value::Object(outer));

        let path = PathData {
            segments: vec![PathSegment::Word(outer_sym), PathSegment::Word(inner_name)],
        };
        let result = path_get(&mut evaluator, &path, crate::frame::ROOT_FRAME).unwrap();
        assert_eq!(result, Value::Object(inner));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let mut evaluator = Evaluator::new_default();
        let name = evaluator.symbols_mut().intern("x");
        let result = make_object(&mut evaluator, None, &[(name, Value::Integer(1)), (name, Value::Integer(2))]);
        assert!(result.is_err());
    }
}

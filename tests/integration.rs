//! End-to-end scenarios exercising the parser, evaluator, and bootstrap
//! natives together, the way a host embedding the crate would run a whole
//! program rather than poke at one module.

use viro::{Evaluator, Value};

fn run(code: &str) -> Value {
    let mut evaluator = Evaluator::new_default();
    evaluator.run(code).unwrap_or_else(|e| panic!("{code:?} failed: {e}"))
}

fn run_err(code: &str) -> viro::Error {
    let mut evaluator = Evaluator::new_default();
    evaluator.run(code).expect_err(&format!("{code:?} should have failed"))
}

#[test]
fn inc_chain_mutates_through_set_word_and_word() {
    let result = run("x: 1 x: x + 1 x: x + 1 x");
    assert_eq!(result, Value::Integer(3));
}

#[test]
fn factorial_via_recursion_and_either() {
    let code = r"
        factorial: fn [n] [
            either (= n 0) [1] [n * (factorial (n - 1))]
        ]
        factorial 5
    ";
    assert_eq!(run(code), Value::Integer(120));
}

#[test]
fn while_loop_accumulates_a_running_total() {
    let code = r"
        total: 0
        i: 1
        while [i < 11] [
            total: total + i
            i: i + 1
        ]
        total
    ";
    assert_eq!(run(code), Value::Integer(55));
}

#[test]
fn object_field_get_and_set_through_path() {
    let code = r"
        point: object [x: 1 y: 2]
        point.x: point.x + 10
        point.y
    ";
    assert_eq!(run(code), Value::Integer(2));
    let code = r"
        point: object [x: 1 y: 2]
        point.x: point.x + 10
        point.x
    ";
    assert_eq!(run(code), Value::Integer(11));
}

#[test]
fn make_prototype_inherits_fields_not_present_in_child() {
    let code = r#"
        base: object [greeting: "hi"]
        child: make base [name: "a"]
        child.greeting
    "#;
    let result = run(code);
    let Value::String(s) = &result else {
        panic!("expected string!, got {result:?}");
    };
    assert_eq!(s.with_str(|t| t.to_string()), "hi");
}

#[test]
fn object_spec_rejects_reserved_field_names() {
    for field in ["parent", "spec", "self"] {
        let err = run_err(&format!("object [{field}: 1]"));
        assert_eq!(err.id(), viro::ErrorId::ReservedField);
    }
}

#[test]
fn object_spec_rejects_a_duplicate_field() {
    let err = run_err("object [x: 1 x: 2]");
    assert_eq!(err.id(), viro::ErrorId::ObjectFieldDuplicate);
}

#[test]
fn make_object_bang_constructs_a_plain_object() {
    let code = r#"
        shape: make object! [sides: 4]
        shape.sides
    "#;
    assert_eq!(run(code), Value::Integer(4));
}

#[test]
fn skip_and_take_share_and_then_fork_the_buffer() {
    let code = r"
        a: [1 2 3 4 5]
        b: skip a 2
        first b
    ";
    assert_eq!(run(code), Value::Integer(3));

    let code = r"
        a: [1 2 3 4 5]
        c: take --part 2 a
        length? c
    ";
    assert_eq!(run(code), Value::Integer(2));
}

#[test]
fn copy_with_a_negative_part_is_an_error() {
    let err = run_err("copy --part -1 [1 2]");
    assert_eq!(err.id(), viro::ErrorId::OutOfBounds);
}

#[test]
fn literal_block_at_the_same_source_position_is_the_same_series() {
    let code = r"
        make-box: does [[]]
        a: make-box
        b: append a 1
        length? a
    ";
    // append mutates in place (shares the buffer), so a reflects the push
    // even though `b` is the value `append` returned.
    assert_eq!(run(code), Value::Integer(1));
}

#[test]
fn no_scope_function_mutates_the_caller_frame_in_place() {
    let code = r"
        x: 1
        bump: fn --no-scope [] [x: x + 1]
        bump
        x
    ";
    assert_eq!(run(code), Value::Integer(2));
}

#[test]
fn no_scope_parameter_name_is_restored_after_the_call() {
    // `n` pre-exists in the caller; the no-scope call's own `n` parameter
    // must not clobber it once `set-it` returns.
    let code = r"
        n: 100
        set-it: fn --no-scope [n] [y: n]
        set-it 9
        n
    ";
    assert_eq!(run(code), Value::Integer(100));
}

#[test]
fn no_scope_body_assignments_to_non_parameter_names_persist_in_the_caller() {
    // Only the call's own parameter names get save/restore treatment — an
    // ordinary set-word written inside the body runs directly in the
    // caller's frame and stays bound after the call returns.
    let code = r"
        set-it: fn --no-scope [n] [y: n]
        set-it 9
        y
    ";
    assert_eq!(run(code), Value::Integer(9));
}

#[test]
fn closures_capture_their_defining_frame_not_the_call_site() {
    let code = r"
        make-adder: fn [n] [
            fn [x] [x + n]
        ]
        add5: make-adder 5
        add5 10
    ";
    assert_eq!(run(code), Value::Integer(15));
}

#[test]
fn lit_word_parameters_receive_the_raw_word_unevaluated() {
    let code = r"
        capture: fn ['name] [name]
        capture some-unbound-word
    ";
    assert!(matches!(run(code), Value::Word(_)));
}

#[test]
fn refinement_value_is_always_evaluated_even_for_a_literal_param_function() {
    let code = r"
        grab: fn ['name --default value] [
            either (= none value) [name] [value]
        ]
        grab some-word --default 1 + 2
    ";
    assert_eq!(run(code), Value::Integer(3));
}

#[test]
fn action_dispatch_without_an_implementation_is_an_error() {
    let err = run_err("negate \"hi\"");
    assert_eq!(err.id(), viro::ErrorId::ActionNoImpl);
}

#[test]
fn empty_series_reports_empty_and_has_no_first() {
    assert_eq!(run("empty? []"), Value::Logic(true));
    let err = run_err("first []");
    assert_eq!(err.id(), viro::ErrorId::EmptySeries);
}

#[test]
fn pick_out_of_bounds_on_a_string_returns_none() {
    assert_eq!(run("pick \"hi\" 10"), Value::None);
}

#[test]
fn path_index_out_of_bounds_on_a_block_is_an_error() {
    let err = run_err("items: [1 2] items.10");
    assert_eq!(err.id(), viro::ErrorId::OutOfBounds);
}

#[test]
fn path_indexing_into_a_block_is_one_based() {
    let code = "items: [10 20 30] items.1";
    assert_eq!(run(code), Value::Integer(10));
}

#[test]
fn split_breaks_a_string_on_every_delimiter_occurrence() {
    let code = r#"length? split "a,,b" ",""#;
    assert_eq!(run(code), Value::Integer(3));
}

#[test]
fn split_with_an_empty_delimiter_is_an_error() {
    let err = run_err(r#"split "hello" """#);
    assert_eq!(err.id(), viro::ErrorId::InvalidOperation);
}

#[test]
fn left_to_right_evaluation_has_no_operator_precedence() {
    // Infix words fold strictly left-to-right with no precedence tiers:
    // `3 + 4 * 2` groups as `(3 + 4) * 2`, not `3 + (4 * 2)`.
    assert_eq!(run("3 + 4 * 2"), Value::Integer(14));
    assert_eq!(run("10 - 6 / 2"), Value::Integer(2));
    assert_eq!(run("20 / 2 * 3"), Value::Integer(30));
    assert_eq!(run("2 + 3 * 4 + 5"), Value::Integer(25));
}

#[test]
fn power_and_relational_operators_fold_as_infix() {
    assert_eq!(run("2 ** 10"), Value::Integer(1024));
    assert_eq!(run("3 <> 4"), Value::Logic(true));
    assert_eq!(run("3 <> 3"), Value::Logic(false));
    assert_eq!(run("3 <= 3"), Value::Logic(true));
    assert_eq!(run("4 <= 3"), Value::Logic(false));
    assert_eq!(run("3 >= 3"), Value::Logic(true));
    assert_eq!(run("2 >= 3"), Value::Logic(false));
}

#[test]
fn find_last_searches_from_the_tail() {
    let code = "first find --last [1 2 1 2] 1";
    assert_eq!(run(code), Value::Integer(1));
    let code = "index? find --last [1 2 1 2] 1";
    assert_eq!(run(code), Value::Integer(3));
    let code = "index? find [1 2 1 2] 1";
    assert_eq!(run(code), Value::Integer(1));
}

#[test]
fn select_default_substitutes_for_a_missing_key() {
    let code = r#"select --default 99 [a 1 b 2] 'c"#;
    assert_eq!(run(code), Value::Integer(99));
    let code = "select [a 1 b 2] 'b";
    assert_eq!(run(code), Value::Integer(2));
}

#[test]
fn trim_default_strips_both_ends_only() {
    let code = r#"trim "  hi  there  ""#;
    let Value::String(s) = run(code) else { panic!("expected string!") };
    assert_eq!(s.with_str(|t| t.to_string()), "hi  there");
}

#[test]
fn trim_all_squeezes_every_whitespace_occurrence() {
    let code = r#"trim --all "  hi  there  ""#;
    let Value::String(s) = run(code) else { panic!("expected string!") };
    assert_eq!(s.with_str(|t| t.to_string()), "hithere");
}

#[test]
fn trim_head_leaves_the_trailing_whitespace_alone() {
    let code = r#"trim --head "  hi  ""#;
    let Value::String(s) = run(code) else { panic!("expected string!") };
    assert_eq!(s.with_str(|t| t.to_string()), "hi  ");
}

#[test]
fn trim_on_a_block_removes_only_leading_and_trailing_none() {
    let code = "length? trim [none 1 none 2 none]";
    assert_eq!(run(code), Value::Integer(3));
}

#[test]
fn trim_head_and_tail_together_is_an_error() {
    let err = run_err(r#"trim --head --tail "hi""#);
    assert_eq!(err.id(), viro::ErrorId::InvalidOperation);
}

#[test]
fn trim_auto_on_a_block_is_an_error() {
    let err = run_err("trim --auto [1 2]");
    assert_eq!(err.id(), viro::ErrorId::InvalidOperation);
}

#[test]
fn mold_round_trips_through_the_parser() {
    let mut evaluator = Evaluator::new_default();
    let value = evaluator.run("[1 \"two\" 3]").unwrap();
    let molded = value.mold(evaluator.symbols());
    let mut evaluator2 = Evaluator::new_default();
    let reparsed = evaluator2.run(&molded).unwrap();
    assert_eq!(reparsed, value);
}

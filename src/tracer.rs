//! Tracer seam (§4.F.5 ambient additions): a no-op-by-default observation hook for
//! the evaluator, not a side channel for program behavior.
//!
//! Grounded on the teacher's `tracer.rs` `VmTracer` trait — a zero-cost-when-unused
//! hook the bytecode loop calls on every instruction so host tooling (a debugger, a
//! profiler) can observe execution without the interpreter core depending on any of
//! that tooling. The teacher also ships profiling/coverage tracer implementations;
//! those are specific tools built on the seam, not part of the seam itself, so only
//! the no-op and a minimal stderr tracer are carried over here.

use crate::{symbol::Symbols, value::Value};

/// Observes evaluator activity. Every method has a default no-op body so
/// implementers only override what they care about.
pub trait Tracer {
    /// Called before evaluating one top-level expression within a block.
    fn on_expr(&mut self, _value: &Value, _symbols: &Symbols) {}

    /// Called when a function call begins, with the current call depth.
    fn on_call(&mut self, _name: &str, _depth: usize) {}

    /// Called when a function call returns.
    fn on_return(&mut self, _name: &str, _depth: usize, _result: &Value, _symbols: &Symbols) {}
}

/// The default tracer: observes nothing, costs nothing.
#[derive(Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Prints a one-line trace of every call to stderr — useful for debugging a host
/// integration, not meant for production use.
#[derive(Debug, Default)]
pub struct StderrTracer;

impl Tracer for StderrTracer {
    fn on_call(&mut self, name: &str, depth: usize) {
        eprintln!("{}-> {name}", "  ".repeat(depth));
    }

    fn on_return(&mut self, name: &str, depth: usize, result: &Value, symbols: &Symbols) {
        eprintln!("{}<- {name} = {}", "  ".repeat(depth), result.mold(symbols));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_tracer_accepts_all_events_without_panicking() {
        let mut tracer = NoopTracer;
        let symbols = Symbols::new();
        tracer.on_expr(&Value::None, &symbols);
        tracer.on_call("foo", 1);
        tracer.on_return("foo", 1, &Value::None, &symbols);
    }
}

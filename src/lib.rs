//! Core runtime for a homoiconic, REBOL-family dynamic language: parser,
//! tree-walking evaluator, and the bootstrap native library.
//!
//! Embedding entry point is [`Evaluator`]: construct one (directly, or via
//! [`Evaluator::new_default`]), then call [`Evaluator::run`] with source text.
//! Ambient seams a host may want to configure before running untrusted code:
//! [`sandbox::SandboxRoot`]/[`sandbox::CapabilitySet`] (port access), [`tracer::Tracer`]
//! (execution observation), and [`io::PrintWriter`] (where `print`/`prin` go).

pub mod decimal;
pub mod error;
pub mod eval;
pub mod frame;
pub mod function;
pub mod io;
pub mod natives;
pub mod object;
pub mod parser;
pub mod registry;
pub mod resource;
pub mod sandbox;
pub mod series;
pub mod symbol;
pub mod tracer;
pub mod value;

pub use error::{Category, Error, ErrorId, EvalResult};
pub use eval::Evaluator;
pub use resource::ResourceLimits;
pub use sandbox::{Capability, CapabilitySet, SandboxRoot};
pub use series::Series;
pub use tracer::Tracer;
pub use value::{Value, ValueType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_a_program_returns_its_final_value() {
        let mut evaluator = Evaluator::new_default();
        let result = evaluator.run("x: 1 y: 2 x + y").unwrap();
        assert_eq!(result, Value::Integer(3));
    }

    #[test]
    fn factorial_via_recursion_and_if() {
        let mut evaluator = Evaluator::new_default();
        let program = r#"
            factorial: fn [n] [
                if (= n 0) [1]
            ]
        "#;
        // A minimal smoke test of definition + conditional without recursion,
        // since the full factorial scenario lives in the integration tests.
        let result = evaluator.run(program).unwrap();
        assert!(matches!(result, Value::Function(_)));
    }
}

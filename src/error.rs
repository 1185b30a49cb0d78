//! Error model: category + stable ID + args + message + source location.
//!
//! Every fallible operation in the runtime returns [`EvalResult<T>`]. Errors are plain
//! data (not trait objects) so host code and tests can match on `category()`/`id()`
//! exhaustively, and the stable [`ErrorId`] strings are derived rather than hand-written.

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

use crate::parser::SourceLoc;

/// Broad error category, used by hosts to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Category {
    Syntax,
    Script,
    Math,
    Access,
    Internal,
}

/// Stable error identifier. The `Display`/`EnumString` impls render/parse the exact
/// kebab-case spelling tests and host code key on (e.g. `type-mismatch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorId {
    ArgCount,
    TypeMismatch,
    NoValue,
    ActionNoImpl,
    EmptySeries,
    OutOfBounds,
    InvalidOperation,
    NotComparable,
    NoSuchField,
    NonePath,
    ReservedField,
    ObjectFieldDuplicate,
    ImmutableTarget,
    MathOverflow,
    MathUnderflow,
    ZeroDivide,
    DecimalOverflow,
    MathDomain,
    AccessError,
    SyntaxError,
    StackOverflow,
}

impl ErrorId {
    /// The category every occurrence of this ID belongs to (fixed by §7 of the spec).
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::SyntaxError => Category::Syntax,
            Self::MathOverflow
            | Self::MathUnderflow
            | Self::ZeroDivide
            | Self::DecimalOverflow
            | Self::MathDomain => Category::Math,
            Self::AccessError => Category::Access,
            Self::StackOverflow => Category::Internal,
            _ => Category::Script,
        }
    }
}

/// A runtime error: stable ID, human message, positional args, and source location.
///
/// `args` carries the structured data tests assert on (e.g. `out-of-bounds` args are
/// `[attempted, length, min-valid]`); `message` is the rendered human-readable text.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    id: ErrorId,
    args: Vec<String>,
    message: String,
    location: Option<SourceLoc>,
}

impl Error {
    #[must_use]
    pub fn new(id: ErrorId, message: impl Into<String>) -> Self {
        Self {
            id,
            args: Vec::new(),
            message: message.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_location(mut self, loc: SourceLoc) -> Self {
        self.location = Some(loc);
        self
    }

    #[must_use]
    pub fn id(&self) -> ErrorId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.id.category()
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn location(&self) -> Option<SourceLoc> {
        self.location
    }

    /// Attaches a location only if the error does not already carry one — evaluation
    /// unwinds through many stack levels and the innermost location should win.
    pub fn fill_location(&mut self, loc: SourceLoc) {
        if self.location.is_none() {
            self.location = Some(loc);
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)?;
        if let Some(loc) = self.location {
            write!(f, " at {loc}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the runtime.
pub type EvalResult<T> = Result<T, Error>;

// --- Error constructors for the common shapes, grounded on the stable-ID table in §7. ---

pub fn arg_count(native: &str, expected: usize, got: usize) -> Error {
    Error::new(
        ErrorId::ArgCount,
        format!("{native} expects {expected} argument(s), got {got}"),
    )
    .with_args(vec![expected.to_string(), got.to_string()])
}

pub fn type_mismatch(op: &str, expected: &str, got: &str) -> Error {
    Error::new(ErrorId::TypeMismatch, format!("{op} expected {expected}, got {got}"))
        .with_args(vec![expected.to_string(), got.to_string()])
}

pub fn no_value(name: &str) -> Error {
    Error::new(ErrorId::NoValue, format!("{name} has no value")).with_args(vec![name.to_string()])
}

pub fn action_no_impl(action: &str, type_name: &str) -> Error {
    Error::new(
        ErrorId::ActionNoImpl,
        format!("{type_name} does not support {action}"),
    )
    .with_args(vec![action.to_string(), type_name.to_string()])
}

pub fn empty_series(action: &str) -> Error {
    Error::new(ErrorId::EmptySeries, format!("{action} on empty series"))
}

pub fn out_of_bounds(attempted: i64, length: usize, min_valid: i64) -> Error {
    Error::new(
        ErrorId::OutOfBounds,
        format!("index {attempted} out of bounds (length {length})"),
    )
    .with_args(vec![attempted.to_string(), length.to_string(), min_valid.to_string()])
}

pub fn invalid_operation(msg: impl Into<String>) -> Error {
    Error::new(ErrorId::InvalidOperation, msg)
}

pub fn not_comparable() -> Error {
    Error::new(ErrorId::NotComparable, "cannot compare incompatible types")
}

pub fn no_such_field(field: &str) -> Error {
    Error::new(ErrorId::NoSuchField, format!("no such field: {field}")).with_args(vec![field.to_string()])
}

pub fn none_path() -> Error {
    Error::new(ErrorId::NonePath, "path traversal hit none")
}

pub fn reserved_field(field: &str) -> Error {
    Error::new(ErrorId::ReservedField, format!("{field} is a reserved field name"))
}

pub fn object_field_duplicate(field: &str) -> Error {
    Error::new(ErrorId::ObjectFieldDuplicate, format!("duplicate field: {field}"))
}

pub fn immutable_target() -> Error {
    Error::new(ErrorId::ImmutableTarget, "cannot assign to an immutable target")
}

pub fn math_overflow() -> Error {
    Error::new(ErrorId::MathOverflow, "arithmetic overflow")
}

pub fn math_underflow() -> Error {
    Error::new(ErrorId::MathUnderflow, "arithmetic underflow")
}

pub fn zero_divide() -> Error {
    Error::new(ErrorId::ZeroDivide, "attempt to divide by zero")
}

pub fn decimal_overflow() -> Error {
    Error::new(ErrorId::DecimalOverflow, "decimal exceeds 34-digit precision")
}

pub fn math_domain(msg: impl Into<String>) -> Error {
    Error::new(ErrorId::MathDomain, msg)
}

pub fn access_error(msg: impl Into<String>) -> Error {
    Error::new(ErrorId::AccessError, msg)
}

pub fn syntax_error(msg: impl Into<String>) -> Error {
    Error::new(ErrorId::SyntaxError, msg)
}

pub fn stack_overflow(limit: usize) -> Error {
    Error::new(ErrorId::StackOverflow, format!("call depth exceeded limit of {limit}"))
}

//! Runtime error types and the error-propagation channel.
//!
//! Native functions report failures by returning `Err` through [`RunResult`];
//! the surrounding runtime turns that into a script-visible exception. This
//! is the whole of the "pending error" channel: there is no thread-local or
//! global error state, just `Result` flowing back through `?`.

use std::{
    borrow::Cow,
    fmt::{self, Display},
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::types::Type;

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Script-level exception types raised by the native-call layer.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and
/// `Into<&'static str>` implementations. The string representation matches
/// the variant name exactly (e.g. `TypeError` -> "TypeError").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ExcType {
    /// Primary exception class - matches any exception in instance checks.
    Exception,
    BaseException,

    /// Intermediate class for arithmetic errors.
    ArithmeticError,
    /// Subclass of ArithmeticError, raised when a numeric conversion cannot
    /// represent its input.
    OverflowError,

    /// Intermediate class for lookup errors.
    LookupError,
    /// Subclass of LookupError.
    KeyError,

    AttributeError,
    MemoryError,
    RuntimeError,
    TypeError,
    ValueError,
}

impl ExcType {
    /// Checks if this exception type is a subclass of another exception type.
    ///
    /// Returns true if `self` would be caught by a handler for `handler_type`.
    #[must_use]
    pub fn is_subclass_of(self, handler_type: Self) -> bool {
        if self == handler_type {
            return true;
        }
        match handler_type {
            Self::BaseException => true,
            Self::Exception => self != Self::BaseException,
            Self::ArithmeticError => self == Self::OverflowError,
            Self::LookupError => self == Self::KeyError,
            _ => false,
        }
    }

    /// Creates a TypeError with the given message.
    #[must_use]
    pub(crate) fn type_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, msg).into()
    }

    /// Creates a TypeError for a function called with arguments when it
    /// accepts none.
    #[must_use]
    pub(crate) fn type_error_no_args(name: &str, actual: usize) -> RunError {
        Self::type_error(format!(
            "{name}() takes no arguments ({actual} given)"
        ))
    }

    /// Creates a TypeError for a wrong positional argument count.
    #[must_use]
    pub(crate) fn type_error_arg_count(name: &str, expected: usize, actual: usize) -> RunError {
        Self::type_error(format!(
            "{name}() takes exactly {expected} argument{} ({actual} given)",
            if expected == 1 { "" } else { "s" },
        ))
    }

    /// Creates a TypeError for an unexpected keyword argument.
    #[must_use]
    pub(crate) fn type_error_unexpected_keyword(name: &str, key: &str) -> RunError {
        Self::type_error(format!(
            "{name}() got an unexpected keyword argument '{key}'"
        ))
    }

    /// Creates a TypeError for an argument passed both positionally and by
    /// keyword.
    #[must_use]
    pub(crate) fn type_error_duplicate_arg(name: &str, param: &str) -> RunError {
        Self::type_error(format!("{name}() got multiple values for argument '{param}'"))
    }

    /// Creates a TypeError for non-string keyword argument keys.
    #[must_use]
    pub(crate) fn type_error_kwargs_nonstring_key() -> RunError {
        Self::type_error("keywords must be strings")
    }

    /// Creates a TypeError for an unhashable dict key.
    #[must_use]
    pub(crate) fn type_error_unhashable(type_: Type) -> RunError {
        Self::type_error(format!("unhashable type: '{type_}'"))
    }

    /// Creates an AttributeError for a missing namespace attribute.
    #[must_use]
    pub(crate) fn attribute_error_namespace(namespace: &str, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("namespace '{namespace}' has no attribute '{attr}'"),
        )
        .into()
    }

    /// Creates a KeyError for an unknown namespace name.
    #[must_use]
    pub(crate) fn key_error_namespace(namespace: &str) -> RunError {
        SimpleException::new_msg(Self::KeyError, format!("no namespace named '{namespace}'")).into()
    }
}

/// An exception instance: a type plus an optional message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleException {
    exc_type: ExcType,
    arg: Option<String>,
}

impl SimpleException {
    /// Creates an exception with no message.
    #[must_use]
    pub fn new(exc_type: ExcType) -> Self {
        Self { exc_type, arg: None }
    }

    /// Creates an exception with a message.
    #[must_use]
    pub fn new_msg(exc_type: ExcType, arg: impl Display) -> Self {
        Self {
            exc_type,
            arg: Some(arg.to_string()),
        }
    }

    /// The exception type.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    /// The message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.arg.as_deref()
    }
}

impl fmt::Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(msg) => write!(f, "{}: {msg}", self.exc_type),
            None => write!(f, "{}", self.exc_type),
        }
    }
}

/// An error produced while executing native code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunError {
    /// Internal error - indicates a bug in the host's use of the API (e.g. a
    /// malformed format string), not in script-supplied arguments.
    Internal(Cow<'static, str>),
    /// Catchable script exception (e.g. TypeError, OverflowError).
    Exc(SimpleException),
}

impl RunError {
    /// The script exception type, or `None` for internal errors.
    #[must_use]
    pub fn exc_type(&self) -> Option<ExcType> {
        match self {
            Self::Internal(_) => None,
            Self::Exc(exc) => Some(exc.exc_type()),
        }
    }

    /// Creates an internal error from a static message.
    #[must_use]
    pub fn internal(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal(msg.into())
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
            Self::Exc(exc) => exc.fmt(f),
        }
    }
}

impl std::error::Error for RunError {}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exc(exc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subclass_hierarchy() {
        assert!(ExcType::OverflowError.is_subclass_of(ExcType::ArithmeticError));
        assert!(ExcType::OverflowError.is_subclass_of(ExcType::Exception));
        assert!(ExcType::KeyError.is_subclass_of(ExcType::LookupError));
        assert!(!ExcType::TypeError.is_subclass_of(ExcType::LookupError));
        assert!(ExcType::TypeError.is_subclass_of(ExcType::BaseException));
    }

    #[test]
    fn display_includes_message() {
        let err = ExcType::type_error_unexpected_keyword("f", "x");
        assert_eq!(err.to_string(), "TypeError: f() got an unexpected keyword argument 'x'");
        assert_eq!(err.exc_type(), Some(ExcType::TypeError));
    }
}

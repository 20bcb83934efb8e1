//! Runtime error types for interpreted evaluation
//!
//! Every failure the runtime can observe is surfaced as a `RuntimeError`;
//! nothing is downgraded to a default value.

use thiserror::Error;

/// Runtime error type
///
/// Represents errors that can occur while casting values or evaluating
/// expressions against an execution context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A value could not be converted to the requested type
    #[error("CastError: {0}")]
    Cast(String),

    /// An operation was attempted inside a restricted (limited) context
    #[error("SecurityError: {0}")]
    SecurityRestriction(String),

    /// Division or modulus by zero
    #[error("DivisionByZero: division by zero")]
    DivisionByZero,

    /// Arithmetic that cannot be computed exactly (e.g. fractional exponent)
    #[error("ArithmeticError: {0}")]
    Arithmetic(String),

    /// Variable or member lookup failed
    #[error("UndefinedError: variable [{0}] doesn't exist")]
    UndefinedVariable(String),

    /// A value could not be used as a collection key
    #[error("KeyError: {0}")]
    InvalidKey(String),

    /// Configuration could not be read or parsed
    #[error("ConfigError: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

impl RuntimeError {
    /// Create a cast error
    pub fn cast<S: Into<String>>(msg: S) -> Self {
        RuntimeError::Cast(msg.into())
    }

    /// Create a security restriction error
    pub fn security_restriction<S: Into<String>>(msg: S) -> Self {
        RuntimeError::SecurityRestriction(msg.into())
    }

    /// Create an arithmetic error
    pub fn arithmetic<S: Into<String>>(msg: S) -> Self {
        RuntimeError::Arithmetic(msg.into())
    }

    /// Create an undefined variable error
    pub fn undefined<S: Into<String>>(name: S) -> Self {
        RuntimeError::UndefinedVariable(name.into())
    }

    /// Create an invalid key error
    pub fn invalid_key<S: Into<String>>(msg: S) -> Self {
        RuntimeError::InvalidKey(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        RuntimeError::Config(msg.into())
    }

    /// Create a custom error
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        RuntimeError::Custom(msg.into())
    }

    /// True for failures raised by the restriction gate
    pub fn is_security_restriction(&self) -> bool {
        matches!(self, RuntimeError::SecurityRestriction(_))
    }
}

/// Result type alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::cast("can't cast [abc] to a number");
        assert_eq!(format!("{}", err), "CastError: can't cast [abc] to a number");

        let err = RuntimeError::undefined("foo");
        assert_eq!(
            format!("{}", err),
            "UndefinedError: variable [foo] doesn't exist"
        );

        let err = RuntimeError::DivisionByZero;
        assert_eq!(format!("{}", err), "DivisionByZero: division by zero");
    }

    #[test]
    fn test_security_restriction_kind() {
        assert!(RuntimeError::security_restriction("no math").is_security_restriction());
        assert!(!RuntimeError::arithmetic("bad exponent").is_security_restriction());
    }
}

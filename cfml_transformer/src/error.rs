use std::fmt;

use cfml_runtime::error::RuntimeError;

use crate::span::Span;

/// Failure while building or emitting an expression tree, or while
/// evaluating one in interpreted mode.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformerError {
    /// Literal text that does not convert to the requested type
    Cast { message: String, span: Option<Span> },
    /// Malformed tree or invalid key registration
    Compile { message: String, span: Option<Span> },
    /// Evaluation failure from the runtime
    Runtime(RuntimeError),
}

impl TransformerError {
    pub fn cast(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::Cast {
            message: message.into(),
            span,
        }
    }

    pub fn compile(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::Compile {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Cast { span, .. } | Self::Compile { span, .. } => *span,
            Self::Runtime(_) => None,
        }
    }

    pub fn is_security_restriction(&self) -> bool {
        matches!(self, Self::Runtime(e) if e.is_security_restriction())
    }
}

impl fmt::Display for TransformerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, message, span) = match self {
            TransformerError::Cast { message, span } => ("CastError", message, span),
            TransformerError::Compile { message, span } => ("CompileError", message, span),
            TransformerError::Runtime(e) => return write!(f, "{}", e),
        };
        match span {
            Some(span) => write!(f, "{}: {} ({})", kind, message, span),
            None => write!(f, "{}: {}", kind, message),
        }
    }
}

impl std::error::Error for TransformerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransformerError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RuntimeError> for TransformerError {
    fn from(e: RuntimeError) -> Self {
        TransformerError::Runtime(e)
    }
}

pub type TResult<T> = Result<T, TransformerError>;

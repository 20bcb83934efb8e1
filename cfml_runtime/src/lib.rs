//! CFML Runtime Library
//!
//! This crate provides the runtime side of the CFML expression core. It
//! includes:
//!
//! - `Value` enum for dynamic typing
//! - `Decimal` exact arithmetic (never floating point)
//! - `Key` case-insensitive member names and the well-known key constants
//! - `RuntimeError` for error handling
//! - Type conversion utilities and operator dispatch
//! - `ExecutionContext` with scope bindings and the `limited` capability
//! - Interpreted evaluation through `Ref` handles
//! - Task listener argument records

pub mod config;
pub mod context;
pub mod convert;
pub mod decimal;
pub mod dispatch;
pub mod error;
pub mod interpreter;
pub mod key;
pub mod scope;
pub mod spooler;
pub mod value;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use cfml_runtime::prelude::*;
///
/// let mut ctx = ExecutionContext::new(std::sync::Arc::new(EngineConfig::default()));
/// let sum = BigOp::new(
///     NumberOp::Plus,
///     Box::new(LiteralRef::new(Value::from("0.1"))),
///     Box::new(LiteralRef::new(Value::from("0.2"))),
/// );
/// assert_eq!(sum.evaluate(&mut ctx).unwrap(), "0.3");
/// ```
pub mod prelude {
    pub use super::config::EngineConfig;
    pub use super::context::ExecutionContext;
    pub use super::decimal::Decimal;
    pub use super::dispatch::{AssignKind, BoolOp, CastTarget, DecisionOp, NegateOp, NumberOp};
    pub use super::error::{RuntimeError, RuntimeResult};
    pub use super::interpreter::{BigOp, LiteralRef, Ref, RefBox};
    pub use super::key::Key;
    pub use super::scope::Scope;
    pub use super::value::{Struct, Value};
}

pub use prelude::*;

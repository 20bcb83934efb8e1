// Prevent accidental debug output in library code.
#![deny(clippy::print_stderr)]

//! CFML expression transformer
//!
//! Builds typed expression trees from literals and operators, applies the
//! language's coercion rules at build time where the operands allow it,
//! and then either emits stack-machine instructions for a compilation unit
//! ([`codegen`]) or evaluates the tree directly ([`interpret`]).
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use cfml_transformer::prelude::*;
//!
//! let factory = ExprFactory::new(Arc::new(EngineConfig::default()));
//! let sum = factory.op_number(
//!     &factory.create_lit_number("0.1", None).unwrap(),
//!     &factory.create_lit_string("0.2", None),
//!     NumberOp::Plus,
//! );
//!
//! let mut ctx = ExecutionContext::new(factory.config().clone());
//! assert_eq!(evaluate(&sum, &mut ctx).unwrap(), Value::from("0.3"));
//!
//! let mut unit = CompileContext::new(&factory, "example");
//! write_out(&mut unit, &sum).unwrap();
//! assert_eq!(unit.code().last(), Some(&Instr::Arith(NumberOp::Plus)));
//! ```

pub mod cast;
pub mod codegen;
pub mod error;
pub mod expr;
pub mod factory;
pub mod interpret;
pub mod keys;
pub mod op;
pub mod span;

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::codegen::{register_key, write_out, CompileContext, CompiledUnit, Instr};
    pub use super::error::{TResult, TransformerError};
    pub use super::expr::{DataMember, Expr, ExprRef, ExprType, LitValue, Literal, Op, Variable};
    pub use super::factory::ExprFactory;
    pub use super::interpret::evaluate;
    pub use super::keys::KeyTable;
    pub use super::span::{Position, Span};
    pub use cfml_runtime::prelude::*;
}

pub use factory::ExprFactory;

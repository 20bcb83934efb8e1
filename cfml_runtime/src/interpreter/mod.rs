//! Interpreted evaluation
//!
//! A [`Ref`] is a handle to "the current value of an operand". Refs are
//! resolved lazily and re-resolved on every call, since the bindings they
//! read may change between calls. The arbitrary-precision operators in
//! [`big`] compute exact decimal results and refuse to run inside a limited
//! context.

pub mod big;
pub mod refs;

use std::fmt;

use crate::context::ExecutionContext;
use crate::error::RuntimeResult;
use crate::value::Value;

pub use big::{BigOp, LIMITED_MESSAGE};
pub use refs::{
    CastRef, ConcatRef, ConditionalRef, DecisionRef, ElvisRef, LiteralRef, LogicRef,
    NegateNumberRef, NegateRef, NewCollectionRef, UnaryAssignRef, VariableRef,
};

/// Runtime handle resolving to a value.
pub trait Ref: fmt::Debug {
    /// Resolve the current value
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value>;

    /// Like [`Ref::value`], but an undefined reference resolves to null
    /// instead of failing.
    fn value_or_null(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        self.value(ctx)
    }

    /// Short name of the ref kind, for diagnostics
    fn type_name(&self) -> &'static str;
}

pub type RefBox = Box<dyn Ref>;

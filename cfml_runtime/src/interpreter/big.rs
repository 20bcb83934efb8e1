//! Arbitrary-precision arithmetic operators
//!
//! One evaluator type covers the whole operator family; the operation code
//! selects the computation. Results are canonical decimal strings.

use tracing::warn;

use super::{Ref, RefBox};
use crate::context::ExecutionContext;
use crate::convert;
use crate::dispatch::{compute, NumberOp};
use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;

/// Message of the restriction failure raised for arithmetic in a limited
/// context (such contexts are used while reading JSON-like data).
pub const LIMITED_MESSAGE: &str =
    "invalid syntax, math operations are not supported in a json string.";

/// Fail if `ctx` does not allow computation.
pub(crate) fn ensure_unrestricted(ctx: &ExecutionContext, op: &str) -> RuntimeResult<()> {
    if ctx.is_limited() {
        warn!(op, "operator rejected in limited context");
        return Err(RuntimeError::security_restriction(LIMITED_MESSAGE));
    }
    Ok(())
}

/// Binary arithmetic evaluated with exact decimals.
#[derive(Debug)]
pub struct BigOp {
    op: NumberOp,
    left: RefBox,
    right: RefBox,
}

impl BigOp {
    pub fn new(op: NumberOp, left: RefBox, right: RefBox) -> Self {
        Self { op, left, right }
    }

    pub fn op(&self) -> NumberOp {
        self.op
    }

    /// Compute the result as a canonical decimal string.
    ///
    /// The limited check happens before either operand is resolved, so a
    /// rejected evaluation has no side effects. Operands are resolved left
    /// then right on every call.
    #[tracing::instrument(level = "trace", skip_all, fields(op = self.op.as_str()))]
    pub fn evaluate(&self, ctx: &mut ExecutionContext) -> RuntimeResult<String> {
        ensure_unrestricted(ctx, self.op.as_str())?;
        let left = convert::to_decimal(&self.left.value(ctx)?)?;
        let right = convert::to_decimal(&self.right.value(ctx)?)?;
        let result = compute(self.op, &left, &right, ctx.config().division_precision)?;
        Ok(result.to_string())
    }
}

impl Ref for BigOp {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        self.evaluate(ctx).map(Value::Str)
    }

    fn type_name(&self) -> &'static str {
        "operation"
    }
}

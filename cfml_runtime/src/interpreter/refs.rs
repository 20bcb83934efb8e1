//! Operand handles for interpreted evaluation
//!
//! Each handle re-reads its operands from the context on every call to
//! [`Ref::value`]; nothing is cached between evaluations.

use std::cell::RefCell;
use std::rc::Rc;

use super::big::ensure_unrestricted;
use super::{Ref, RefBox};
use crate::context::ExecutionContext;
use crate::convert;
use crate::dispatch::{
    compute, decide, AssignKind, BoolOp, CastTarget, DecisionOp, NegateOp, NumberOp,
};
use crate::error::{RuntimeError, RuntimeResult};
use crate::key::Key;
use crate::scope::Scope;
use crate::value::{Struct, StructRef, Value};

/// A constant value.
#[derive(Debug)]
pub struct LiteralRef {
    value: Value,
}

impl LiteralRef {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Ref for LiteralRef {
    fn value(&self, _ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        Ok(self.value.clone())
    }

    fn type_name(&self) -> &'static str {
        "literal"
    }
}

/// A fresh, empty struct or array on every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewCollectionRef {
    Struct,
    Array,
}

impl Ref for NewCollectionRef {
    fn value(&self, _ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        Ok(match self {
            NewCollectionRef::Struct => Value::empty_struct(),
            NewCollectionRef::Array => Value::empty_array(),
        })
    }

    fn type_name(&self) -> &'static str {
        match self {
            NewCollectionRef::Struct => "struct",
            NewCollectionRef::Array => "array",
        }
    }
}

/// A scope-rooted chain of member accesses (`scope.a.b.c`).
#[derive(Debug)]
pub struct VariableRef {
    scope: Scope,
    members: Vec<RefBox>,
}

impl VariableRef {
    pub fn new(scope: Scope, members: Vec<RefBox>) -> Self {
        Self { scope, members }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Resolve every member name to a key, in order.
    pub fn resolve_keys(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Vec<Key>> {
        self.members
            .iter()
            .map(|m| convert::to_key(&m.value(ctx)?))
            .collect()
    }

    fn display_name(&self, keys: &[Key]) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(keys.len() + 1);
        if self.scope != Scope::Undefined {
            parts.push(self.scope.name());
        }
        parts.extend(keys.iter().map(|k| k.as_str()));
        parts.join(".")
    }

    /// Read the value at already-resolved `keys`; `None` if any link is
    /// missing.
    pub fn get_with_keys(
        &self,
        ctx: &mut ExecutionContext,
        keys: &[Key],
    ) -> RuntimeResult<Option<Value>> {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(Some(Value::Struct(ctx.scope(self.scope))));
        };
        let mut current = match ctx.get(self.scope, first) {
            Some(v) => v,
            None => return Ok(None),
        };
        for key in rest {
            let next = match &current {
                Value::Struct(s) => s.borrow().get(key).cloned(),
                other => {
                    return Err(RuntimeError::cast(format!(
                        "can't access key [{}] on a value of type {}",
                        key,
                        other.type_name()
                    )))
                }
            };
            match next {
                Some(v) => current = v,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Assign at already-resolved `keys`, creating missing intermediate
    /// structs.
    pub fn set_with_keys(
        &self,
        ctx: &mut ExecutionContext,
        keys: &[Key],
        value: Value,
    ) -> RuntimeResult<()> {
        let Some((last, parents)) = keys.split_last() else {
            return Err(RuntimeError::invalid_key(format!(
                "can't assign to the {} scope itself",
                self.scope.name()
            )));
        };
        let first = parents.first().unwrap_or(last);
        let mut container: StructRef = ctx.scope_for_write(self.scope, first);
        for key in parents {
            let existing = container.borrow().get(key).cloned();
            container = match existing {
                Some(Value::Struct(s)) => s,
                None => {
                    let created: StructRef = Rc::new(RefCell::new(Struct::new()));
                    container
                        .borrow_mut()
                        .set(key.clone(), Value::Struct(created.clone()));
                    created
                }
                Some(other) => {
                    return Err(RuntimeError::cast(format!(
                        "can't assign key [{}] on a value of type {}",
                        last,
                        other.type_name()
                    )))
                }
            };
        }
        container.borrow_mut().set(last.clone(), value);
        Ok(())
    }

    /// Assign `value`, resolving member names first.
    pub fn set(&self, ctx: &mut ExecutionContext, value: Value) -> RuntimeResult<()> {
        let keys = self.resolve_keys(ctx)?;
        self.set_with_keys(ctx, &keys, value)
    }
}

impl Ref for VariableRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        let keys = self.resolve_keys(ctx)?;
        self.get_with_keys(ctx, &keys)?
            .ok_or_else(|| RuntimeError::undefined(self.display_name(&keys)))
    }

    fn value_or_null(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        let keys = self.resolve_keys(ctx)?;
        Ok(self.get_with_keys(ctx, &keys)?.unwrap_or(Value::Null))
    }

    fn type_name(&self) -> &'static str {
        "variable"
    }
}

/// String concatenation.
#[derive(Debug)]
pub struct ConcatRef {
    left: RefBox,
    right: RefBox,
}

impl ConcatRef {
    pub fn new(left: RefBox, right: RefBox) -> Self {
        Self { left, right }
    }
}

impl Ref for ConcatRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        let mut s = convert::to_string(&self.left.value(ctx)?)?;
        s.push_str(&convert::to_string(&self.right.value(ctx)?)?);
        Ok(Value::Str(s))
    }

    fn type_name(&self) -> &'static str {
        "concat"
    }
}

/// Logical not.
#[derive(Debug)]
pub struct NegateRef {
    expr: RefBox,
}

impl NegateRef {
    pub fn new(expr: RefBox) -> Self {
        Self { expr }
    }
}

impl Ref for NegateRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        Ok(Value::Bool(!convert::to_boolean(&self.expr.value(ctx)?)?))
    }

    fn type_name(&self) -> &'static str {
        "not"
    }
}

/// Unary plus/minus.
#[derive(Debug)]
pub struct NegateNumberRef {
    expr: RefBox,
    op: NegateOp,
}

impl NegateNumberRef {
    pub fn new(expr: RefBox, op: NegateOp) -> Self {
        Self { expr, op }
    }
}

impl Ref for NegateNumberRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        let n = convert::to_decimal(&self.expr.value(ctx)?)?;
        Ok(Value::Number(match self.op {
            NegateOp::Plus => n,
            NegateOp::Minus => -&n,
        }))
    }

    fn type_name(&self) -> &'static str {
        "negate"
    }
}

/// Comparison.
#[derive(Debug)]
pub struct DecisionRef {
    left: RefBox,
    right: RefBox,
    op: DecisionOp,
}

impl DecisionRef {
    pub fn new(left: RefBox, right: RefBox, op: DecisionOp) -> Self {
        Self { left, right, op }
    }
}

impl Ref for DecisionRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        let l = self.left.value(ctx)?;
        let r = self.right.value(ctx)?;
        decide(self.op, &l, &r).map(Value::Bool)
    }

    fn type_name(&self) -> &'static str {
        "decision"
    }
}

/// Logical operator; `AND` and `OR` short-circuit.
#[derive(Debug)]
pub struct LogicRef {
    left: RefBox,
    right: RefBox,
    op: BoolOp,
}

impl LogicRef {
    pub fn new(left: RefBox, right: RefBox, op: BoolOp) -> Self {
        Self { left, right, op }
    }
}

impl Ref for LogicRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        let l = convert::to_boolean(&self.left.value(ctx)?)?;
        match (self.op, l) {
            (BoolOp::And, false) => return Ok(Value::Bool(false)),
            (BoolOp::Or, true) => return Ok(Value::Bool(true)),
            _ => {}
        }
        let r = convert::to_boolean(&self.right.value(ctx)?)?;
        Ok(Value::Bool(self.op.apply(l, r)))
    }

    fn type_name(&self) -> &'static str {
        "logic"
    }
}

/// `cond ? left : right`
#[derive(Debug)]
pub struct ConditionalRef {
    cond: RefBox,
    left: RefBox,
    right: RefBox,
}

impl ConditionalRef {
    pub fn new(cond: RefBox, left: RefBox, right: RefBox) -> Self {
        Self { cond, left, right }
    }
}

impl Ref for ConditionalRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        if convert::to_boolean(&self.cond.value(ctx)?)? {
            self.left.value(ctx)
        } else {
            self.right.value(ctx)
        }
    }

    fn type_name(&self) -> &'static str {
        "conditional"
    }
}

/// `left ?: right` — `left` is resolved exactly once.
#[derive(Debug)]
pub struct ElvisRef {
    left: RefBox,
    right: RefBox,
}

impl ElvisRef {
    pub fn new(left: RefBox, right: RefBox) -> Self {
        Self { left, right }
    }
}

impl Ref for ElvisRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        let left = self.left.value_or_null(ctx)?;
        if !left.is_null() {
            return Ok(left);
        }
        self.right.value(ctx)
    }

    fn type_name(&self) -> &'static str {
        "elvis"
    }
}

/// Compound assignment `var op= value` (`op` is concatenation when `None`).
#[derive(Debug)]
pub struct UnaryAssignRef {
    target: VariableRef,
    value: RefBox,
    op: Option<NumberOp>,
    assign: AssignKind,
}

impl UnaryAssignRef {
    pub fn number(target: VariableRef, value: RefBox, op: NumberOp, assign: AssignKind) -> Self {
        Self {
            target,
            value,
            op: Some(op),
            assign,
        }
    }

    pub fn string(target: VariableRef, value: RefBox, assign: AssignKind) -> Self {
        Self {
            target,
            value,
            op: None,
            assign,
        }
    }
}

impl Ref for UnaryAssignRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        if let Some(op) = self.op {
            ensure_unrestricted(ctx, op.as_str())?;
        }
        let keys = self.target.resolve_keys(ctx)?;
        let current = self
            .target
            .get_with_keys(ctx, &keys)?
            .ok_or_else(|| RuntimeError::undefined(self.target.display_name(&keys)))?;
        let operand = self.value.value(ctx)?;

        let (before, after) = match self.op {
            Some(op) => {
                let before = convert::to_decimal(&current)?;
                let rhs = convert::to_decimal(&operand)?;
                let after = compute(op, &before, &rhs, ctx.config().division_precision)?;
                (Value::Number(before), Value::Number(after))
            }
            None => {
                let before = convert::to_string(&current)?;
                let after = format!("{}{}", before, convert::to_string(&operand)?);
                (Value::Str(before), Value::Str(after))
            }
        };
        self.target.set_with_keys(ctx, &keys, after.clone())?;
        Ok(match self.assign {
            AssignKind::Pre => after,
            AssignKind::Post => before,
        })
    }

    fn type_name(&self) -> &'static str {
        "assignment"
    }
}

/// Runtime cast.
#[derive(Debug)]
pub struct CastRef {
    expr: RefBox,
    target: CastTarget,
}

impl CastRef {
    pub fn new(expr: RefBox, target: CastTarget) -> Self {
        Self { expr, target }
    }
}

impl Ref for CastRef {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        self.target.apply(&self.expr.value(ctx)?)
    }

    fn type_name(&self) -> &'static str {
        "cast"
    }
}

//! Interpreted mode
//!
//! Lowers an expression tree to runtime [`Ref`]s and evaluates it directly
//! against an execution context, without emitting instructions. Arithmetic
//! goes through the arbitrary-precision operators, which honor the
//! context's `limited` flag.

use std::sync::Arc;

use cfml_runtime::config::EngineConfig;
use cfml_runtime::context::ExecutionContext;
use cfml_runtime::error::RuntimeResult;
use cfml_runtime::interpreter::{
    BigOp, CastRef, ConcatRef, ConditionalRef, DecisionRef, ElvisRef, LiteralRef, LogicRef,
    NegateNumberRef, NegateRef, NewCollectionRef, Ref, RefBox, UnaryAssignRef, VariableRef,
};
use cfml_runtime::scope::Scope;
use cfml_runtime::value::Value;

use crate::error::{TResult, TransformerError};
use crate::expr::{Expr, ExprRef, LitValue, Literal, Op, Variable};
use crate::span::Span;

/// Build the runtime handle tree for `expr`.
pub fn lower(expr: &ExprRef, config: &EngineConfig) -> TResult<RefBox> {
    Ok(match &**expr {
        Expr::Literal(lit) => lower_literal(lit, config),
        Expr::Variable(var) => Box::new(lower_variable(var, config)?),
        Expr::Cast {
            expr: inner,
            target,
            ..
        } => Box::new(CastRef::new(lower(inner, config)?, target.clone())),
        Expr::Op { op, span } => lower_op(op, *span, config)?,
        Expr::EmptyStruct => Box::new(NewCollectionRef::Struct),
        Expr::EmptyArray => Box::new(NewCollectionRef::Array),
    })
}

fn lower_literal(lit: &Literal, config: &EngineConfig) -> RefBox {
    let value = match &lit.value {
        LitValue::Boolean(b) => Value::Bool(*b),
        LitValue::String(s) => Value::Str(s.clone()),
        LitValue::Number(n) => Value::Number(n.clone()),
        LitValue::Integer(i) => Value::from(*i),
        LitValue::Long(l) => Value::from(*l),
        LitValue::Null => Value::Null,
        LitValue::NullConstant if config.null_support => Value::Null,
        LitValue::NullConstant => {
            let name: RefBox = Box::new(LiteralRef::new(Value::from("null")));
            return Box::new(NullVariable(VariableRef::new(Scope::Undefined, vec![name])));
        }
        LitValue::Empty => Value::Str(String::new()),
    };
    Box::new(LiteralRef::new(value))
}

/// The `null` keyword without null support: a variable that reads as null
/// when undefined.
#[derive(Debug)]
struct NullVariable(VariableRef);

impl Ref for NullVariable {
    fn value(&self, ctx: &mut ExecutionContext) -> RuntimeResult<Value> {
        self.0.value_or_null(ctx)
    }

    fn type_name(&self) -> &'static str {
        "null"
    }
}

fn lower_variable(var: &Variable, config: &EngineConfig) -> TResult<VariableRef> {
    let members = var
        .members()
        .iter()
        .map(|m| lower(m.name(), config))
        .collect::<TResult<Vec<_>>>()?;
    Ok(VariableRef::new(var.scope(), members))
}

fn lower_op(op: &Op, span: Option<Span>, config: &EngineConfig) -> TResult<RefBox> {
    Ok(match op {
        Op::Concat { left, right } => {
            Box::new(ConcatRef::new(lower(left, config)?, lower(right, config)?))
        }
        Op::Bool { left, right, op } => Box::new(LogicRef::new(
            lower(left, config)?,
            lower(right, config)?,
            *op,
        )),
        Op::Number { left, right, op } => {
            Box::new(BigOp::new(*op, lower(left, config)?, lower(right, config)?))
        }
        Op::Decision { left, right, op } => Box::new(DecisionRef::new(
            lower(left, config)?,
            lower(right, config)?,
            *op,
        )),
        Op::Negate { expr } => Box::new(NegateRef::new(lower(expr, config)?)),
        Op::NegateNumber { expr, op } => Box::new(NegateNumberRef::new(lower(expr, config)?, *op)),
        Op::UnaryAssign {
            var,
            value,
            op,
            assign,
        } => {
            if var.members().is_empty() {
                return Err(TransformerError::compile(
                    format!("can't assign to the {} scope itself", var.scope().name()),
                    span,
                ));
            }
            let target = lower_variable(var, config)?;
            let value = lower(value, config)?;
            Box::new(match op {
                Some(op) => UnaryAssignRef::number(target, value, *op, *assign),
                None => UnaryAssignRef::string(target, value, *assign),
            })
        }
        Op::Conditional { cond, left, right } => Box::new(ConditionalRef::new(
            lower(cond, config)?,
            lower(left, config)?,
            lower(right, config)?,
        )),
        Op::Elvis { left, right } => Box::new(ElvisRef::new(
            Box::new(lower_variable(left, config)?),
            lower(right, config)?,
        )),
    })
}

/// Lower and evaluate `expr` in `ctx`.
#[tracing::instrument(level = "debug", skip_all, fields(limited = ctx.is_limited()))]
pub fn evaluate(expr: &ExprRef, ctx: &mut ExecutionContext) -> TResult<Value> {
    let config: Arc<EngineConfig> = ctx.config().clone();
    let handle = lower(expr, &config)?;
    Ok(handle.value(ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ExprFactory;
    use cfml_runtime::key::Key;

    #[test]
    fn test_null_keyword_depends_on_null_support() {
        let config = Arc::new(EngineConfig::default());
        let factory = ExprFactory::new(config.clone());
        let mut ctx = ExecutionContext::new(config);
        let null = factory.create_null_constant(None);
        assert_eq!(evaluate(&null, &mut ctx).unwrap(), Value::Null);

        ctx.set(Scope::Variables, Key::new("null"), Value::from("shadowed"));
        assert_eq!(evaluate(&null, &mut ctx).unwrap(), Value::from("shadowed"));

        let config = Arc::new(EngineConfig {
            null_support: true,
            ..EngineConfig::default()
        });
        let mut strict = ExecutionContext::new(config);
        strict.set(Scope::Variables, Key::new("null"), Value::from("shadowed"));
        assert_eq!(evaluate(&null, &mut strict).unwrap(), Value::Null);
    }

    #[test]
    fn test_assignment_to_bare_scope_is_rejected() {
        let factory = ExprFactory::new(Arc::new(EngineConfig::default()));
        let var = factory.create_variable(Some(Scope::Url), None);
        let e = factory.op_unary_string(
            var,
            &factory.create_lit_string("x", None),
            cfml_runtime::dispatch::AssignKind::Pre,
            None,
        );
        let mut ctx = ExecutionContext::new(factory.config().clone());
        assert!(matches!(
            evaluate(&e, &mut ctx),
            Err(TransformerError::Compile { .. })
        ));
    }
}

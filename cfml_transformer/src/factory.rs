//! Expression factory
//!
//! One factory exists per engine configuration. It owns the canonical
//! literal singletons and is the entry point compiling code uses to build
//! literals, variables, casts and operators.
//!
//! Factories are normally constructed explicitly with [`ExprFactory::new`]
//! and passed by reference. [`ExprFactory::shared`] additionally offers a
//! process-wide instance per configuration.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cfml_runtime::config::EngineConfig;
use cfml_runtime::decimal::Decimal;
use cfml_runtime::dispatch::{AssignKind, BoolOp, DecisionOp, NegateOp, NumberOp};
use cfml_runtime::scope::Scope;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::cast;
use crate::codegen::{self, CompileContext};
use crate::error::{TResult, TransformerError};
use crate::expr::{DataMember, Expr, ExprRef, LitValue, Literal, Variable};
use crate::op;
use crate::span::Span;

/// Shared factories, keyed by configuration fingerprint.
static SHARED_FACTORIES: Lazy<RwLock<HashMap<String, Arc<ExprFactory>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn lit(value: LitValue, span: Option<Span>) -> ExprRef {
    Arc::new(Expr::Literal(Literal::new(value, span)))
}

#[derive(Debug)]
pub struct ExprFactory {
    config: Arc<EngineConfig>,
    lit_true: ExprRef,
    lit_false: ExprRef,
    empty: ExprRef,
    null: ExprRef,
    number_zero: ExprRef,
    number_one: ExprRef,
}

// Factories are shared across compiler threads.
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ExprFactory>();
};

impl ExprFactory {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        debug!(config = %config.name, "creating expression factory");
        Self {
            config,
            lit_true: lit(LitValue::Boolean(true), None),
            lit_false: lit(LitValue::Boolean(false), None),
            empty: lit(LitValue::String(String::new()), None),
            null: lit(LitValue::Null, None),
            number_zero: lit(LitValue::Number(Decimal::zero()), None),
            number_one: lit(LitValue::Number(Decimal::one()), None),
        }
    }

    /// The process-wide factory for `config`.
    ///
    /// Lookup and insertion are separate lock acquisitions, so two threads
    /// asking for a new configuration at once may both construct a factory.
    /// The first one stored is kept and returned to both.
    pub fn shared(config: Arc<EngineConfig>) -> Arc<ExprFactory> {
        let fingerprint = config.fingerprint();
        {
            let factories = SHARED_FACTORIES
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(factory) = factories.get(&fingerprint) {
                debug!(fingerprint = %fingerprint, "shared factory hit");
                return factory.clone();
            }
        }
        debug!(fingerprint = %fingerprint, "shared factory miss");
        let created = Arc::new(ExprFactory::new(config));
        SHARED_FACTORIES
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(fingerprint)
            .or_insert(created)
            .clone()
    }

    pub fn config(&self) -> &Arc<EngineConfig> {
        &self.config
    }

    // canonical singletons

    pub fn lit_true(&self) -> ExprRef {
        self.lit_true.clone()
    }

    pub fn lit_false(&self) -> ExprRef {
        self.lit_false.clone()
    }

    /// The empty string literal
    pub fn empty(&self) -> ExprRef {
        self.empty.clone()
    }

    pub fn null(&self) -> ExprRef {
        self.null.clone()
    }

    pub fn number_zero(&self) -> ExprRef {
        self.number_zero.clone()
    }

    pub fn number_one(&self) -> ExprRef {
        self.number_one.clone()
    }

    // literals

    pub fn create_lit_string(&self, value: impl Into<String>, span: Option<Span>) -> ExprRef {
        lit(LitValue::String(value.into()), span)
    }

    pub fn create_lit_boolean(&self, value: bool, span: Option<Span>) -> ExprRef {
        lit(LitValue::Boolean(value), span)
    }

    /// Number literal from source text; fails if the text is not a decimal.
    pub fn create_lit_number(&self, text: &str, span: Option<Span>) -> TResult<ExprRef> {
        let n: Decimal = text.parse().map_err(|_| {
            TransformerError::cast(format!("can't cast [{}] to a number", text), span)
        })?;
        Ok(lit(LitValue::Number(n), span))
    }

    pub fn create_lit_number_decimal(&self, value: Decimal, span: Option<Span>) -> ExprRef {
        lit(LitValue::Number(value), span)
    }

    /// Number literal from a double, taken at its shortest round-trip text.
    pub fn create_lit_number_f64(&self, value: f64, span: Option<Span>) -> TResult<ExprRef> {
        let n = Decimal::from_f64(value).ok_or_else(|| {
            TransformerError::cast(format!("can't cast [{}] to a number", value), span)
        })?;
        Ok(lit(LitValue::Number(n), span))
    }

    pub fn create_lit_integer(&self, value: i32, span: Option<Span>) -> ExprRef {
        lit(LitValue::Integer(value), span)
    }

    pub fn create_lit_long(&self, value: i64, span: Option<Span>) -> ExprRef {
        lit(LitValue::Long(value), span)
    }

    pub fn create_null(&self, span: Option<Span>) -> ExprRef {
        lit(LitValue::Null, span)
    }

    pub fn create_null_constant(&self, span: Option<Span>) -> ExprRef {
        lit(LitValue::NullConstant, span)
    }

    pub fn create_empty(&self) -> ExprRef {
        lit(LitValue::Empty, None)
    }

    /// True for the null literal (not the `null` keyword)
    pub fn is_null(&self, expr: &Expr) -> bool {
        matches!(
            expr,
            Expr::Literal(Literal {
                value: LitValue::Null,
                ..
            })
        )
    }

    // variables and collections

    /// Start a member chain; without a scope, names are resolved through the
    /// unqualified search order.
    pub fn create_variable(&self, scope: Option<Scope>, span: Option<Span>) -> Variable {
        Variable::new(scope.unwrap_or(Scope::Undefined), span)
    }

    pub fn create_data_member(&self, name: &ExprRef) -> DataMember {
        DataMember::new(cast::to_expr_string(name))
    }

    pub fn create_struct(&self) -> ExprRef {
        Arc::new(Expr::EmptyStruct)
    }

    pub fn create_array(&self) -> ExprRef {
        Arc::new(Expr::EmptyArray)
    }

    // casts

    pub fn to_expr_number(&self, expr: &ExprRef) -> ExprRef {
        cast::to_expr_number(expr)
    }

    pub fn to_expr_string(&self, expr: &ExprRef) -> ExprRef {
        cast::to_expr_string(expr)
    }

    pub fn to_expr_boolean(&self, expr: &ExprRef) -> ExprRef {
        cast::to_expr_boolean(expr)
    }

    pub fn to_expr_int(&self, expr: &ExprRef) -> ExprRef {
        cast::to_expr_int(expr)
    }

    pub fn to_expression(&self, expr: &ExprRef, type_name: &str) -> ExprRef {
        cast::to_expression(expr, type_name)
    }

    pub fn remove_cast_string(&self, expr: &ExprRef) -> ExprRef {
        cast::remove_cast_string(expr)
    }

    // operators

    pub fn op_string(&self, left: &ExprRef, right: &ExprRef, concat_static: bool) -> ExprRef {
        op::op_string(left, right, concat_static)
    }

    pub fn op_string_static(&self, left: &ExprRef, right: &ExprRef) -> ExprRef {
        op::op_string_static(left, right)
    }

    pub fn op_bool(&self, left: &ExprRef, right: &ExprRef, op: BoolOp) -> ExprRef {
        op::op_bool(left, right, op)
    }

    pub fn op_number(&self, left: &ExprRef, right: &ExprRef, op: NumberOp) -> ExprRef {
        op::op_number(left, right, op)
    }

    pub fn op_decision(&self, left: &ExprRef, right: &ExprRef, op: DecisionOp) -> ExprRef {
        op::op_decision(left, right, op)
    }

    pub fn op_negate(&self, expr: &ExprRef, span: Option<Span>) -> ExprRef {
        op::op_negate(expr, span)
    }

    pub fn op_negate_number(&self, expr: &ExprRef, op: NegateOp, span: Option<Span>) -> ExprRef {
        op::op_negate_number(expr, op, span)
    }

    pub fn op_unary_number(
        &self,
        var: Variable,
        value: &ExprRef,
        assign: AssignKind,
        op: NumberOp,
        span: Option<Span>,
    ) -> ExprRef {
        op::op_unary_number(var, value, assign, op, span)
    }

    pub fn op_unary_string(
        &self,
        var: Variable,
        value: &ExprRef,
        assign: AssignKind,
        span: Option<Span>,
    ) -> ExprRef {
        op::op_unary_string(var, value, assign, span)
    }

    pub fn op_conditional(&self, cond: &ExprRef, left: &ExprRef, right: &ExprRef) -> ExprRef {
        op::op_conditional(cond, left, right)
    }

    pub fn op_elvis(&self, left: Variable, right: &ExprRef) -> ExprRef {
        op::op_elvis(left, right)
    }

    // code generation

    /// Emit the key named by `name` into `ctx`.
    pub fn register_key(
        &self,
        ctx: &mut CompileContext<'_>,
        name: &ExprRef,
        upper_case: bool,
    ) -> TResult<()> {
        codegen::register_key(ctx, name, upper_case)
    }
}

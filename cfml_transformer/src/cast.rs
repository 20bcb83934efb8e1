//! Cast layer
//!
//! Each `to_expr_*` returns an expression guaranteed to produce the target
//! type. An input already of that type is returned as the same `Arc`;
//! literals that convert cleanly are folded into a new literal; everything
//! else is wrapped in a cast node resolved at runtime.
//!
//! String casts are never folded here. A string cast over a literal costs
//! nothing at emission (it is pushed as a constant), and keeping the node
//! lets [`remove_cast_string`] recover the original expression.

use std::sync::Arc;

use cfml_runtime::dispatch::CastTarget;

use crate::expr::{is_string_type_name, Expr, ExprRef, ExprType, LitValue, Literal};

fn wrap(expr: &ExprRef, target: CastTarget) -> ExprRef {
    Arc::new(Expr::Cast {
        expr: expr.clone(),
        target,
        span: expr.span(),
    })
}

fn fold(lit: &Literal, value: LitValue) -> ExprRef {
    Arc::new(Expr::Literal(Literal::new(value, lit.span)))
}

pub fn to_expr_number(expr: &ExprRef) -> ExprRef {
    if expr.expr_type() == ExprType::Number {
        return expr.clone();
    }
    if let Some(lit) = expr.as_literal() {
        if let Some(n) = lit.as_decimal() {
            return fold(lit, LitValue::Number(n));
        }
    }
    wrap(expr, CastTarget::Number)
}

pub fn to_expr_string(expr: &ExprRef) -> ExprRef {
    if expr.expr_type() == ExprType::String {
        return expr.clone();
    }
    wrap(expr, CastTarget::String)
}

pub fn to_expr_boolean(expr: &ExprRef) -> ExprRef {
    if expr.expr_type() == ExprType::Boolean {
        return expr.clone();
    }
    if let Some(lit) = expr.as_literal() {
        if let Some(b) = lit.as_boolean() {
            return fold(lit, LitValue::Boolean(b));
        }
    }
    wrap(expr, CastTarget::Boolean)
}

pub fn to_expr_int(expr: &ExprRef) -> ExprRef {
    if expr.expr_type() == ExprType::Int {
        return expr.clone();
    }
    if let Some(lit) = expr.as_literal() {
        if let Some(i) = lit.as_decimal().and_then(|n| n.trunc_i32()) {
            return fold(lit, LitValue::Integer(i));
        }
    }
    wrap(expr, CastTarget::Int)
}

/// Cast to a type given by its declared name.
pub fn to_expression(expr: &ExprRef, type_name: &str) -> ExprRef {
    if is_string_type_name(type_name) {
        return to_expr_string(expr);
    }
    match type_name.to_ascii_lowercase().as_str() {
        "number" | "numeric" | "double" => to_expr_number(expr),
        "boolean" | "bool" => to_expr_boolean(expr),
        "int" | "integer" => to_expr_int(expr),
        "any" | "object" => expr.clone(),
        _ => wrap(expr, CastTarget::Other(type_name.to_string())),
    }
}

/// Strip every string cast wrapped around `expr`, including generic casts
/// whose declared type is `String` or `java.lang.String`.
pub fn remove_cast_string(expr: &ExprRef) -> ExprRef {
    let mut current = expr;
    loop {
        match &**current {
            Expr::Cast {
                expr: inner,
                target: CastTarget::String,
                ..
            } => current = inner,
            Expr::Cast {
                expr: inner,
                target: CastTarget::Other(name),
                ..
            } if is_string_type_name(name) => current = inner,
            _ => return current.clone(),
        }
    }
}

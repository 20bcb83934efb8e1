//! Operator layer
//!
//! Pure constructors. Nothing here evaluates a non-literal operand; the only
//! computation done at build time is folding of constant concatenation and
//! of negated literals.

use std::sync::Arc;

use cfml_runtime::dispatch::{AssignKind, BoolOp, DecisionOp, NegateOp, NumberOp};

use crate::cast::{to_expr_boolean, to_expr_number, to_expr_string};
use crate::expr::{Expr, ExprRef, LitValue, Literal, Op, Variable};
use crate::span::Span;

fn node(op: Op, span: Option<Span>) -> ExprRef {
    Arc::new(Expr::Op { op, span })
}

fn binary_span(left: &ExprRef, right: &ExprRef) -> Option<Span> {
    Span::merge(left.span(), right.span())
}

/// String concatenation. With `concat_static`, two literal operands are
/// joined into a single literal.
pub fn op_string(left: &ExprRef, right: &ExprRef, concat_static: bool) -> ExprRef {
    let span = binary_span(left, right);
    if concat_static {
        let texts = left
            .as_literal()
            .and_then(Literal::as_string)
            .zip(right.as_literal().and_then(Literal::as_string));
        if let Some((l, r)) = texts {
            return Arc::new(Expr::Literal(Literal::new(LitValue::String(l + &r), span)));
        }
    }
    node(
        Op::Concat {
            left: to_expr_string(left),
            right: to_expr_string(right),
        },
        span,
    )
}

/// Concatenation that folds constant operands
pub fn op_string_static(left: &ExprRef, right: &ExprRef) -> ExprRef {
    op_string(left, right, true)
}

pub fn op_bool(left: &ExprRef, right: &ExprRef, op: BoolOp) -> ExprRef {
    node(
        Op::Bool {
            left: to_expr_boolean(left),
            right: to_expr_boolean(right),
            op,
        },
        binary_span(left, right),
    )
}

pub fn op_number(left: &ExprRef, right: &ExprRef, op: NumberOp) -> ExprRef {
    node(
        Op::Number {
            left: to_expr_number(left),
            right: to_expr_number(right),
            op,
        },
        binary_span(left, right),
    )
}

pub fn op_decision(left: &ExprRef, right: &ExprRef, op: DecisionOp) -> ExprRef {
    node(
        Op::Decision {
            left: left.clone(),
            right: right.clone(),
            op,
        },
        binary_span(left, right),
    )
}

/// Logical not
pub fn op_negate(expr: &ExprRef, span: Option<Span>) -> ExprRef {
    let span = span.or_else(|| expr.span());
    if let Some(b) = expr.as_literal().and_then(Literal::as_boolean) {
        return Arc::new(Expr::Literal(Literal::new(LitValue::Boolean(!b), span)));
    }
    node(
        Op::Negate {
            expr: to_expr_boolean(expr),
        },
        span,
    )
}

/// Unary plus or minus
pub fn op_negate_number(expr: &ExprRef, op: NegateOp, span: Option<Span>) -> ExprRef {
    let span = span.or_else(|| expr.span());
    if let Some(n) = expr.as_literal().and_then(Literal::as_decimal) {
        let n = match op {
            NegateOp::Plus => n,
            NegateOp::Minus => -&n,
        };
        return Arc::new(Expr::Literal(Literal::new(LitValue::Number(n), span)));
    }
    node(
        Op::NegateNumber {
            expr: to_expr_number(expr),
            op,
        },
        span,
    )
}

/// Numeric compound assignment `var op= value` (`++`/`--` use a value of 1)
pub fn op_unary_number(
    var: Variable,
    value: &ExprRef,
    assign: AssignKind,
    op: NumberOp,
    span: Option<Span>,
) -> ExprRef {
    let span = span.or_else(|| var.span());
    node(
        Op::UnaryAssign {
            var,
            value: to_expr_number(value),
            op: Some(op),
            assign,
        },
        span,
    )
}

/// String compound assignment `var &= value`
pub fn op_unary_string(
    var: Variable,
    value: &ExprRef,
    assign: AssignKind,
    span: Option<Span>,
) -> ExprRef {
    let span = span.or_else(|| var.span());
    node(
        Op::UnaryAssign {
            var,
            value: to_expr_string(value),
            op: None,
            assign,
        },
        span,
    )
}

/// `cond ? left : right`
pub fn op_conditional(cond: &ExprRef, left: &ExprRef, right: &ExprRef) -> ExprRef {
    node(
        Op::Conditional {
            cond: to_expr_boolean(cond),
            left: left.clone(),
            right: right.clone(),
        },
        Span::merge(cond.span(), right.span()),
    )
}

/// `left ?: right`. `left` is read once, with missing members read as null.
pub fn op_elvis(left: Variable, right: &ExprRef) -> ExprRef {
    let span = Span::merge(left.span(), right.span());
    node(
        Op::Elvis {
            left,
            right: right.clone(),
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprType;
    use crate::span::Position;
    use cfml_runtime::scope::Scope;

    fn at(offset: usize) -> Option<Span> {
        let p = Position::new(1, offset + 1, offset);
        Some(Span::new(p, Position::new(1, offset + 2, offset + 1)))
    }

    fn lit(value: LitValue, span: Option<Span>) -> ExprRef {
        Arc::new(Expr::Literal(Literal::new(value, span)))
    }

    fn var(name: &str) -> Variable {
        Variable::new(Scope::Undefined, None).with_member(crate::expr::DataMember::new(lit(
            LitValue::String(name.into()),
            None,
        )))
    }

    #[test]
    fn test_static_concat_folds_and_spans_both() {
        let left = lit(LitValue::String("a".into()), at(0));
        let right = lit(LitValue::Integer(1), at(4));
        let folded = op_string(&left, &right, true);
        let lit = folded.as_literal().unwrap();
        assert_eq!(lit.value, LitValue::String("a1".into()));
        assert_eq!(lit.span.unwrap().start.offset, 0);
        assert_eq!(lit.span.unwrap().end.offset, 5);

        let kept = op_string(&left, &right, false);
        assert!(matches!(&*kept, Expr::Op { op: Op::Concat { .. }, .. }));
    }

    #[test]
    fn test_concat_with_variable_is_not_folded() {
        let e = op_string_static(&lit(LitValue::String("a".into()), None), &var("x").into_expr());
        assert_eq!(e.expr_type(), ExprType::String);
        assert!(!e.is_literal());
    }

    #[test]
    fn test_binary_operands_are_cast() {
        let two = lit(LitValue::String("2".into()), None);
        let e = op_number(&two, &var("x").into_expr(), NumberOp::Plus);
        let Expr::Op { op: Op::Number { left, right, .. }, .. } = &*e else {
            panic!("not a number op");
        };
        assert!(left.is_literal());
        assert_eq!(left.expr_type(), ExprType::Number);
        assert_eq!(right.expr_type(), ExprType::Number);
        assert!(!right.is_literal());
    }

    #[test]
    fn test_negation_folds_literals() {
        let not = op_negate(&lit(LitValue::String("yes".into()), None), None);
        assert_eq!(not.as_literal().map(|l| &l.value), Some(&LitValue::Boolean(false)));
        let neg = op_negate_number(&lit(LitValue::Integer(5), None), NegateOp::Minus, None);
        assert_eq!(
            neg.as_literal().map(|l| &l.value),
            Some(&LitValue::Number((-5i64).into()))
        );
        let deferred = op_negate_number(&var("x").into_expr(), NegateOp::Minus, None);
        assert_eq!(deferred.expr_type(), ExprType::Number);
    }

    #[test]
    fn test_compound_assignment_types() {
        let one = lit(LitValue::Integer(1), None);
        let inc = op_unary_number(var("i"), &one, AssignKind::Post, NumberOp::Plus, None);
        assert_eq!(inc.expr_type(), ExprType::Number);
        let app = op_unary_string(var("s"), &one, AssignKind::Pre, None);
        assert_eq!(app.expr_type(), ExprType::String);
    }

    #[test]
    fn test_conditional_and_elvis() {
        let cond = op_conditional(
            &lit(LitValue::String("true".into()), None),
            &lit(LitValue::Integer(1), None),
            &lit(LitValue::Integer(2), None),
        );
        let Expr::Op { op: Op::Conditional { cond, .. }, .. } = &*cond else {
            panic!("not a conditional");
        };
        assert_eq!(cond.as_literal().map(|l| &l.value), Some(&LitValue::Boolean(true)));

        let elvis = op_elvis(var("a"), &lit(LitValue::Integer(0), None));
        assert_eq!(elvis.expr_type(), ExprType::Any);
    }
}

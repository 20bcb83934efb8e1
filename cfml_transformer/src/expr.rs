//! Expression tree
//!
//! Nodes are immutable once built and shared as [`ExprRef`]. A node that
//! needs changing (case-normalising a key, folding a cast) is rebuilt as a
//! new value, never edited in place. Equality is structural.

use std::sync::Arc;

use cfml_runtime::convert::{boolean_to_string, string_to_boolean, string_to_decimal};
use cfml_runtime::decimal::Decimal;
use cfml_runtime::dispatch::{AssignKind, BoolOp, CastTarget, DecisionOp, NegateOp, NumberOp};
use cfml_runtime::scope::Scope;

use crate::span::Span;

pub type ExprRef = Arc<Expr>;

/// Static type an expression is known to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprType {
    Any,
    String,
    Number,
    Boolean,
    Int,
    Long,
    Null,
}

impl ExprType {
    /// The static type of a cast to `target`.
    pub fn of_cast(target: &CastTarget) -> Self {
        match target {
            CastTarget::Number => ExprType::Number,
            CastTarget::String => ExprType::String,
            CastTarget::Boolean => ExprType::Boolean,
            CastTarget::Int => ExprType::Int,
            CastTarget::Other(name) if is_string_type_name(name) => ExprType::String,
            CastTarget::Other(_) => ExprType::Any,
        }
    }
}

/// `String` and `java.lang.String`, in any case.
pub fn is_string_type_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("string") || name.eq_ignore_ascii_case("java.lang.string")
}

#[derive(Debug, Clone, PartialEq)]
pub enum LitValue {
    Boolean(bool),
    String(String),
    Number(Decimal),
    Integer(i32),
    Long(i64),
    /// The null value
    Null,
    /// The `null` keyword; its meaning depends on the engine's null support
    NullConstant,
    /// Placeholder for an omitted value
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LitValue,
    pub span: Option<Span>,
}

impl Literal {
    pub fn new(value: LitValue, span: Option<Span>) -> Self {
        Self { value, span }
    }

    pub fn expr_type(&self) -> ExprType {
        match self.value {
            LitValue::Boolean(_) => ExprType::Boolean,
            LitValue::String(_) | LitValue::Empty => ExprType::String,
            LitValue::Number(_) => ExprType::Number,
            LitValue::Integer(_) => ExprType::Int,
            LitValue::Long(_) => ExprType::Long,
            LitValue::Null | LitValue::NullConstant => ExprType::Null,
        }
    }

    /// The literal's text in string context; `None` for null literals.
    pub fn as_string(&self) -> Option<String> {
        match &self.value {
            LitValue::Boolean(b) => Some(boolean_to_string(*b).to_string()),
            LitValue::String(s) => Some(s.clone()),
            LitValue::Number(n) => Some(n.to_string()),
            LitValue::Integer(i) => Some(i.to_string()),
            LitValue::Long(l) => Some(l.to_string()),
            LitValue::Empty => Some(String::new()),
            LitValue::Null | LitValue::NullConstant => None,
        }
    }

    /// The literal as a number, if it converts cleanly.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match &self.value {
            LitValue::Boolean(b) => Some(if *b { Decimal::one() } else { Decimal::zero() }),
            LitValue::String(s) => string_to_decimal(s),
            LitValue::Number(n) => Some(n.clone()),
            LitValue::Integer(i) => Some(Decimal::from(*i)),
            LitValue::Long(l) => Some(Decimal::from(*l)),
            _ => None,
        }
    }

    /// The literal as a boolean, if it converts cleanly.
    pub fn as_boolean(&self) -> Option<bool> {
        match &self.value {
            LitValue::Boolean(b) => Some(*b),
            LitValue::String(s) => string_to_boolean(s),
            LitValue::Number(n) => Some(!n.is_zero()),
            LitValue::Integer(i) => Some(*i != 0),
            LitValue::Long(l) => Some(*l != 0),
            _ => None,
        }
    }

    /// A new string literal holding the upper-cased text of this one. Null
    /// literals have no text and are returned unchanged.
    pub fn upper_cased(&self) -> Literal {
        match self.as_string() {
            Some(text) => Literal::new(LitValue::String(text.to_uppercase()), self.span),
            None => self.clone(),
        }
    }
}

/// One link of a member chain: the member's name.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMember {
    name: ExprRef,
}

impl DataMember {
    pub(crate) fn new(name: ExprRef) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &ExprRef {
        &self.name
    }
}

/// Scope-rooted member chain, e.g. `url.user.name`. Built up member by
/// member, then frozen with [`Variable::into_expr`].
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    scope: Scope,
    members: Vec<DataMember>,
    span: Option<Span>,
}

impl Variable {
    pub fn new(scope: Scope, span: Option<Span>) -> Self {
        Self {
            scope,
            members: Vec::new(),
            span,
        }
    }

    pub fn add_member(&mut self, member: DataMember) {
        self.members.push(member);
    }

    pub fn with_member(mut self, member: DataMember) -> Self {
        self.add_member(member);
        self
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn members(&self) -> &[DataMember] {
        &self.members
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn into_expr(self) -> ExprRef {
        Arc::new(Expr::Variable(self))
    }
}

/// Operator node. Operands are stored already cast to the type the
/// operation consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Concat {
        left: ExprRef,
        right: ExprRef,
    },
    Bool {
        left: ExprRef,
        right: ExprRef,
        op: BoolOp,
    },
    Number {
        left: ExprRef,
        right: ExprRef,
        op: NumberOp,
    },
    Decision {
        left: ExprRef,
        right: ExprRef,
        op: DecisionOp,
    },
    Negate {
        expr: ExprRef,
    },
    NegateNumber {
        expr: ExprRef,
        op: NegateOp,
    },
    /// `var op= value`; `op` is absent for string concatenation
    UnaryAssign {
        var: Variable,
        value: ExprRef,
        op: Option<NumberOp>,
        assign: AssignKind,
    },
    Conditional {
        cond: ExprRef,
        left: ExprRef,
        right: ExprRef,
    },
    Elvis {
        left: Variable,
        right: ExprRef,
    },
}

impl Op {
    /// Static type the operator is declared to produce.
    ///
    /// Interpreted arithmetic yields the number's canonical text rather than
    /// a `Value::Number`, so `Number` here means "numeric text" at runtime.
    /// Loose comparisons see no difference; strict `===` against a number
    /// does (`(1 + 1) === 2` is false, `(1 + 1) == 2` is true).
    pub fn result_type(&self) -> ExprType {
        match self {
            Op::Concat { .. } => ExprType::String,
            Op::Bool { .. } | Op::Decision { .. } | Op::Negate { .. } => ExprType::Boolean,
            Op::Number { .. } | Op::NegateNumber { .. } => ExprType::Number,
            Op::UnaryAssign { op: Some(_), .. } => ExprType::Number,
            Op::UnaryAssign { op: None, .. } => ExprType::String,
            Op::Conditional { left, right, .. } => {
                let (l, r) = (left.expr_type(), right.expr_type());
                if l == r {
                    l
                } else {
                    ExprType::Any
                }
            }
            Op::Elvis { .. } => ExprType::Any,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable(Variable),
    Cast {
        expr: ExprRef,
        target: CastTarget,
        span: Option<Span>,
    },
    Op {
        op: Op,
        span: Option<Span>,
    },
    /// `{}` initializer
    EmptyStruct,
    /// `[]` initializer
    EmptyArray,
}

impl Expr {
    pub fn span(&self) -> Option<Span> {
        match self {
            Expr::Literal(lit) => lit.span,
            Expr::Variable(var) => var.span,
            Expr::Cast { span, .. } | Expr::Op { span, .. } => *span,
            Expr::EmptyStruct | Expr::EmptyArray => None,
        }
    }

    pub fn expr_type(&self) -> ExprType {
        match self {
            Expr::Literal(lit) => lit.expr_type(),
            Expr::Cast { target, .. } => ExprType::of_cast(target),
            Expr::Op { op, .. } => op.result_type(),
            Expr::Variable(_) | Expr::EmptyStruct | Expr::EmptyArray => ExprType::Any,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Expr::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Expr::Literal(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: LitValue) -> Literal {
        Literal::new(value, None)
    }

    #[test]
    fn test_literal_conversions() {
        let s = lit(LitValue::String("12.50".into()));
        assert_eq!(s.as_decimal(), Some("12.5".parse().unwrap()));
        assert_eq!(s.as_boolean(), Some(true));
        assert_eq!(lit(LitValue::String("No".into())).as_boolean(), Some(false));
        assert_eq!(lit(LitValue::String("abc".into())).as_decimal(), None);
        assert_eq!(lit(LitValue::Boolean(true)).as_string().as_deref(), Some("true"));
        assert_eq!(lit(LitValue::Null).as_string(), None);
    }

    #[test]
    fn test_upper_cased_is_a_new_string_literal() {
        let original = lit(LitValue::String("firstName".into()));
        let upper = original.upper_cased();
        assert_eq!(upper.value, LitValue::String("FIRSTNAME".into()));
        assert_eq!(original.value, LitValue::String("firstName".into()));

        let number = lit(LitValue::Integer(7)).upper_cased();
        assert_eq!(number.value, LitValue::String("7".into()));
    }

    #[test]
    fn test_cast_types() {
        let java_string = CastTarget::Other("Java.Lang.String".into());
        assert_eq!(ExprType::of_cast(&java_string), ExprType::String);
        assert_eq!(ExprType::of_cast(&CastTarget::Other("query".into())), ExprType::Any);
    }
}

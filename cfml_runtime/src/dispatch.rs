//! Operation codes and dynamic dispatch on runtime values
//!
//! The operation enums are shared by the expression tree, the instruction
//! set and the interpreter, so a node built by the transformer selects the
//! same behavior whether it is compiled or evaluated directly.

use std::cmp::Ordering;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::convert::{self, string_to_boolean, try_decimal};
use crate::decimal::Decimal;
use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;

/// Arithmetic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    IntDivide,
    Modulus,
    Exp,
}

impl NumberOp {
    pub const ALL: [NumberOp; 7] = [
        NumberOp::Plus,
        NumberOp::Minus,
        NumberOp::Multiply,
        NumberOp::Divide,
        NumberOp::IntDivide,
        NumberOp::Modulus,
        NumberOp::Exp,
    ];

    /// Get the source-level operator
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberOp::Plus => "+",
            NumberOp::Minus => "-",
            NumberOp::Multiply => "*",
            NumberOp::Divide => "/",
            NumberOp::IntDivide => "\\",
            NumberOp::Modulus => "%",
            NumberOp::Exp => "^",
        }
    }
}

/// Logical operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
    Xor,
    Eqv,
    Imp,
}

impl BoolOp {
    /// Get the source-level operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
            BoolOp::Xor => "XOR",
            BoolOp::Eqv => "EQV",
            BoolOp::Imp => "IMP",
        }
    }

    /// Combine two already-resolved operands
    pub fn apply(&self, l: bool, r: bool) -> bool {
        match self {
            BoolOp::And => l && r,
            BoolOp::Or => l || r,
            BoolOp::Xor => l ^ r,
            BoolOp::Eqv => l == r,
            BoolOp::Imp => !l || r,
        }
    }
}

/// Comparison operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Neq,
    /// Strict equality (`===`): same type and same value. Interpreted
    /// arithmetic results are strings, so they are never `===` a number.
    Eeq,
    Neeq,
    /// Case-insensitive containment (`CONTAINS`)
    Ct,
    Nct,
}

impl DecisionOp {
    /// Get the source-level operator
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOp::Lt => "LT",
            DecisionOp::Lte => "LTE",
            DecisionOp::Gt => "GT",
            DecisionOp::Gte => "GTE",
            DecisionOp::Eq => "EQ",
            DecisionOp::Neq => "NEQ",
            DecisionOp::Eeq => "===",
            DecisionOp::Neeq => "!==",
            DecisionOp::Ct => "CONTAINS",
            DecisionOp::Nct => "DOES NOT CONTAIN",
        }
    }
}

/// Sign operator of a unary numeric expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NegateOp {
    Plus,
    Minus,
}

/// Which value a compound assignment yields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignKind {
    /// `++x`, `x += y`: the value after mutation
    Pre,
    /// `x++`: the value before mutation
    Post,
}

/// Target of a cast node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastTarget {
    Number,
    String,
    Boolean,
    Int,
    /// A declared type given by name
    Other(String),
}

impl CastTarget {
    /// Apply the cast to a runtime value
    pub fn apply(&self, value: &Value) -> RuntimeResult<Value> {
        match self {
            CastTarget::Number => Ok(Value::Number(convert::to_decimal(value)?)),
            CastTarget::String => Ok(Value::Str(convert::to_string(value)?)),
            CastTarget::Boolean => Ok(Value::Bool(convert::to_boolean(value)?)),
            CastTarget::Int => Ok(Value::from(convert::to_int(value)?)),
            CastTarget::Other(name) => convert::to_named(value, name),
        }
    }
}

/// Exact arithmetic on two decimals
pub fn compute(op: NumberOp, l: &Decimal, r: &Decimal, precision: u32) -> RuntimeResult<Decimal> {
    match op {
        NumberOp::Plus => Ok(l + r),
        NumberOp::Minus => Ok(l - r),
        NumberOp::Multiply => l.checked_mul(r),
        NumberOp::Divide => l
            .checked_div(r, precision)
            .ok_or(RuntimeError::DivisionByZero),
        NumberOp::IntDivide => l.checked_int_div(r).ok_or(RuntimeError::DivisionByZero),
        NumberOp::Modulus => l.checked_rem(r).ok_or(RuntimeError::DivisionByZero),
        NumberOp::Exp => {
            let exponent = r.to_i64().ok_or_else(|| {
                RuntimeError::arithmetic(format!(
                    "exponent [{}] must be an integer for exact exponentiation",
                    r
                ))
            })?;
            l.pow(exponent, precision)
        }
    }
}

/// Compare two values with the language's loose rules: booleans against
/// anything boolean-like, numbers against anything numeric, otherwise
/// case-insensitive text.
pub fn compare(l: &Value, r: &Value) -> RuntimeResult<Ordering> {
    match (l, r) {
        (Value::Struct(_) | Value::Array(_), _) | (_, Value::Struct(_) | Value::Array(_)) => {
            Err(RuntimeError::cast(format!(
                "can't compare complex object types [{}] and [{}]",
                l.type_name(),
                r.type_name()
            )))
        }
        (Value::DateTime(a), Value::DateTime(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), other) | (other, Value::Bool(a)) if as_loose_bool(other).is_some() => {
            let b = as_loose_bool(other).unwrap_or_default();
            // keep operand order when the boolean was on the right
            if matches!(l, Value::Bool(_)) {
                Ok(a.cmp(&b))
            } else {
                Ok(b.cmp(a))
            }
        }
        _ => match (try_decimal(l), try_decimal(r)) {
            (Some(a), Some(b)) => Ok(a.cmp(&b)),
            _ => {
                let a = convert::to_string(l)?.to_lowercase();
                let b = convert::to_string(r)?.to_lowercase();
                Ok(a.cmp(&b))
            }
        },
    }
}

fn as_loose_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(!n.is_zero()),
        Value::Str(s) => string_to_boolean(s),
        _ => None,
    }
}

fn strict_equals(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Struct(a), Value::Struct(b)) => Rc::ptr_eq(a, b),
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        _ => l == r,
    }
}

fn contains(l: &Value, r: &Value) -> RuntimeResult<bool> {
    let haystack = convert::to_string(l)?.to_lowercase();
    let needle = convert::to_string(r)?.to_lowercase();
    Ok(haystack.contains(&needle))
}

/// Evaluate a comparison operator on two resolved operands
pub fn decide(op: DecisionOp, l: &Value, r: &Value) -> RuntimeResult<bool> {
    match op {
        DecisionOp::Lt => Ok(compare(l, r)? == Ordering::Less),
        DecisionOp::Lte => Ok(compare(l, r)? != Ordering::Greater),
        DecisionOp::Gt => Ok(compare(l, r)? == Ordering::Greater),
        DecisionOp::Gte => Ok(compare(l, r)? != Ordering::Less),
        DecisionOp::Eq => Ok(compare(l, r)? == Ordering::Equal),
        DecisionOp::Neq => Ok(compare(l, r)? != Ordering::Equal),
        DecisionOp::Eeq => Ok(strict_equals(l, r)),
        DecisionOp::Neeq => Ok(!strict_equals(l, r)),
        DecisionOp::Ct => contains(l, r),
        DecisionOp::Nct => Ok(!contains(l, r)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_compute() {
        assert_eq!(compute(NumberOp::Plus, &n("0.1"), &n("0.2"), 34).unwrap(), n("0.3"));
        assert_eq!(compute(NumberOp::Exp, &n("3"), &n("4"), 34).unwrap(), n("81"));
        assert_eq!(
            compute(NumberOp::Divide, &n("1"), &n("0"), 34),
            Err(RuntimeError::DivisionByZero)
        );
        assert!(matches!(
            compute(NumberOp::Exp, &n("2"), &n("0.5"), 34),
            Err(RuntimeError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_numeric_comparison_of_strings() {
        assert!(decide(DecisionOp::Lt, &Value::from("9"), &Value::from("10")).unwrap());
        assert!(decide(DecisionOp::Eq, &Value::from("1.0"), &Value::from(1i64)).unwrap());
    }

    #[test]
    fn test_text_comparison_is_case_insensitive() {
        assert!(decide(DecisionOp::Eq, &Value::from("ABC"), &Value::from("abc")).unwrap());
        assert!(decide(DecisionOp::Lt, &Value::from("apple"), &Value::from("Banana")).unwrap());
        assert!(!decide(DecisionOp::Eeq, &Value::from("ABC"), &Value::from("abc")).unwrap());
    }

    #[test]
    fn test_boolean_comparison() {
        assert!(decide(DecisionOp::Eq, &Value::Bool(true), &Value::from("yes")).unwrap());
        assert!(decide(DecisionOp::Lt, &Value::from("no"), &Value::Bool(true)).unwrap());
    }

    #[test]
    fn test_contains() {
        let hello = Value::from("Hello World");
        assert!(decide(DecisionOp::Ct, &hello, &Value::from("WORLD")).unwrap());
        assert!(decide(DecisionOp::Nct, &Value::from("Hello"), &Value::from("x")).unwrap());
    }

    #[test]
    fn test_complex_values_do_not_compare() {
        assert!(decide(DecisionOp::Eq, &Value::empty_struct(), &Value::from(1i64)).is_err());
    }

    #[test]
    fn test_bool_ops() {
        assert!(BoolOp::Imp.apply(false, false));
        assert!(!BoolOp::Imp.apply(true, false));
        assert!(BoolOp::Eqv.apply(false, false));
        assert!(BoolOp::Xor.apply(true, false));
    }

    #[test]
    fn test_cast_target_apply() {
        assert_eq!(CastTarget::Int.apply(&Value::from("4.7")).unwrap(), Value::from(4i32));
        assert_eq!(CastTarget::String.apply(&Value::Bool(true)).unwrap(), Value::from("true"));
    }
}

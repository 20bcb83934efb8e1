//! Type conversion utilities
//!
//! These are the language's dynamic coercion rules. The transformer applies
//! the same rules at compile time when folding literals, so a literal folded
//! during compilation and a value cast at runtime always agree.

use crate::decimal::Decimal;
use crate::error::{RuntimeError, RuntimeResult};
use crate::key::Key;
use crate::value::Value;

/// Parse text as a number, the way string operands are coerced in
/// arithmetic. Surrounding whitespace is ignored.
pub fn string_to_decimal(s: &str) -> Option<Decimal> {
    s.trim().parse().ok()
}

/// Parse text as a boolean: `true`/`yes` and `false`/`no` (case-insensitive),
/// or any number (zero is false).
pub fn string_to_boolean(s: &str) -> Option<bool> {
    let t = s.trim();
    if t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if t.eq_ignore_ascii_case("false") || t.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        string_to_decimal(t).map(|d| !d.is_zero())
    }
}

/// Render a boolean the way it appears in string context.
pub fn boolean_to_string(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Convert a Value to a decimal number
pub fn to_decimal(value: &Value) -> RuntimeResult<Decimal> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        Value::Bool(b) => Ok(if *b { Decimal::one() } else { Decimal::zero() }),
        Value::Str(s) => string_to_decimal(s).ok_or_else(|| {
            RuntimeError::cast(format!("cannot convert string [{}] to a number", s))
        }),
        _ => Err(RuntimeError::cast(format!(
            "cannot convert {} to a number",
            value.type_name()
        ))),
    }
}

/// Non-failing variant of [`to_decimal`]
pub fn try_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::Str(s) => string_to_decimal(s),
        _ => None,
    }
}

/// Convert a Value to bool
pub fn to_boolean(value: &Value) -> RuntimeResult<bool> {
    match value {
        Value::Bool(v) => Ok(*v),
        Value::Number(n) => Ok(!n.is_zero()),
        Value::Str(s) => string_to_boolean(s).ok_or_else(|| {
            RuntimeError::cast(format!("cannot convert string [{}] to a boolean", s))
        }),
        _ => Err(RuntimeError::cast(format!(
            "cannot convert {} to a boolean",
            value.type_name()
        ))),
    }
}

/// Convert a Value to its string form; `null` becomes the empty string
pub fn to_string(value: &Value) -> RuntimeResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(boolean_to_string(*b).to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Str(s) => Ok(s.clone()),
        Value::DateTime(ms) => Ok(format!("{{ts {}}}", ms)),
        Value::Struct(_) | Value::Array(_) => Err(RuntimeError::cast(format!(
            "cannot convert complex object [{}] to a string",
            value.type_name()
        ))),
    }
}

/// Convert a Value to i32, truncating the fractional part
pub fn to_int(value: &Value) -> RuntimeResult<i32> {
    let d = to_decimal(value)?;
    d.trunc_i32()
        .ok_or_else(|| RuntimeError::cast(format!("{} is out of range for an integer", d)))
}

/// Convert a Value to a collection key
pub fn to_key(value: &Value) -> RuntimeResult<Key> {
    match value {
        Value::Struct(_) | Value::Array(_) | Value::Null => Err(RuntimeError::invalid_key(
            format!("a {} can't be used as a key", value.type_name()),
        )),
        _ => Ok(Key::new(to_string(value)?)),
    }
}

/// Convert a Value to a declared type name. Unknown type names only accept
/// values that already carry that name as their type.
pub fn to_named(value: &Value, type_name: &str) -> RuntimeResult<Value> {
    match type_name.to_ascii_lowercase().as_str() {
        "string" | "java.lang.string" => Ok(Value::Str(to_string(value)?)),
        "number" | "numeric" | "double" => Ok(Value::Number(to_decimal(value)?)),
        "boolean" | "bool" => Ok(Value::Bool(to_boolean(value)?)),
        "int" | "integer" => Ok(Value::from(to_int(value)?)),
        "any" | "object" => Ok(value.clone()),
        "struct" if matches!(value, Value::Struct(_)) => Ok(value.clone()),
        "array" if matches!(value, Value::Array(_)) => Ok(value.clone()),
        _ => Err(RuntimeError::cast(format!(
            "cannot convert {} to {}",
            value.type_name(),
            type_name
        ))),
    }
}

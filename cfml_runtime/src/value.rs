//! Dynamic values
//!
//! This module provides the `Value` enum produced by interpreted evaluation
//! and stored in scope bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::decimal::Decimal;
use crate::key::Key;

/// Shared, mutable struct handle.
pub type StructRef = Rc<RefCell<Struct>>;

/// Shared, mutable array handle.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Dynamic value of the scripting language.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Exact decimal number
    Number(Decimal),
    /// String
    Str(String),
    /// Point in time, milliseconds since the Unix epoch
    DateTime(i64),
    /// Key/value collection with case-insensitive keys
    Struct(StructRef),
    /// Ordered collection
    Array(ArrayRef),
}

impl Value {
    /// Name of the value's type as reported in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Struct(_) => "struct",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to extract as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to extract as decimal reference
    pub fn as_number(&self) -> Option<&Decimal> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Try to extract as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract as struct handle
    pub fn as_struct(&self) -> Option<&StructRef> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Wrap a struct in a shared handle
    pub fn new_struct(s: Struct) -> Self {
        Value::Struct(Rc::new(RefCell::new(s)))
    }

    /// An empty struct
    pub fn empty_struct() -> Self {
        Value::new_struct(Struct::new())
    }

    /// An empty array
    pub fn empty_array() -> Self {
        Value::Array(Rc::new(RefCell::new(Vec::new())))
    }
}

/// Collection keyed by case-insensitive [`Key`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    entries: HashMap<Key, Value>,
}

impl Struct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Lookup by plain text (case-insensitive).
    pub fn get_str(&self, name: &str) -> Option<&Value> {
        self.entries.get(&Key::new(name))
    }

    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }
}

// ========== From implementations ==========

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(Decimal::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(Decimal::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(Decimal::from(i64::from(v)))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Struct> for Value {
    fn from(v: Struct) -> Self {
        Value::new_struct(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        let values: Vec<Value> = v.into_iter().map(|x| x.into()).collect();
        Value::Array(Rc::new(RefCell::new(values)))
    }
}

// ========== Display implementation ==========

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::DateTime(ms) => write!(f, "{{ts {}}}", ms),
            Value::Array(arr) => {
                let arr = arr.borrow();
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Struct(s) => {
                let s = s.borrow();
                let mut entries: Vec<_> = s.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                write!(f, "{{")?;
                for (i, (k, v)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_primitives() {
        assert!(matches!(Value::from(42i64), Value::Number(_)));
        assert!(matches!(Value::from(true), Value::Bool(true)));
        assert!(matches!(Value::from("hello"), Value::Str(_)));
    }

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::from(42i64).type_name(), "number");
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::empty_struct().type_name(), "struct");
    }

    #[test]
    fn test_struct_keys_are_case_insensitive() {
        let mut s = Struct::new();
        s.set("Name", "x");
        s.set("NAME", "y");
        assert_eq!(s.len(), 1);
        assert_eq!(s.get_str("name"), Some(&Value::from("y")));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::from(42i64)), "42");
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Null), "null");

        let mut s = Struct::new();
        s.set("b", 2i64);
        s.set("a", "x");
        assert_eq!(format!("{}", Value::from(s)), "{a: \"x\", b: 2}");
    }
}

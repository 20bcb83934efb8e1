//! Case-insensitive collection keys
//!
//! A [`Key`] keeps the spelling it was created with for display, but compares
//! and hashes on its lower-cased form so `foo`, `Foo` and `FOO` are the same
//! member. A fixed set of well-known keys is created once per process and
//! addressed by field name (`_id`, `_ID`, ...), mirroring constant fields that
//! generated code can reference without any per-unit registration.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::Lazy;

/// Interned case-insensitive symbol.
#[derive(Clone)]
pub struct Key {
    name: Arc<str>,
    lower: Arc<str>,
}

impl Key {
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let lower = name.to_lowercase();
        Self {
            name: Arc::from(name),
            lower: Arc::from(lower),
        }
    }

    /// The original spelling.
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower.hash(state);
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lower.cmp(&other.lower)
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", self.name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::new(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::new(name)
    }
}

/// Names with a pre-registered constant. The constant's field name is the
/// name prefixed with `_`, matched exactly (so `id` and `ID` are distinct
/// fields that resolve to equal keys).
const WELL_KNOWN_NAMES: &[&str] = &[
    "action", "application", "args", "argumentCollection", "arguments", "array", "attributes",
    "body", "caller", "cause", "cfcatch", "cgi", "charset", "client", "closed", "code", "column",
    "content", "cookie", "count", "created", "data", "date", "default", "detail", "error",
    "exception", "exceptions", "file", "filter", "form", "from", "id", "index", "item", "key",
    "label", "length", "line", "local", "message", "name", "number", "path", "query", "replyto",
    "request", "required", "result", "return", "scope", "server", "session", "size", "source",
    "status", "string", "struct", "super", "template", "text", "this", "time", "timeout", "title",
    "to", "tries", "type", "url", "value", "variables", "x", "y", // upper-case forms
    "ACTION", "DATA", "DETAIL", "ID", "INDEX", "KEY", "LINE", "MESSAGE", "NAME", "RESULT",
    "STATUS", "TEMPLATE", "TYPE", "VALUE",
];

static KEY_CONSTANTS: Lazy<HashMap<String, Key>> = Lazy::new(|| {
    WELL_KNOWN_NAMES
        .iter()
        .map(|name| (format!("_{}", name), Key::new(name)))
        .collect()
});

/// Field name of the well-known constant for exactly `name`, if any.
///
/// # Examples
/// ```
/// use cfml_runtime::key;
/// assert_eq!(key::field_name("id"), Some("_id"));
/// assert_eq!(key::field_name("ID"), Some("_ID"));
/// assert_eq!(key::field_name("Id"), None);
/// ```
pub fn field_name(name: &str) -> Option<&'static str> {
    let field = format!("_{}", name);
    KEY_CONSTANTS
        .get_key_value(field.as_str())
        .map(|(field, _)| field.as_str())
}

/// The well-known key stored under `field` (e.g. `_id`).
pub fn constant(field: &str) -> Option<&'static Key> {
    KEY_CONSTANTS.get(field)
}

/// The well-known key for `name`, or a fresh key when none is registered.
pub fn well_known(name: &str) -> Key {
    field_name(name)
        .and_then(constant)
        .cloned()
        .unwrap_or_else(|| Key::new(name))
}

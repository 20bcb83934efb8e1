//! Execution context for interpreted evaluation
//!
//! The context owns the scope bindings and carries the configuration and the
//! `limited` capability flag. Expression nodes never own a context; it is
//! passed by reference to every evaluation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::key::Key;
use crate::scope::Scope;
use crate::value::{Struct, StructRef, Value};

#[derive(Debug)]
pub struct ExecutionContext {
    config: Arc<EngineConfig>,
    limited: bool,
    scopes: HashMap<Scope, StructRef>,
}

impl ExecutionContext {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            config,
            limited: false,
            scopes: HashMap::new(),
        }
    }

    /// A context in which operators with side effects or computation
    /// (arithmetic, compound assignment) are rejected.
    pub fn restricted(config: Arc<EngineConfig>) -> Self {
        Self::new(config).with_limited(true)
    }

    pub fn with_limited(mut self, limited: bool) -> Self {
        self.limited = limited;
        self
    }

    pub fn set_limited(&mut self, limited: bool) {
        self.limited = limited;
    }

    pub fn is_limited(&self) -> bool {
        self.limited
    }

    pub fn config(&self) -> &Arc<EngineConfig> {
        &self.config
    }

    /// The struct backing `scope`, created empty on first use. The
    /// `Undefined` scope resolves to `Variables`.
    pub fn scope(&mut self, scope: Scope) -> StructRef {
        let scope = if scope == Scope::Undefined {
            Scope::Variables
        } else {
            scope
        };
        self.scopes
            .entry(scope)
            .or_insert_with(|| Rc::new(RefCell::new(Struct::new())))
            .clone()
    }

    /// Read `key` from `scope`; unqualified lookups search
    /// [`Scope::UNDEFINED_SEARCH_ORDER`].
    pub fn get(&self, scope: Scope, key: &Key) -> Option<Value> {
        if scope == Scope::Undefined {
            return Scope::UNDEFINED_SEARCH_ORDER
                .iter()
                .find_map(|s| self.get_in(*s, key));
        }
        self.get_in(scope, key)
    }

    fn get_in(&self, scope: Scope, key: &Key) -> Option<Value> {
        self.scopes
            .get(&scope)
            .and_then(|s| s.borrow().get(key).cloned())
    }

    /// The struct an assignment to `key` in `scope` writes to. Unqualified
    /// writes go to the local or arguments scope when the name already lives
    /// there, otherwise to `Variables`.
    pub fn scope_for_write(&mut self, scope: Scope, key: &Key) -> StructRef {
        if scope == Scope::Undefined {
            for candidate in [Scope::Local, Scope::Arguments] {
                if self.get_in(candidate, key).is_some() {
                    return self.scope(candidate);
                }
            }
        }
        self.scope(scope)
    }

    /// Assign `key` in `scope`
    pub fn set(&mut self, scope: Scope, key: Key, value: Value) {
        let target = self.scope_for_write(scope, &key);
        target.borrow_mut().set(key, value);
    }
}

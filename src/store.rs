use std::collections::BTreeMap;

use crate::foundation::core::Ident;
use crate::foundation::error::{ScriptError, ScriptResult};
use crate::program::model::Value;

/// The mutable name → value environment owned by the evaluator.
///
/// Bindings are never removed: a clear command removes visual presence,
/// never the binding. Rebinding a name replaces the stored value wholesale,
/// so scene-graph nodes that captured the earlier value are unaffected.
///
/// Lookup is by key presence, not value truthiness: a name bound to `0.0`
/// or to an empty string of text is defined.
#[derive(Debug, Default)]
pub struct SymbolStore {
    bindings: BTreeMap<Ident, Value>,
}

impl SymbolStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, stamping the name onto the value's id.
    ///
    /// Replaces any previous binding for the same name.
    pub fn bind(&mut self, name: Ident, value: Value) {
        let value = value.with_id(&name);
        self.bindings.insert(name, value);
    }

    /// Look up a binding.
    pub fn get(&self, name: &Ident) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Look up a binding, failing with a reference error if absent.
    pub fn get_or_err(&self, name: &Ident) -> ScriptResult<&Value> {
        self.bindings
            .get(name)
            .ok_or_else(|| ScriptError::reference(format!("undefined variable `{name}`")))
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &Ident) -> bool {
        self.bindings.contains_key(name)
    }

    /// All bound names, in name order.
    pub fn names(&self) -> impl Iterator<Item = &Ident> {
        self.bindings.keys()
    }
}

#[cfg(test)]
#[path = "../tests/unit/store.rs"]
mod tests;

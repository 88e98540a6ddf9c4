//! Evaluation Context

use cohort_core::{StatsError, Value};
use crate::PluginRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// Evaluation context passed to plugins
pub struct EvalContext {
    /// Bin count used by histogram functions when the caller gives none
    pub default_bins: usize,
    pub variables: HashMap<String, Value>,
    pub registry: Arc<PluginRegistry>,
}

impl EvalContext {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            default_bins: 10,
            variables: HashMap::new(),
            registry,
        }
    }

    pub fn with_default_bins(mut self, bins: usize) -> Self {
        self.default_bins = bins;
        self
    }

    pub fn with_variables(mut self, vars: HashMap<String, Value>) -> Self {
        self.variables = vars;
        self
    }

    /// Look up a variable; dotted names descend into objects (`summary.mean`).
    pub fn get_var(&self, name: &str) -> Value {
        let mut parts = name.split('.');
        let root = match parts.next().and_then(|p| self.variables.get(p)) {
            Some(v) => v.clone(),
            None => return Value::Error(StatsError::undefined_var(name)),
        };

        let mut current = root;
        for part in parts {
            current = current.get(part);
            if current.is_error() {
                return current;
            }
        }
        current
    }

    pub fn set_var(&mut self, name: String, value: Value) {
        self.variables.insert(name, value);
    }

    /// Call another registered function with this context
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        self.registry.call_function(name, args, self)
    }
}

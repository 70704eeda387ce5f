//! Functions and filters shared by every template of a set

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tera::{Filter, Function, Tera, Value};

/// Named callables installed into each template when it is parsed
///
/// Registering a callable after a template was parsed does not reach that
/// template; re-import it to pick the new table up.
#[derive(Clone, Default)]
pub struct SharedFunctions {
    functions: BTreeMap<String, Arc<dyn Function>>,
    filters: BTreeMap<String, Arc<dyn Filter>>,
}

impl SharedFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function callable as `{{ name(arg=...) }}`
    pub fn register_function<F: Function + 'static>(&mut self, name: impl Into<String>, function: F) {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Register a filter callable as `{{ value | name }}`
    pub fn register_filter<F: Filter + 'static>(&mut self, name: impl Into<String>, filter: F) {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.filters.is_empty()
    }

    /// Install every callable into a tera instance
    pub(crate) fn install(&self, tera: &mut Tera) {
        for (name, function) in &self.functions {
            tera.register_function(name, SharedFunction(Arc::clone(function)));
        }
        for (name, filter) in &self.filters {
            tera.register_filter(name, SharedFilter(Arc::clone(filter)));
        }
    }
}

impl fmt::Debug for SharedFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedFunctions")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct SharedFunction(Arc<dyn Function>);

impl Function for SharedFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.call(args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

struct SharedFilter(Arc<dyn Filter>);

impl Filter for SharedFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.filter(value, args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

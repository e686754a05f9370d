//! MethodTable - selector 名とクロージャを 1:1 でマッピングする Receiver

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::ports::Receiver;

type Method = Box<dyn Fn(&[Value]) -> Value>;

pub struct MethodTable {
    name: String,
    methods: HashMap<String, Method>,
}

impl MethodTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// Add (or replace) the method answering `selector`.
    pub fn method<F>(mut self, selector: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        self.methods.insert(selector.into(), Box::new(f));
        self
    }

    pub fn selectors(&self) -> Vec<&str> {
        let mut selectors: Vec<_> = self.methods.keys().map(String::as_str).collect();
        selectors.sort_unstable();
        selectors
    }
}

impl Receiver for MethodTable {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn receive(&self, selector: &str, args: &[Value]) -> Option<Value> {
        self.methods.get(selector).map(|method| method(args))
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("name", &self.name)
            .field("selectors", &self.selectors())
            .finish()
    }
}

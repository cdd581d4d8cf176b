//! (namespace, local name) set used to catch duplicate attributes

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct TupleSet {
    seen: HashSet<(Option<String>, String)>,
}

impl TupleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.seen
            .contains(&(namespace.map(str::to_string), local_name.to_string()))
    }

    /// Returns `false` if the pair was already present
    pub fn add(&mut self, namespace: Option<&str>, local_name: &str) -> bool {
        self.seen
            .insert((namespace.map(str::to_string), local_name.to_string()))
    }
}

//! Registry of one-shot auto-expand flags.

use std::collections::HashSet;

/// Remembers which one-shot keys have already fired.
///
/// Owned by the tree model, so it lives exactly as long as the drawer that
/// owns the model.
#[derive(Debug, Default, Clone)]
pub struct ExpandOncePolicy {
    consumed: HashSet<String>,
}

impl ExpandOncePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `key` is seen and `false` on every later call.
    pub fn fire(&mut self, key: &str) -> bool {
        if self.consumed.contains(key) {
            return false;
        }
        self.consumed.insert(key.to_string());
        log::debug!("expand-once flag '{}' fired", key);
        true
    }

    pub fn is_consumed(&self, key: &str) -> bool {
        self.consumed.contains(key)
    }
}

//! Schema-less workflow state threaded through every step of a run.
//!
//! [`WorkflowState`] is a string-keyed map of dynamic JSON values. The engine
//! itself interprets exactly one key, [`BRANCH_KEY`], which it reads (never
//! writes) after a tool executes in order to resolve conditional transitions.
//! Every other key is a private contract between cooperating tools; the key
//! contract of the builtin code-review pipeline is documented in
//! [`crate::tools`].
//!
//! # Examples
//!
//! ```rust
//! use flowgraph::state::WorkflowState;
//! use serde_json::json;
//!
//! let state = WorkflowState::builder()
//!     .with_value("code", json!("def f():\n    pass"))
//!     .with_value("quality_threshold", json!(8))
//!     .build();
//!
//! assert_eq!(state.str_value("code"), Some("def f():\n    pass"));
//! assert_eq!(state.f64_value("quality_threshold"), Some(8.0));
//! assert!(state.branch_value().is_none());
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// State key consulted by the executor when resolving a conditional
/// transition. Tools steer branch-map edges by writing a string here.
pub const BRANCH_KEY: &str = "branch_key";

/// Mutable key-value state owned by a single run for its entire lifetime.
///
/// Values are arbitrary JSON: strings, numbers, booleans, sequences, nested
/// maps. Cloning a `WorkflowState` produces the point-in-time snapshot stored
/// in successful step-log entries, so earlier snapshots are unaffected by
/// later steps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowState {
    values: FxHashMap<String, Value>,
}

impl WorkflowState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for assembling an initial state with a fluent API.
    ///
    /// ```rust
    /// use flowgraph::state::WorkflowState;
    /// use serde_json::json;
    ///
    /// let state = WorkflowState::builder()
    ///     .with_value("code", json!("x = 1"))
    ///     .build();
    /// assert_eq!(state.len(), 1);
    /// ```
    #[must_use]
    pub fn builder() -> WorkflowStateBuilder {
        WorkflowStateBuilder::default()
    }

    /// Returns the raw value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Inserts a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Returns the value under `key` as a string slice, if it is a string.
    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Returns the value under `key` as an `f64`, if it is numeric.
    pub fn f64_value(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    /// Returns the branch value a tool wrote under [`BRANCH_KEY`], if any.
    ///
    /// Non-string values are treated as absent; transition targets are node
    /// names, so only string branch values can ever match a branch map.
    pub fn branch_value(&self) -> Option<&str> {
        self.str_value(BRANCH_KEY)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl From<FxHashMap<String, Value>> for WorkflowState {
    fn from(values: FxHashMap<String, Value>) -> Self {
        Self { values }
    }
}

/// Fluent builder for [`WorkflowState`], mirroring the builder style used
/// for graph definitions.
#[derive(Debug, Default)]
pub struct WorkflowStateBuilder {
    values: FxHashMap<String, Value>,
}

impl WorkflowStateBuilder {
    /// Adds one key-value entry.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Builds the final state.
    #[must_use]
    pub fn build(self) -> WorkflowState {
        WorkflowState {
            values: self.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_clone_is_independent() {
        let mut state = WorkflowState::new();
        state.insert("status", json!("processing"));
        let snapshot = state.clone();

        state.insert("status", json!("complete"));

        assert_eq!(snapshot.str_value("status"), Some("processing"));
        assert_eq!(state.str_value("status"), Some("complete"));
    }

    #[test]
    fn branch_value_requires_string() {
        let mut state = WorkflowState::new();
        assert!(state.branch_value().is_none());

        state.insert(BRANCH_KEY, json!(42));
        assert!(state.branch_value().is_none());

        state.insert(BRANCH_KEY, json!("continue"));
        assert_eq!(state.branch_value(), Some("continue"));
    }

    #[test]
    fn serde_round_trip_is_transparent() {
        let state = WorkflowState::builder()
            .with_value("code", json!("x = 1"))
            .with_value("nested", json!({"a": [1, 2, 3]}))
            .build();

        let encoded = serde_json::to_string(&state).unwrap();
        let decoded: WorkflowState = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, state);
        // Transparent serialization: plain JSON object, no wrapper field.
        assert!(encoded.starts_with('{'));
        assert!(!encoded.contains("values"));
    }
}

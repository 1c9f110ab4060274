//! Tool abstraction and the registry the executor dispatches through.
//!
//! A [`Tool`] is a named, total transformation from one [`WorkflowState`] to
//! another. Tools are registered by name in a [`ToolRegistry`] built once at
//! startup and read-only afterwards, so concurrent lookups need no locking.
//! The executor treats tool failure messages as opaque strings; it performs
//! no introspection on the error type.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::state::WorkflowState;

/// A named, pure state-transforming operation.
///
/// Implementations receive the run's current state by value and return the
/// replacement state. A returned error is fatal to the run: the executor
/// records the message verbatim in the step log, marks the run failed, and
/// stops. No retry is attempted.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use flowgraph::state::WorkflowState;
/// use flowgraph::tool::{Tool, ToolError};
/// use serde_json::json;
///
/// struct Uppercase;
///
/// #[async_trait]
/// impl Tool for Uppercase {
///     async fn apply(&self, mut state: WorkflowState) -> Result<WorkflowState, ToolError> {
///         let text = state
///             .str_value("text")
///             .ok_or(ToolError::MissingInput { what: "text" })?
///             .to_uppercase();
///         state.insert("text", json!(text));
///         Ok(state)
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Transform the given state, or fail with a human-readable message.
    async fn apply(&self, state: WorkflowState) -> Result<WorkflowState, ToolError>;
}

/// Errors a tool can signal during execution.
///
/// These are fatal to the run that invoked the tool, never to the process.
#[derive(Debug, Error, Diagnostic)]
pub enum ToolError {
    /// Expected input data is missing from the state.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(flowgraph::tool::missing_input),
        help("Check that an earlier step produced the required key.")
    )]
    MissingInput { what: &'static str },

    /// Tool-specific failure with a human-readable message.
    #[error("{0}")]
    #[diagnostic(code(flowgraph::tool::failed))]
    Failed(String),
}

/// Injected name→implementation table, assembled at startup.
///
/// The registry is deliberately append-only through the builder-style
/// [`register`](Self::register) call and immutable once handed to the
/// executor.
///
/// # Examples
///
/// ```rust
/// use flowgraph::tool::ToolRegistry;
/// use flowgraph::tools::ExtractFunctions;
///
/// let registry = ToolRegistry::new().register("extract_functions", ExtractFunctions);
/// assert!(registry.lookup("extract_functions").is_some());
/// assert!(registry.lookup("unknown").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: FxHashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under `name`, replacing any previous registration.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, tool: impl Tool + 'static) -> Self {
        self.tools.insert(name.into(), Arc::new(tool));
        self
    }

    /// Looks up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Iterates over registered tool names in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

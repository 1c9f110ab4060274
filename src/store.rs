//! Process-wide repositories for graphs and runs.
//!
//! Both stores are cheap-to-clone handles over a mutex-guarded map, so
//! concurrent create/lookup calls from separate tasks never observe torn
//! state. Locks are held only for the insert or lookup itself, never across
//! tool execution.

use std::sync::Arc;

use miette::Diagnostic;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::executor::{self, ExecutionOptions};
use crate::graph::{Graph, GraphDefinition, GraphError};
use crate::run::Run;
use crate::state::WorkflowState;
use crate::tool::ToolRegistry;

/// Lookup failures surfaced to the service boundary as not-found conditions.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("Graph not found")]
    #[diagnostic(
        code(flowgraph::store::graph_not_found),
        help("The graph id is not registered; create the graph first.")
    )]
    GraphNotFound { graph_id: String },

    #[error("Run not found")]
    #[diagnostic(
        code(flowgraph::store::run_not_found),
        help("The run id is not registered; start a run first.")
    )]
    RunNotFound { run_id: String },
}

/// Repository of defined graphs, keyed by generated id.
///
/// Graphs are created and looked up, never mutated or deleted.
#[derive(Clone, Default)]
pub struct GraphStore {
    inner: Arc<Mutex<FxHashMap<String, Arc<Graph>>>>,
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and materializes a definition, registers the graph under a
    /// fresh id, and returns it.
    pub fn create(&self, definition: GraphDefinition) -> Result<Arc<Graph>, GraphError> {
        let graph = Arc::new(Graph::new(definition)?);
        self.inner
            .lock()
            .insert(graph.graph_id.clone(), Arc::clone(&graph));
        tracing::info!(graph_id = %graph.graph_id, nodes = graph.nodes.len(), "graph created");
        Ok(graph)
    }

    /// Pure lookup by id.
    pub fn get(&self, graph_id: &str) -> Result<Arc<Graph>, StoreError> {
        self.inner
            .lock()
            .get(graph_id)
            .cloned()
            .ok_or_else(|| StoreError::GraphNotFound {
                graph_id: graph_id.to_string(),
            })
    }
}

/// Repository of run records, keyed by generated id.
///
/// [`start`](Self::start) registers the run while it is still `Running`, so
/// a concurrent inspection sees a live record, then replaces it with the
/// finished record once traversal returns.
#[derive(Clone, Default)]
pub struct RunStore {
    inner: Arc<Mutex<FxHashMap<String, Run>>>,
}

impl RunStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run of `graph_id` from `initial_state` and drives it to a
    /// terminal status before returning the finished record.
    ///
    /// A failed run is not an error: the record comes back with terminal
    /// status and its up-to-that-point log. Only an unknown graph id is an
    /// error.
    pub async fn start(
        &self,
        graphs: &GraphStore,
        registry: &ToolRegistry,
        graph_id: &str,
        initial_state: WorkflowState,
        options: &ExecutionOptions,
    ) -> Result<Run, StoreError> {
        let graph = graphs.get(graph_id)?;
        let mut run = Run::new(&graph, initial_state);
        self.inner.lock().insert(run.run_id.clone(), run.clone());

        executor::drive(&graph, registry, &mut run, options).await;

        self.inner.lock().insert(run.run_id.clone(), run.clone());
        Ok(run)
    }

    /// Read-only lookup for status and step-log inspection.
    pub fn get(&self, run_id: &str) -> Result<Run, StoreError> {
        self.inner
            .lock()
            .get(run_id)
            .cloned()
            .ok_or_else(|| StoreError::RunNotFound {
                run_id: run_id.to_string(),
            })
    }
}

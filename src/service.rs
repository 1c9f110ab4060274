//! HTTP boundary for the engine: graph creation, runs, and run inspection.
//!
//! The router exposes the four operations of the reference service. Lookup
//! failures (unknown graph or run id) surface as 404 responses with a
//! `{"detail": ...}` body; a structurally invalid graph definition is a 422.
//! A failed run is NOT an error response: `POST /graph/run` still answers
//! 200 with the run's final state, and the failure is discoverable through
//! `GET /graph/state/{run_id}`'s `status` field. Both run-shaped responses
//! list successful step entries only.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::executor::ExecutionOptions;
use crate::graph::{GraphDefinition, GraphError};
use crate::run::{Run, RunStatus, StepEntry};
use crate::state::WorkflowState;
use crate::store::{GraphStore, RunStore, StoreError};
use crate::tool::ToolRegistry;
use crate::workflows;

/// Everything the handlers need: the two stores, the injected tool table,
/// and the per-run step cap.
#[derive(Clone)]
pub struct AppContext {
    graphs: GraphStore,
    runs: RunStore,
    tools: Arc<ToolRegistry>,
    max_steps: u64,
}

impl AppContext {
    /// Context with fresh stores and the default step cap.
    #[must_use]
    pub fn new(tools: ToolRegistry) -> Self {
        Self {
            graphs: GraphStore::new(),
            runs: RunStore::new(),
            tools: Arc::new(tools),
            max_steps: crate::executor::DEFAULT_MAX_STEPS,
        }
    }

    /// Overrides the per-run step cap.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn graphs(&self) -> &GraphStore {
        &self.graphs
    }

    pub fn runs(&self) -> &RunStore {
        &self.runs
    }

    fn execution_options(&self) -> ExecutionOptions {
        ExecutionOptions::with_max_steps(self.max_steps)
    }
}

/// Boundary error mapping. Everything else is contained inside run records.
#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    InvalidGraph(GraphError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::NotFound(err.to_string())
    }
}

impl From<GraphError> for ServiceError {
    fn from(err: GraphError) -> Self {
        ServiceError::InvalidGraph(err)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ServiceError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ServiceError::InvalidGraph(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphCreateResponse {
    pub graph_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphRunRequest {
    pub graph_id: String,
    pub initial_state: WorkflowState,
}

/// One successful step as exposed on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct StepLog {
    pub node: String,
    pub state: WorkflowState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphRunResponse {
    pub run_id: String,
    pub final_state: WorkflowState,
    pub log: Vec<StepLog>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunStateResponse {
    pub run_id: String,
    pub graph_id: String,
    pub state: WorkflowState,
    pub status: RunStatus,
    pub current_node: Option<String>,
    pub log: Vec<StepLog>,
}

fn successful_log(run: &Run) -> Vec<StepLog> {
    run.successful_steps()
        .filter_map(|entry| match entry {
            StepEntry::Success { node, state, .. } => Some(StepLog {
                node: node.clone(),
                state: state.clone(),
            }),
            StepEntry::Failure { .. } => None,
        })
        .collect()
}

/// Builds the service router over the given context.
#[must_use]
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/graph/create", post(create_graph))
        .route("/graph/create/code-review", post(create_code_review_graph))
        .route("/graph/run", post(run_graph))
        .route("/graph/state/:run_id", get(get_run_state))
        .with_state(ctx)
}

async fn create_graph(
    State(ctx): State<AppContext>,
    Json(definition): Json<GraphDefinition>,
) -> Result<Json<GraphCreateResponse>, ServiceError> {
    let graph = ctx.graphs.create(definition)?;
    Ok(Json(GraphCreateResponse {
        graph_id: graph.graph_id.clone(),
    }))
}

async fn create_code_review_graph(
    State(ctx): State<AppContext>,
) -> Result<Json<GraphCreateResponse>, ServiceError> {
    let graph = ctx.graphs.create(workflows::code_review_definition())?;
    Ok(Json(GraphCreateResponse {
        graph_id: graph.graph_id.clone(),
    }))
}

async fn run_graph(
    State(ctx): State<AppContext>,
    Json(request): Json<GraphRunRequest>,
) -> Result<Json<GraphRunResponse>, ServiceError> {
    let options = ctx.execution_options();
    let run = ctx
        .runs
        .start(
            &ctx.graphs,
            &ctx.tools,
            &request.graph_id,
            request.initial_state,
            &options,
        )
        .await?;

    Ok(Json(GraphRunResponse {
        log: successful_log(&run),
        run_id: run.run_id,
        final_state: run.state,
    }))
}

async fn get_run_state(
    State(ctx): State<AppContext>,
    Path(run_id): Path<String>,
) -> Result<Json<RunStateResponse>, ServiceError> {
    let run = ctx.runs.get(&run_id)?;
    Ok(Json(RunStateResponse {
        log: successful_log(&run),
        run_id: run.run_id,
        graph_id: run.graph_id,
        state: run.state,
        status: run.status,
        current_node: run.current_node,
    }))
}

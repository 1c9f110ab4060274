//! # Flowgraph: a minimal graph-driven workflow engine
//!
//! Flowgraph executes user-defined directed workflows: a graph of named
//! steps, each bound to a named tool, connected by direct or branch-keyed
//! conditional transitions, threading one mutable state object through every
//! step until a terminal node is reached. It is built for multi-step,
//! possibly cyclic, agent-style pipelines such as iterative code-review
//! loops.
//!
//! ## Core Concepts
//!
//! - **Graph**: immutable definition of nodes, transitions, and a start node
//! - **Tool**: a named, pure state-transforming operation
//! - **Run**: one execution instance of a graph, owning its state and log
//! - **Transition**: direct (single target) or conditional (branch value →
//!   target, where a missing target ends the run)
//!
//! ## Defining a Graph
//!
//! Definitions are validated when materialized: the start node and every
//! transition target must name an existing node, so a dangling reference
//! fails at creation time instead of mid-traversal.
//!
//! ```rust
//! use flowgraph::graph::{Graph, GraphDefinition};
//!
//! let definition = GraphDefinition::new("extract")
//!     .with_node("extract", "extract_functions")
//!     .with_node("loop_check", "check_quality_loop_condition")
//!     .with_edge("extract", "loop_check")
//!     .with_branch("loop_check", [("continue", Some("extract")), ("stop", None)]);
//!
//! let graph = Graph::new(definition).unwrap();
//! assert_eq!(graph.start_node, "extract");
//! ```
//!
//! ## Running a Workflow
//!
//! The [`store::RunStore`] drives a run to completion within a single call.
//! Step-level failures (missing tool, tool error) terminate the run as
//! `failed` and are recorded in its log; they never surface as errors from
//! the call itself.
//!
//! ```rust,no_run
//! use flowgraph::executor::ExecutionOptions;
//! use flowgraph::state::WorkflowState;
//! use flowgraph::store::{GraphStore, RunStore};
//! use flowgraph::tools::builtin_registry;
//! use flowgraph::workflows::code_review_definition;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     let graphs = GraphStore::new();
//!     let runs = RunStore::new();
//!     let registry = builtin_registry();
//!
//!     let graph = graphs.create(code_review_definition())?;
//!     let initial = WorkflowState::builder()
//!         .with_value("code", json!("def f():\n    pass"))
//!         .with_value("quality_threshold", json!(8))
//!         .build();
//!
//!     let run = runs
//!         .start(&graphs, &registry, &graph.graph_id, initial, &ExecutionOptions::default())
//!         .await?;
//!     println!("{}: {}", run.run_id, run.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Guide
//!
//! - [`graph`] - Graph definitions, transitions, and creation-time validation
//! - [`state`] - Schema-less per-run workflow state
//! - [`tool`] - The `Tool` trait and the injected tool registry
//! - [`executor`] - The traversal loop, step cap, and cancellation flag
//! - [`run`] - Run records, statuses, and step-log entries
//! - [`store`] - Mutex-guarded graph and run repositories
//! - [`tools`] - Builtin code-review tools and their key contract
//! - [`workflows`] - Predefined workflow templates
//! - [`service`] - The axum HTTP boundary

pub mod executor;
pub mod graph;
pub mod run;
pub mod service;
pub mod state;
pub mod store;
pub mod tool;
pub mod tools;
pub mod workflows;

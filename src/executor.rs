//! The state-machine traversal loop that drives a run to a terminal status.
//!
//! Starting from the graph's start node, [`drive`] repeatedly resolves the
//! current node, dispatches to its tool, appends a step-log entry, and
//! resolves the next node from the transition table. Step-level failures
//! (missing tool, tool error) terminate the run as `Failed` and never
//! propagate to the caller; the run record itself is the result.
//!
//! The reference semantics place no bound on cyclic traversal, so a
//! misconfigured branch can route forever. [`ExecutionOptions`] adds the two
//! hardening controls any hosting service needs: a maximum step count and a
//! cancellation flag, both of which terminate the run as `Aborted`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::graph::{Graph, Transition};
use crate::run::{Run, RunStatus, StepEntry};
use crate::state::BRANCH_KEY;
use crate::tool::ToolRegistry;

/// Default per-run step cap. Generous for real workflows, small enough that
/// a tight branch cycle aborts promptly.
pub const DEFAULT_MAX_STEPS: u64 = 1_000;

/// Cancellation signal a caller can assert while a run is in flight.
///
/// Cloning shares the underlying flag. The executor observes it between
/// steps; a cancelled run terminates as [`RunStatus::Aborted`].
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Knobs for a single run's traversal.
#[derive(Clone, Debug)]
pub struct ExecutionOptions {
    /// Maximum number of node executions before the run is aborted.
    pub max_steps: u64,
    /// Cooperative cancellation signal, checked before each step.
    pub cancel: CancelFlag,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            cancel: CancelFlag::new(),
        }
    }
}

impl ExecutionOptions {
    /// Options with a specific step cap and a fresh cancellation flag.
    #[must_use]
    pub fn with_max_steps(max_steps: u64) -> Self {
        Self {
            max_steps,
            cancel: CancelFlag::new(),
        }
    }
}

/// Drives `run` to a terminal status against `graph`, dispatching through
/// `registry`.
///
/// Tools execute sequentially; the whole traversal completes within this one
/// call. The run's log, state, `current_node`, and `status` are mutated in
/// place, and no other observable effect occurs.
pub async fn drive(graph: &Graph, registry: &ToolRegistry, run: &mut Run, options: &ExecutionOptions) {
    let mut steps: u64 = 0;

    while run.status == RunStatus::Running {
        let Some(node_name) = run.current_node.clone() else {
            // A fresh run always has a current node; absent means a prior
            // iteration resolved terminal without setting a status.
            run.status = RunStatus::Completed;
            break;
        };

        if options.cancel.is_cancelled() {
            tracing::warn!(run_id = %run.run_id, node = %node_name, "run cancelled");
            run.status = RunStatus::Aborted;
            break;
        }
        if steps >= options.max_steps {
            tracing::warn!(
                run_id = %run.run_id,
                node = %node_name,
                max_steps = options.max_steps,
                "step limit exceeded"
            );
            run.status = RunStatus::Aborted;
            break;
        }
        steps += 1;

        let Some(node) = graph.node(&node_name) else {
            // Unreachable for validated graphs; still a run failure, never a
            // process fault.
            run.status = RunStatus::Failed;
            run.log.push(StepEntry::failure(
                node_name.clone(),
                format!("Node {node_name} is not defined in graph {}", graph.graph_id),
            ));
            break;
        };

        let Some(tool) = registry.lookup(&node.tool_name) else {
            run.status = RunStatus::Failed;
            run.log.push(StepEntry::failure(
                node_name.clone(),
                format!("Tool {} not found", node.tool_name),
            ));
            break;
        };

        tracing::debug!(
            run_id = %run.run_id,
            step = steps,
            node = %node_name,
            tool = %node.tool_name,
            "executing node"
        );

        match tool.apply(run.state.clone()).await {
            Ok(next_state) => run.state = next_state,
            Err(err) => {
                run.status = RunStatus::Failed;
                run.log
                    .push(StepEntry::failure(node_name.clone(), err.to_string()));
                break;
            }
        }

        run.log
            .push(StepEntry::success(node_name.clone(), run.state.clone()));

        match graph.transition(&node_name) {
            None => {
                run.current_node = None;
                run.status = RunStatus::Completed;
            }
            Some(Transition::Direct(target)) => {
                run.current_node = Some(target.clone());
            }
            Some(Transition::Branch(map)) => {
                let branch = run.state.branch_value();
                tracing::debug!(
                    run_id = %run.run_id,
                    node = %node_name,
                    branch_key = BRANCH_KEY,
                    branch = branch.unwrap_or("<absent>"),
                    "resolving conditional transition"
                );
                // An absent branch key, an unmapped branch value, and an
                // explicit null target all end the run the same way.
                run.current_node = branch.and_then(|value| map.get(value)).cloned().flatten();
                if run.current_node.is_none() {
                    run.status = RunStatus::Completed;
                }
            }
        }
    }

    tracing::info!(
        run_id = %run.run_id,
        status = %run.status,
        steps,
        "run finished"
    );
}

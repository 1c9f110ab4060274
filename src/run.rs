//! Run records: one execution instance of a graph, with status and step log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graph::Graph;
use crate::state::WorkflowState;

/// Lifecycle of a run.
///
/// `Running` is the only non-terminal status. `Aborted` is reached when the
/// step cap is exceeded or the caller asserts the cancellation flag; the
/// other terminal statuses follow from traversal itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Aborted,
}

impl RunStatus {
    /// Returns `true` once the status has left `Running`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// One log record per visited node, in execution order.
///
/// A successful step carries a snapshot of the state as it stood immediately
/// after the node's tool ran; later steps never mutate earlier snapshots. A
/// failure entry carries the triggering error message verbatim and is always
/// the last entry of its run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepEntry {
    Success {
        node: String,
        state: WorkflowState,
        #[serde(default = "Utc::now")]
        when: DateTime<Utc>,
    },
    Failure {
        node: String,
        error: String,
        #[serde(default = "Utc::now")]
        when: DateTime<Utc>,
    },
}

impl StepEntry {
    /// Creates a success entry stamped with the current time.
    #[must_use]
    pub fn success(node: impl Into<String>, state: WorkflowState) -> Self {
        StepEntry::Success {
            node: node.into(),
            state,
            when: Utc::now(),
        }
    }

    /// Creates a failure entry stamped with the current time.
    #[must_use]
    pub fn failure(node: impl Into<String>, error: impl Into<String>) -> Self {
        StepEntry::Failure {
            node: node.into(),
            error: error.into(),
            when: Utc::now(),
        }
    }

    /// The node this entry was recorded for.
    pub fn node(&self) -> &str {
        match self {
            StepEntry::Success { node, .. } | StepEntry::Failure { node, .. } => node,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepEntry::Success { .. })
    }

    /// The state snapshot, for successful entries.
    pub fn state(&self) -> Option<&WorkflowState> {
        match self {
            StepEntry::Success { state, .. } => Some(state),
            StepEntry::Failure { .. } => None,
        }
    }

    /// The error message, for failure entries.
    pub fn error(&self) -> Option<&str> {
        match self {
            StepEntry::Failure { error, .. } => Some(error),
            StepEntry::Success { .. } => None,
        }
    }
}

/// One execution instance of a graph.
///
/// A run owns its state and log exclusively: it is mutated only by the
/// executor driving it to completion, then retained for read-only inspection.
/// `graph_id` is a reference, not ownership; the graph outlives every run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub graph_id: String,
    pub current_node: Option<String>,
    pub state: WorkflowState,
    pub log: Vec<StepEntry>,
    pub status: RunStatus,
}

impl Run {
    /// Creates a fresh run positioned at the graph's start node.
    #[must_use]
    pub fn new(graph: &Graph, initial_state: WorkflowState) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            graph_id: graph.graph_id.clone(),
            current_node: Some(graph.start_node.clone()),
            state: initial_state,
            log: Vec::new(),
            status: RunStatus::Running,
        }
    }

    /// Iterates over the successful step entries, in execution order.
    pub fn successful_steps(&self) -> impl Iterator<Item = &StepEntry> {
        self.log.iter().filter(|entry| entry.is_success())
    }
}

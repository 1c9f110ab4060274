#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};

use flowgraph::graph::GraphDefinition;
use flowgraph::state::WorkflowState;
use flowgraph::tool::{Tool, ToolError, ToolRegistry};

/// Appends its name to the `visited` list so tests can assert visitation
/// order.
pub struct RecordTool {
    pub name: String,
}

impl RecordTool {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Tool for RecordTool {
    async fn apply(&self, mut state: WorkflowState) -> Result<WorkflowState, ToolError> {
        let mut visited = state
            .get("visited")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        visited.push(json!(self.name));
        state.insert("visited", Value::Array(visited));
        Ok(state)
    }
}

/// Always fails with a fixed message.
pub struct FailingTool {
    pub message: &'static str,
}

#[async_trait]
impl Tool for FailingTool {
    async fn apply(&self, _state: WorkflowState) -> Result<WorkflowState, ToolError> {
        Err(ToolError::Failed(self.message.to_string()))
    }
}

/// Writes a fixed branch value so conditional transitions can be steered
/// deterministically.
pub struct BranchTool {
    pub value: String,
}

#[async_trait]
impl Tool for BranchTool {
    async fn apply(&self, mut state: WorkflowState) -> Result<WorkflowState, ToolError> {
        state.insert(flowgraph::state::BRANCH_KEY, json!(self.value));
        Ok(state)
    }
}

/// Registry with one `RecordTool` per chain step plus the failure/branch
/// helpers under fixed names.
pub fn chain_registry(len: usize) -> ToolRegistry {
    let mut registry = ToolRegistry::new()
        .register("boom", FailingTool { message: "synthetic failure" })
        .register("record", RecordTool::named("record"));
    for index in 0..len {
        registry = registry.register(format!("step_{index}"), RecordTool::named(format!("step_{index}")));
    }
    registry
}

/// Acyclic chain `node_0 -> node_1 -> ... -> node_{len-1}`, each node bound
/// to its own `step_{i}` tool. The last node has no outgoing edge.
pub fn chain_definition(len: usize) -> GraphDefinition {
    assert!(len > 0, "chain needs at least one node");
    let mut definition = GraphDefinition::new("node_0");
    for index in 0..len {
        definition = definition.with_node(format!("node_{index}"), format!("step_{index}"));
        if index + 1 < len {
            definition = definition.with_edge(format!("node_{index}"), format!("node_{}", index + 1));
        }
    }
    definition
}

/// The `visited` list accumulated by [`RecordTool`] executions.
pub fn visited(state: &WorkflowState) -> Vec<String> {
    state
        .get("visited")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

//! Static workflow graph definitions: nodes, transitions, and validation.
//!
//! A [`Graph`] is the immutable definition of a workflow: named nodes bound
//! to tool names, a transition table, and a designated start node. Graphs are
//! materialized from a [`GraphDefinition`] by [`Graph::new`], which performs
//! the structural validation the engine relies on during traversal: the start
//! node and every transition target must name an existing node. A node with
//! no entry in the transition table is terminal.
//!
//! # Examples
//!
//! ```rust
//! use flowgraph::graph::{Graph, GraphDefinition, Transition};
//!
//! let definition = GraphDefinition::new("check")
//!     .with_node("check", "check_quality_loop_condition")
//!     .with_node("fix", "suggest_improvements")
//!     .with_branch("check", [("continue", Some("fix")), ("stop", None)])
//!     .with_edge("fix", "check");
//!
//! let graph = Graph::new(definition).unwrap();
//! assert_eq!(graph.start_node, "check");
//! assert!(matches!(graph.transition("fix"), Some(Transition::Direct(t)) if t == "check"));
//! ```
//!
//! Dangling references are rejected at creation time instead of faulting
//! deep inside traversal:
//!
//! ```rust
//! use flowgraph::graph::{Graph, GraphDefinition};
//!
//! let definition = GraphDefinition::new("a")
//!     .with_node("a", "extract_functions")
//!     .with_edge("a", "missing");
//!
//! assert!(Graph::new(definition).is_err());
//! ```

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A named step bound to the tool it performs.
///
/// Created at graph-definition time; immutable thereafter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub tool_name: String,
}

/// Outgoing edge of a node.
///
/// Either a direct target, or a conditional map from a branch value (the
/// string a tool wrote under [`BRANCH_KEY`](crate::state::BRANCH_KEY)) to a
/// target. A branch target of `None` means "end the run". On the wire a
/// direct transition is a plain node-name string and a conditional one is a
/// JSON object, so serialization is untagged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transition {
    /// Unconditional edge to a single target node.
    Direct(String),
    /// Branch-keyed routing. Missing keys and `None` targets end the run.
    Branch(FxHashMap<String, Option<String>>),
}

/// Caller-supplied graph definition, as accepted at the service boundary.
///
/// `nodes` maps node names to tool names, `edges` maps node names to their
/// outgoing [`Transition`]. The fluent `with_*` methods exist for building
/// definitions in code; deserializing a request body produces the same shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub nodes: FxHashMap<String, String>,
    pub edges: FxHashMap<String, Transition>,
    pub start_node: String,
}

impl GraphDefinition {
    /// Creates an empty definition with the given start node.
    #[must_use]
    pub fn new(start_node: impl Into<String>) -> Self {
        Self {
            nodes: FxHashMap::default(),
            edges: FxHashMap::default(),
            start_node: start_node.into(),
        }
    }

    /// Adds a node bound to a tool name.
    #[must_use]
    pub fn with_node(mut self, name: impl Into<String>, tool_name: impl Into<String>) -> Self {
        self.nodes.insert(name.into(), tool_name.into());
        self
    }

    /// Adds a direct edge from one node to another.
    #[must_use]
    pub fn with_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges
            .insert(from.into(), Transition::Direct(to.into()));
        self
    }

    /// Adds a conditional branch-map edge out of `from`.
    ///
    /// A `None` target ends the run when that branch value is selected.
    #[must_use]
    pub fn with_branch<K, T>(
        mut self,
        from: impl Into<String>,
        branches: impl IntoIterator<Item = (K, Option<T>)>,
    ) -> Self
    where
        K: Into<String>,
        T: Into<String>,
    {
        let map = branches
            .into_iter()
            .map(|(key, target)| (key.into(), target.map(Into::into)))
            .collect();
        self.edges.insert(from.into(), Transition::Branch(map));
        self
    }
}

/// Structural errors detected when materializing a [`Graph`].
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// The designated start node is not a defined node.
    #[error("start node `{0}` is not a defined node")]
    #[diagnostic(
        code(flowgraph::graph::unknown_start_node),
        help("`start_node` must name an entry in the definition's `nodes` map.")
    )]
    UnknownStartNode(String),

    /// A direct edge points at a node name that does not exist.
    #[error("edge from `{from}` targets undefined node `{target}`")]
    #[diagnostic(
        code(flowgraph::graph::dangling_edge_target),
        help("Every edge target must name an entry in the definition's `nodes` map.")
    )]
    DanglingEdgeTarget { from: String, target: String },

    /// A branch-map entry points at a node name that does not exist.
    #[error("branch `{branch}` from `{from}` targets undefined node `{target}`")]
    #[diagnostic(
        code(flowgraph::graph::dangling_branch_target),
        help("Branch targets must name defined nodes; use null to end the run.")
    )]
    DanglingBranchTarget {
        from: String,
        branch: String,
        target: String,
    },
}

/// Immutable workflow definition identified by a generated unique id.
///
/// Never mutated and never deleted; lifetime equals the process lifetime.
#[derive(Clone, Debug)]
pub struct Graph {
    pub graph_id: String,
    pub nodes: FxHashMap<String, Node>,
    pub edges: FxHashMap<String, Transition>,
    pub start_node: String,
}

impl Graph {
    /// Materializes a graph from a definition, assigning a fresh unique id.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if the start node or any transition target
    /// (direct or branch) does not name a defined node.
    pub fn new(definition: GraphDefinition) -> Result<Self, GraphError> {
        let GraphDefinition {
            nodes: node_tools,
            edges,
            start_node,
        } = definition;

        if !node_tools.contains_key(&start_node) {
            return Err(GraphError::UnknownStartNode(start_node));
        }
        for (from, transition) in &edges {
            match transition {
                Transition::Direct(target) => {
                    if !node_tools.contains_key(target) {
                        return Err(GraphError::DanglingEdgeTarget {
                            from: from.clone(),
                            target: target.clone(),
                        });
                    }
                }
                Transition::Branch(map) => {
                    for (branch, target) in map {
                        if let Some(target) = target
                            && !node_tools.contains_key(target)
                        {
                            return Err(GraphError::DanglingBranchTarget {
                                from: from.clone(),
                                branch: branch.clone(),
                                target: target.clone(),
                            });
                        }
                    }
                }
            }
        }

        let nodes = node_tools
            .into_iter()
            .map(|(name, tool_name)| {
                let node = Node {
                    name: name.clone(),
                    tool_name,
                };
                (name, node)
            })
            .collect();

        Ok(Self {
            graph_id: Uuid::new_v4().to_string(),
            nodes,
            edges,
            start_node,
        })
    }

    /// Returns the node registered under `name`, if any.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Returns the outgoing transition of `name`. `None` means the node is
    /// terminal.
    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.edges.get(name)
    }
}

#[macro_use]
extern crate proptest;

use proptest::prelude::{Strategy, prop};

use flowgraph::executor::ExecutionOptions;
use flowgraph::graph::{Graph, GraphDefinition};
use flowgraph::run::RunStatus;
use flowgraph::state::WorkflowState;
use flowgraph::store::{GraphStore, RunStore};
use flowgraph::tool::ToolRegistry;

mod common;
use common::*;

/// Generate valid node names: a letter followed by 0..16 of [A-Za-z0-9_].
fn node_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9_]{0,16}").unwrap()
}

fn block_on<F: std::future::Future<Output = ()>>(fut: F) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(fut);
}

proptest! {
    /// An acyclic chain always completes in exactly |nodes| steps, with one
    /// successful log entry per node in visitation order.
    #[test]
    fn prop_linear_chain_terminates(len in 1usize..12) {
        block_on(async move {
            let graphs = GraphStore::new();
            let runs = RunStore::new();
            let registry = chain_registry(len);
            let graph = graphs.create(chain_definition(len)).unwrap();

            let run = runs
                .start(
                    &graphs,
                    &registry,
                    &graph.graph_id,
                    WorkflowState::new(),
                    &ExecutionOptions::default(),
                )
                .await
                .unwrap();

            assert_eq!(run.status, RunStatus::Completed);
            assert_eq!(run.log.len(), len);
            for (index, entry) in run.log.iter().enumerate() {
                assert!(entry.is_success());
                assert_eq!(entry.node(), format!("node_{index}"));
            }
        });
    }
}

proptest! {
    /// Any direct edge whose target is not among the defined nodes is
    /// rejected at creation time.
    #[test]
    fn prop_dangling_targets_are_rejected(
        mut names in prop::collection::vec(node_name_strategy(), 1..8),
        ghost in node_name_strategy(),
    ) {
        names.sort();
        names.dedup();
        prop_assume!(!names.contains(&ghost));

        let mut definition = GraphDefinition::new(names[0].clone());
        for name in &names {
            definition = definition.with_node(name.clone(), "record");
        }
        definition = definition.with_edge(names[0].clone(), ghost);

        prop_assert!(Graph::new(definition).is_err());
    }
}

proptest! {
    /// Whatever branch value a tool writes, a branch map containing only
    /// "continue" either routes there or completes the run; it never faults
    /// and never routes anywhere else.
    #[test]
    fn prop_branch_resolution_is_total(value in "[a-z]{1,10}") {
        block_on(async move {
            let graphs = GraphStore::new();
            let runs = RunStore::new();
            let registry = ToolRegistry::new()
                .register("steer", BranchTool { value: value.clone() })
                .register("record", RecordTool::named("target"));
            let graph = graphs
                .create(
                    GraphDefinition::new("steer_node")
                        .with_node("steer_node", "steer")
                        .with_node("target", "record")
                        .with_branch("steer_node", [("continue", Some("target"))]),
                )
                .unwrap();

            let run = runs
                .start(
                    &graphs,
                    &registry,
                    &graph.graph_id,
                    WorkflowState::new(),
                    &ExecutionOptions::default(),
                )
                .await
                .unwrap();

            assert_eq!(run.status, RunStatus::Completed);
            if value == "continue" {
                assert_eq!(run.log.len(), 2);
                assert_eq!(run.log[1].node(), "target");
            } else {
                assert_eq!(run.log.len(), 1);
                assert!(run.current_node.is_none());
            }
        });
    }
}

//! Predefined workflow templates.

use crate::graph::GraphDefinition;

/// The code-review pipeline: a 5-node linear pass with a final conditional
/// loop-back edge.
///
/// `extract → complexity → issues → suggest → loop_check`, where
/// `loop_check`'s branch value `"continue"` routes back to `extract` and
/// `"stop"` ends the run. Every tool name resolves against
/// [`crate::tools::builtin_registry`].
#[must_use]
pub fn code_review_definition() -> GraphDefinition {
    GraphDefinition::new("extract")
        .with_node("extract", "extract_functions")
        .with_node("complexity", "check_complexity")
        .with_node("issues", "detect_issues")
        .with_node("suggest", "suggest_improvements")
        .with_node("loop_check", "check_quality_loop_condition")
        .with_edge("extract", "complexity")
        .with_edge("complexity", "issues")
        .with_edge("issues", "suggest")
        .with_edge("suggest", "loop_check")
        .with_branch("loop_check", [("continue", Some("extract")), ("stop", None)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, Transition};

    #[test]
    fn template_validates() {
        let graph = Graph::new(code_review_definition()).unwrap();
        assert_eq!(graph.start_node, "extract");
        assert_eq!(graph.nodes.len(), 5);
        match graph.transition("loop_check") {
            Some(Transition::Branch(map)) => {
                assert_eq!(map.get("continue"), Some(&Some("extract".to_string())));
                assert_eq!(map.get("stop"), Some(&None));
            }
            other => panic!("expected branch transition, got {other:?}"),
        }
    }
}

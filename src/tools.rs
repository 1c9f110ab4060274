//! Builtin code-review tools.
//!
//! Plain text heuristics over a `code` string. The shared key contract lives
//! in [`keys`]; it belongs to this tool set and the code-review template, not
//! to the engine, which only ever reads [`keys::BRANCH_KEY`].

use async_trait::async_trait;
use serde_json::json;

use crate::state::WorkflowState;
use crate::tool::{Tool, ToolError, ToolRegistry};

/// Conventional state keys shared by the code-review tools.
pub mod keys {
    pub use crate::state::BRANCH_KEY;

    pub const CODE: &str = "code";
    pub const FUNCTIONS: &str = "functions";
    pub const FUNCTION_COUNT: &str = "function_count";
    pub const COMPLEXITY_SCORE: &str = "complexity_score";
    pub const COMPLEXITY_LEVEL: &str = "complexity_level";
    pub const ISSUES: &str = "issues";
    pub const SUGGESTIONS: &str = "suggestions";
    pub const QUALITY_SCORE: &str = "quality_score";
    pub const QUALITY_THRESHOLD: &str = "quality_threshold";
}

/// Default quality threshold when the caller supplies none.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 8.0;

fn code_of(state: &WorkflowState) -> String {
    state.str_value(keys::CODE).unwrap_or_default().to_string()
}

/// Collects lines that declare a function (`def ` prefix after trimming).
pub struct ExtractFunctions;

#[async_trait]
impl Tool for ExtractFunctions {
    async fn apply(&self, mut state: WorkflowState) -> Result<WorkflowState, ToolError> {
        let code = code_of(&state);
        let functions: Vec<String> = code
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("def "))
            .map(str::to_string)
            .collect();
        state.insert(keys::FUNCTION_COUNT, json!(functions.len()));
        state.insert(keys::FUNCTIONS, json!(functions));
        Ok(state)
    }
}

/// Scores complexity from the non-blank line count, capped at 10.
pub struct CheckComplexity;

#[async_trait]
impl Tool for CheckComplexity {
    async fn apply(&self, mut state: WorkflowState) -> Result<WorkflowState, ToolError> {
        let code = code_of(&state);
        let lines = code.lines().filter(|line| !line.trim().is_empty()).count();
        let complexity_score = (lines as f64 / 10.0).min(10.0);
        let complexity_level = if complexity_score > 5.0 { "high" } else { "low" };
        state.insert(keys::COMPLEXITY_SCORE, json!(complexity_score));
        state.insert(keys::COMPLEXITY_LEVEL, json!(complexity_level));
        Ok(state)
    }
}

/// Counts `TODO` markers as open issues.
pub struct DetectIssues;

#[async_trait]
impl Tool for DetectIssues {
    async fn apply(&self, mut state: WorkflowState) -> Result<WorkflowState, ToolError> {
        let code = code_of(&state);
        let issues = code.matches("TODO").count();
        state.insert(keys::ISSUES, json!(issues));
        Ok(state)
    }
}

/// Derives suggestions and a 0..=10 quality score from the earlier scores.
pub struct SuggestImprovements;

#[async_trait]
impl Tool for SuggestImprovements {
    async fn apply(&self, mut state: WorkflowState) -> Result<WorkflowState, ToolError> {
        let complexity_penalty = state.f64_value(keys::COMPLEXITY_SCORE).unwrap_or(0.0);
        let issue_penalty = state.f64_value(keys::ISSUES).unwrap_or(0.0);

        let mut suggestions: Vec<&str> = Vec::new();
        if complexity_penalty > 5.0 {
            suggestions.push("Reduce function size or refactor into smaller functions.");
        }
        if issue_penalty > 0.0 {
            suggestions.push("Resolve TODO comments and pending issues.");
        }
        if suggestions.is_empty() {
            suggestions.push("Code looks good overall.");
        }

        let quality_score = (10.0 - (complexity_penalty + issue_penalty)).clamp(0.0, 10.0);
        state.insert(keys::SUGGESTIONS, json!(suggestions));
        state.insert(keys::QUALITY_SCORE, json!(quality_score));
        Ok(state)
    }
}

/// Steers the loop-back edge: `continue` below the quality threshold,
/// `stop` at or above it.
pub struct QualityLoopCheck;

#[async_trait]
impl Tool for QualityLoopCheck {
    async fn apply(&self, mut state: WorkflowState) -> Result<WorkflowState, ToolError> {
        let threshold = state
            .f64_value(keys::QUALITY_THRESHOLD)
            .unwrap_or(DEFAULT_QUALITY_THRESHOLD);
        let quality = state.f64_value(keys::QUALITY_SCORE).unwrap_or(0.0);
        let branch = if quality < threshold { "continue" } else { "stop" };
        state.insert(keys::BRANCH_KEY, json!(branch));
        Ok(state)
    }
}

/// Registry holding every builtin tool under its canonical name.
#[must_use]
pub fn builtin_registry() -> ToolRegistry {
    ToolRegistry::new()
        .register("extract_functions", ExtractFunctions)
        .register("check_complexity", CheckComplexity)
        .register("detect_issues", DetectIssues)
        .register("suggest_improvements", SuggestImprovements)
        .register("check_quality_loop_condition", QualityLoopCheck)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_code(code: &str) -> WorkflowState {
        WorkflowState::builder()
            .with_value(keys::CODE, json!(code))
            .build()
    }

    #[tokio::test]
    async fn extract_functions_finds_defs() {
        let state = ExtractFunctions
            .apply(state_with_code("def a():\n    pass\n\ndef b():\n    pass"))
            .await
            .unwrap();
        assert_eq!(state.f64_value(keys::FUNCTION_COUNT), Some(2.0));
        assert_eq!(
            state.get(keys::FUNCTIONS).unwrap(),
            &json!(["def a():", "def b():"])
        );
    }

    #[tokio::test]
    async fn complexity_is_capped_at_ten() {
        let long_code = "x = 1\n".repeat(250);
        let state = CheckComplexity
            .apply(state_with_code(&long_code))
            .await
            .unwrap();
        assert_eq!(state.f64_value(keys::COMPLEXITY_SCORE), Some(10.0));
        assert_eq!(state.str_value(keys::COMPLEXITY_LEVEL), Some("high"));
    }

    #[tokio::test]
    async fn detect_issues_counts_todos() {
        let state = DetectIssues
            .apply(state_with_code("# TODO: one\n# TODO: two\nx = 1"))
            .await
            .unwrap();
        assert_eq!(state.f64_value(keys::ISSUES), Some(2.0));
    }

    #[tokio::test]
    async fn clean_code_gets_a_single_suggestion() {
        let mut state = WorkflowState::new();
        state.insert(keys::COMPLEXITY_SCORE, json!(0.2));
        state.insert(keys::ISSUES, json!(0));
        let state = SuggestImprovements.apply(state).await.unwrap();
        assert_eq!(
            state.get(keys::SUGGESTIONS).unwrap(),
            &json!(["Code looks good overall."])
        );
        let quality = state.f64_value(keys::QUALITY_SCORE).unwrap();
        assert!((quality - 9.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn quality_score_never_goes_negative() {
        let mut state = WorkflowState::new();
        state.insert(keys::COMPLEXITY_SCORE, json!(10.0));
        state.insert(keys::ISSUES, json!(7));
        let state = SuggestImprovements.apply(state).await.unwrap();
        assert_eq!(state.f64_value(keys::QUALITY_SCORE), Some(0.0));
    }

    #[tokio::test]
    async fn loop_check_uses_default_threshold() {
        let mut state = WorkflowState::new();
        state.insert(keys::QUALITY_SCORE, json!(9.5));
        let state = QualityLoopCheck.apply(state).await.unwrap();
        assert_eq!(state.branch_value(), Some("stop"));

        let mut state = WorkflowState::new();
        state.insert(keys::QUALITY_SCORE, json!(3.0));
        let state = QualityLoopCheck.apply(state).await.unwrap();
        assert_eq!(state.branch_value(), Some("continue"));
    }

    #[test]
    fn builtin_registry_covers_all_tools() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), 5);
        for name in [
            "extract_functions",
            "check_complexity",
            "detect_issues",
            "suggest_improvements",
            "check_quality_loop_condition",
        ] {
            assert!(registry.lookup(name).is_some(), "missing builtin: {name}");
        }
    }
}

//! Shared state flowing through the orchestration graph.

use serde::{Deserialize, Serialize};

/// Named steps of the orchestration graph.
///
/// Each step maps to one node function; `Done` is the terminal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    GenerateInitial,
    CheckUncertainty,
    Retrieve,
    EvaluateContext,
    WebSearch,
    GenerateFinal,
    Done,
}

impl Step {
    /// Step name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::GenerateInitial => "generate_initial",
            Step::CheckUncertainty => "check_uncertainty",
            Step::Retrieve => "retrieve",
            Step::EvaluateContext => "evaluate_context",
            Step::WebSearch => "web_search",
            Step::GenerateFinal => "generate_final",
            Step::Done => "done",
        }
    }
}

/// Mutable record shared by all graph nodes for one question.
///
/// Created at request start, mutated additively by each node (fields are
/// filled in, never retracted), and discarded after the terminal node.
/// `answer` is only meaningful after a generation node has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorState {
    /// The user's question
    pub question: String,

    /// Retrieved and search-derived context snippets, in arrival order
    pub context: Vec<String>,

    /// Generated answer text
    pub answer: String,

    /// Routing hint set by decision nodes
    pub next_step: Step,
}

impl TutorState {
    /// Create fresh state for a question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: Vec::new(),
            answer: String::new(),
            next_step: Step::GenerateInitial,
        }
    }

    /// Join the context snippets into one prompt block.
    pub fn context_block(&self) -> String {
        self.context.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = TutorState::new("What is 2+2?");
        assert_eq!(state.question, "What is 2+2?");
        assert!(state.context.is_empty());
        assert!(state.answer.is_empty());
        assert_eq!(state.next_step, Step::GenerateInitial);
    }

    #[test]
    fn test_context_block_joins_snippets() {
        let mut state = TutorState::new("q");
        state.context.push("first".to_string());
        state.context.push("second".to_string());
        assert_eq!(state.context_block(), "first\n\nsecond");
    }

    #[test]
    fn test_step_names() {
        assert_eq!(Step::WebSearch.as_str(), "web_search");
        assert_eq!(Step::Done.as_str(), "done");
    }
}

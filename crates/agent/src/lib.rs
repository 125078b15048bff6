//! Orchestration for the Math Tutor Agent.
//!
//! The agent answers a math question by running a small directed graph:
//! generate an initial answer, check it for uncertainty markers, retrieve
//! from the local knowledge base, evaluate whether the retrieved context is
//! sufficient, optionally fall back to a restricted web search, and generate
//! the final answer. Input and output guardrails wrap the whole run.

pub mod graph;
pub mod guardrails;
pub mod heuristics;
pub mod prompts;
pub mod state;

pub use graph::{MathAgent, MathAgentBuilder};
pub use guardrails::{check_input, check_output, OFF_TOPIC_MESSAGE, REFUSAL_MESSAGE};
pub use state::{Step, TutorState};

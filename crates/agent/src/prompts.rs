//! Prompt templates and answer post-processing.

/// System prompt for both generation nodes.
///
/// The sentinel phrases ("I don't know.", "information not provided",
/// "Let's search the web") are load-bearing: the uncertainty check routes
/// on them, so they must stay in sync with `heuristics`.
pub const SYSTEM_PROMPT: &str = "\
You are an expert mathematics tutor.

- If the user greets you (e.g. \"hi\"), greet back briefly.
- If you do not know the answer, say so.
- If the question is not math-related, respond exactly: \"I don't know.\" and STOP.
- If essential information is missing, respond exactly: \"information not provided\" and STOP.
- If the question needs real-time or external information, respond exactly: \"Let's search the web\" and STOP.
- If the user explicitly asks to search the web, respond exactly: \"Let's search the web\" and STOP.
- If you can solve the problem (algebra, calculus, equations, geometry, etc.), give a clear step-by-step solution, then a final boxed result like: **Final Answer:** boxed{...}.
- Use precise, formal math language. Do not guess or hallucinate.
";

/// Marker the model is asked to echo before the worked solution.
pub const STEPS_MARKER: &str = "Answer step-by-step:";

/// Build the user message for a generation node.
///
/// With no context the question goes through alone; with context the
/// snippets are prepended so the model conditions on them.
pub fn build_user_prompt(question: &str, context: &str) -> String {
    if context.is_empty() {
        format!("User's Question: {}\n\n{}", question, STEPS_MARKER)
    } else {
        format!(
            "Context:\n{}\n\nUser's Question: {}\n\n{}",
            context, question, STEPS_MARKER
        )
    }
}

/// Strip an echoed prompt prefix from generated text.
///
/// Some models repeat the prompt up to and including the steps marker;
/// everything before the last marker occurrence is dropped.
pub fn extract_steps(text: &str) -> String {
    match text.rfind(STEPS_MARKER) {
        Some(idx) => text[idx + STEPS_MARKER.len()..].trim().to_string(),
        None => text.trim().to_string(),
    }
}

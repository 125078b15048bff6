//! Input and output guardrails.
//!
//! The input guard keeps the agent on mathematics; the output guard is a
//! last-line safety check on generated text. Both are plain heuristics, not
//! classifiers: substring and token matching against small term lists.

use mathtutor_core::{AppError, AppResult};

/// Canned reply when the input guard rejects a question.
pub const OFF_TOPIC_MESSAGE: &str =
    "This assistant only handles mathematics questions. Please provide a math-related query.";

/// Canned reply when the output guard rejects a generated answer.
pub const REFUSAL_MESSAGE: &str =
    "The generated answer did not meet safety requirements. Please rephrase the question.";

/// Terms that fail both guards outright.
const UNSAFE_TERMS: &[&str] = &[
    "build a bomb",
    "make a weapon",
    "synthesize drugs",
    "hack into",
    "credit card numbers",
    "hurt someone",
];

/// Words that mark a question as plausibly mathematical.
const MATH_KEYWORDS: &[&str] = &[
    "solve", "equation", "derivative", "integral", "limit", "fraction", "algebra", "geometry",
    "calculus", "matrix", "vector", "probability", "percent", "prime", "factor", "theorem",
    "angle", "triangle", "circle", "polynomial", "logarithm", "exponent", "root", "graph",
    "function", "sum", "product", "mean", "median", "ratio", "proportion", "sequence", "series",
    "calculate", "compute", "simplify", "evaluate", "proof", "prove", "math",
];

/// Short greetings pass through; the system prompt handles them.
const GREETINGS: &[&str] = &["hi", "hello", "hey", "good morning", "good afternoon", "thanks"];

/// Validate a user question before it reaches the pipeline.
///
/// Accepts greetings, anything containing digits or math symbols, and
/// anything mentioning a math keyword. Everything else is rejected as
/// off-topic; unsafe phrasing is rejected regardless.
pub fn check_input(question: &str) -> AppResult<String> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(AppError::Guard("Question cannot be empty".to_string()));
    }

    let lower = trimmed.to_lowercase();

    if UNSAFE_TERMS.iter().any(|term| lower.contains(term)) {
        return Err(AppError::Guard("Unsafe input".to_string()));
    }

    if GREETINGS.iter().any(|g| lower == *g || lower == format!("{}!", g)) {
        return Ok(trimmed.to_string());
    }

    let has_math_symbols = trimmed
        .chars()
        .any(|c| c.is_ascii_digit() || "+-*/=^%√∑∫π<>".contains(c));

    let has_math_keyword = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| MATH_KEYWORDS.contains(&word));

    if has_math_symbols || has_math_keyword {
        Ok(trimmed.to_string())
    } else {
        Err(AppError::Guard("Input is not math-related".to_string()))
    }
}

/// Validate a generated answer before it reaches the user.
///
/// Returns the answer unchanged when it passes; the caller substitutes
/// `REFUSAL_MESSAGE` on failure.
pub fn check_output(answer: &str) -> AppResult<()> {
    let lower = answer.to_lowercase();

    if UNSAFE_TERMS.iter().any(|term| lower.contains(term)) {
        return Err(AppError::Guard("Unsafe output".to_string()));
    }

    Ok(())
}

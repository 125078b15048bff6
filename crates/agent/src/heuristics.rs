//! Routing heuristics for the orchestration graph.
//!
//! Two decision predicates drive the conditional edges: substring matching
//! on the generated answer (uncertainty markers) and word-set intersection
//! between the question and the retrieved context (sufficiency).

use std::collections::HashSet;

/// Answer substrings that mean the model wants external help.
const UNCERTAINTY_MARKERS: &[&str] = &[
    "let's search the web",
    "i don't know",
    "information not provided",
];

/// Minimum share of question words that must appear in the context for it
/// to count as sufficient.
const MIN_OVERLAP_RATIO: f32 = 0.5;

const STOP_WORDS: &[&str] = &[
    "the", "is", "are", "was", "were", "for", "and", "of", "to", "in", "a", "an", "what", "how",
    "why", "who", "does", "do", "can", "you", "please", "find", "with", "that", "this",
];

/// Check whether a generated answer carries an uncertainty marker.
///
/// Matches case-insensitively anywhere in the text: models often wrap the
/// sentinel phrase in extra prose.
pub fn is_uncertain(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    UNCERTAINTY_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Decide whether retrieved context is sufficient to answer the question.
///
/// Counts how many content words of the question appear in the context; the
/// context is sufficient when at least half of them do. Empty context is
/// never sufficient.
pub fn context_sufficient(question: &str, context: &str) -> bool {
    if context.trim().is_empty() {
        return false;
    }

    let question_words = content_words(question);
    if question_words.is_empty() {
        // Nothing to match against; give the context the benefit of the doubt
        return true;
    }

    let context_words = content_words(context);
    let overlap = question_words.intersection(&context_words).count();
    let ratio = overlap as f32 / question_words.len() as f32;

    tracing::debug!(
        "Context overlap: {}/{} question words ({:.2})",
        overlap,
        question_words.len(),
        ratio
    );

    ratio >= MIN_OVERLAP_RATIO
}

/// Lowercased content words of a text (stop words and single chars removed).
fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 1 && !STOP_WORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}

//! Web search integration for the Math Tutor Agent.
//!
//! Wraps the Tavily search API, restricted to an allow-list of
//! math-education domains, and formats raw hits into readable context
//! snippets filtered by relevance score.

pub mod client;
pub mod format;

pub use client::{SearchClient, SearchHit, TavilyClient, ALLOWED_DOMAINS};
pub use format::format_results;

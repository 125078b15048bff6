//! Search result formatting.
//!
//! Turns raw search hits into readable context snippets. Hits below the
//! relevance cutoff are dropped and long content is truncated.

use crate::client::SearchHit;

/// Maximum characters of hit content kept in a snippet.
const MAX_CONTENT_LEN: usize = 500;

/// Convert search hits into readable context snippets.
///
/// Only hits with `score >= min_score` are kept. Each snippet carries the
/// hit title, up to 500 characters of content, and the source URL. Returns
/// an empty vector when nothing passes the cutoff.
pub fn format_results(hits: &[SearchHit], min_score: f32) -> Vec<String> {
    hits.iter()
        .filter(|hit| hit.score >= min_score)
        .map(|hit| {
            let title = if hit.title.is_empty() {
                "Untitled"
            } else {
                &hit.title
            };
            let snippet = truncate_content(hit.content.trim(), MAX_CONTENT_LEN);
            format!("### {}\n{}\n(Source: {})", title, snippet, hit.url)
        })
        .collect()
}

/// Truncate content to `max_len` characters, appending an ellipsis.
fn truncate_content(content: &str, max_len: usize) -> String {
    if content.chars().count() <= max_len {
        return content.to_string();
    }
    let truncated: String = content.chars().take(max_len).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, content: &str, score: f32) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            url: format!("https://example.org/{}", title),
            content: content.to_string(),
            score,
        }
    }

    #[test]
    fn test_filters_below_cutoff() {
        let hits = vec![
            hit("good", "relevant content", 0.9),
            hit("borderline", "just enough", 0.75),
            hit("bad", "irrelevant", 0.5),
        ];

        let formatted = format_results(&hits, 0.75);
        assert_eq!(formatted.len(), 2);
        assert!(formatted[0].contains("### good"));
        assert!(formatted[1].contains("### borderline"));
    }

    #[test]
    fn test_truncates_long_content() {
        let long_content = "x".repeat(800);
        let hits = vec![hit("long", &long_content, 0.9)];

        let formatted = format_results(&hits, 0.75);
        assert_eq!(formatted.len(), 1);
        assert!(formatted[0].contains(&format!("{}...", "x".repeat(500))));
        assert!(!formatted[0].contains(&"x".repeat(501)));
    }

    #[test]
    fn test_short_content_untouched() {
        let hits = vec![hit("short", "brief note", 0.8)];
        let formatted = format_results(&hits, 0.75);
        assert!(formatted[0].contains("brief note"));
        assert!(!formatted[0].contains("brief note..."));
    }

    #[test]
    fn test_snippet_layout() {
        let hits = vec![hit("Derivatives", "The power rule states...", 0.9)];
        let formatted = format_results(&hits, 0.75);

        let snippet = &formatted[0];
        assert!(snippet.starts_with("### Derivatives\n"));
        assert!(snippet.ends_with("(Source: https://example.org/Derivatives)"));
    }

    #[test]
    fn test_untitled_fallback() {
        let hits = vec![SearchHit {
            title: String::new(),
            url: "https://example.org".to_string(),
            content: "c".to_string(),
            score: 0.9,
        }];

        let formatted = format_results(&hits, 0.75);
        assert!(formatted[0].starts_with("### Untitled"));
    }

    #[test]
    fn test_empty_when_nothing_passes() {
        let hits = vec![hit("weak", "c", 0.2)];
        assert!(format_results(&hits, 0.75).is_empty());
    }
}

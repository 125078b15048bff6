//! Text chunking with configurable size and overlap.

use crate::types::ChunkCandidate;

/// Chunk text into overlapping segments.
///
/// Splits on character counts but backs up to the nearest whitespace so
/// chunks never cut a word (or a UTF-8 code point) in half. Overlap carries
/// the tail of each chunk into the next so solution steps that straddle a
/// boundary stay retrievable.
pub fn chunk_text(
    document_id: &str,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<ChunkCandidate> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if text.len() <= chunk_size {
        return vec![ChunkCandidate {
            document_id: document_id.to_string(),
            position: 0,
            text: text.to_string(),
        }];
    }

    let overlap = chunk_overlap.min(chunk_size / 2);
    let mut candidates = Vec::new();
    let mut start = 0usize;
    let mut position = 0u32;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());

        // Back up to a char boundary, then to a word boundary if one is near
        while end < text.len() && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end < text.len() {
            if let Some(space) = text[start..end].rfind(char::is_whitespace) {
                if space > chunk_size / 2 {
                    end = start + space;
                }
            }
        }

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            candidates.push(ChunkCandidate {
                document_id: document_id.to_string(),
                position,
                text: piece.to_string(),
            });
            position += 1;
        }

        if end >= text.len() {
            break;
        }

        let mut next = end.saturating_sub(overlap).max(start + 1);
        while !text.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("doc1", "Solve for x: 2x = 8", 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[0].text, "Solve for x: 2x = 8");
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(chunk_text("doc1", "   ", 1000, 200).is_empty());
    }

    #[test]
    fn test_long_text_overlapping_chunks() {
        let text = "word ".repeat(200); // 1000 chars
        let chunks = chunk_text("doc1", &text, 300, 60);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.position, i as u32);
            assert!(chunk.text.len() <= 300);
        }
    }

    #[test]
    fn test_chunks_do_not_split_words() {
        let text = "alpha beta gamma delta epsilon zeta ".repeat(30);
        let chunks = chunk_text("doc1", &text, 100, 20);

        let words = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"];
        for chunk in &chunks {
            for word in chunk.text.split_whitespace() {
                assert!(words.contains(&word), "split word: {}", word);
            }
        }
    }

    #[test]
    fn test_utf8_boundaries_respected() {
        let text = "π² ≈ 9.87, and ∑ notation appears often. ".repeat(20);
        // Must not panic on multi-byte boundaries
        let chunks = chunk_text("doc1", &text, 64, 16);
        assert!(!chunks.is_empty());
    }
}

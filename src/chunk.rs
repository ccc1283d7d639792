//! Overlapping character-window text splitter.
//!
//! Splits document text into windows of at most `chunk_size` characters,
//! carrying the last `chunk_overlap` characters of each window into the
//! next. Cuts prefer natural boundaries in descending strength (paragraph
//! break, line break, sentence end, word gap) before falling back to a hard
//! split at the window edge.
//!
//! Chunks are exact, contiguous slices of the input: concatenating them
//! with the overlap removed reproduces the original text.

/// Boundary preference, strongest first. The separator stays with the
/// chunk to its left.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Split `text` into overlapping windows of at most `chunk_size` characters.
///
/// Returns no chunks for empty or whitespace-only input. `chunk_overlap`
/// must be smaller than `chunk_size`; it is clamped if not.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.trim().is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let chunk_overlap = chunk_overlap.min(chunk_size - 1);

    if text.chars().count() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = advance(text, start, chunk_size);
        if end == text.len() {
            chunks.push(text[start..].to_string());
            break;
        }

        let window = &text[start..end];
        // The cut must clear the carried overlap so the next window
        // strictly advances.
        let min_cut = advance(text, start, chunk_overlap + 1) - start;
        let mut cut = end;
        for sep in SEPARATORS {
            if let Some(pos) = window.rfind(sep) {
                let candidate = pos + sep.len();
                if candidate >= min_cut {
                    cut = start + candidate;
                    break;
                }
            }
        }

        chunks.push(text[start..cut].to_string());
        start = retreat(text, cut, chunk_overlap);
    }

    chunks
}

/// Byte offset `chars` characters past `byte_pos`, clamped to the end.
fn advance(text: &str, byte_pos: usize, chars: usize) -> usize {
    text[byte_pos..]
        .char_indices()
        .nth(chars)
        .map(|(i, _)| byte_pos + i)
        .unwrap_or(text.len())
}

/// Byte offset `chars` characters before `byte_pos`, clamped to the start.
fn retreat(text: &str, byte_pos: usize, chars: usize) -> usize {
    if chars == 0 {
        return byte_pos;
    }
    text[..byte_pos]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_single_chunk() {
        let chunks = split_text("Hello, world!", 700, 50);
        assert_eq!(chunks, vec!["Hello, world!".to_string()]);
    }

    #[test]
    fn empty_text_no_chunks() {
        assert!(split_text("", 700, 50).is_empty());
        assert!(split_text("   \n\n  ", 700, 50).is_empty());
    }

    #[test]
    fn consecutive_chunks_share_exactly_the_overlap() {
        let text = "word ".repeat(100);
        let overlap = 10;
        let chunks = split_text(&text, 60, overlap);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = {
                let prev: Vec<char> = pair[0].chars().collect();
                prev[prev.len() - overlap..].iter().collect()
            };
            assert!(
                pair[1].starts_with(&tail),
                "chunk does not start with the previous chunk's tail: {:?} vs {:?}",
                tail,
                &pair[1]
            );
        }
    }

    #[test]
    fn reassembly_with_overlap_stripped_reproduces_text() {
        let text = "Alpha beta gamma.\n\nDelta epsilon zeta eta theta.\n\nIota kappa lambda mu nu xi omicron pi rho sigma tau.";
        let overlap = 8;
        let chunks = split_text(text, 30, overlap);
        assert!(chunks.len() > 1);
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(overlap));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn prefers_paragraph_boundary_over_hard_cut() {
        let text = format!("{}\n\n{}", "a".repeat(40), "b".repeat(40));
        let chunks = split_text(&text, 60, 5);
        assert!(chunks[0].ends_with("\n\n"));
    }

    #[test]
    fn every_chunk_respects_the_size_limit() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(50);
        for chunk in split_text(&text, 100, 20) {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn deterministic() {
        let text = "Some document text. ".repeat(40);
        assert_eq!(split_text(&text, 80, 10), split_text(&text, 80, 10));
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "héllo wörld çafé ".repeat(30);
        let chunks = split_text(&text, 40, 8);
        assert!(chunks.len() > 1);
        // Slicing on a non-boundary would have panicked already; verify
        // content survives reassembly too.
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(8));
        }
        assert_eq!(rebuilt, text);
    }
}

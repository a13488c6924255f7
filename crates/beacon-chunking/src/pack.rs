use crate::block::block_char_len as char_len;
use crate::config::ChunkingConfig;

/// Packs a section's block pieces into chunks of at most `max_chars`,
/// separated by `"\n\n"`, seeding each new chunk with the trailing overlap
/// of the one it follows (§4.1 "Section packing").
pub fn pack_section(pieces: Vec<String>, config: &ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut running = String::new();

    for piece in pieces {
        if running.is_empty() {
            running = piece;
            continue;
        }

        let candidate_len = char_len(&running) + 2 + char_len(&piece);
        if candidate_len <= config.max_chars {
            running.push_str("\n\n");
            running.push_str(&piece);
            continue;
        }

        let emitted = std::mem::replace(&mut running, String::new());
        let tail = trailing_chars(emitted.trim(), config.overlap_chars);
        chunks.push(emitted);

        if !tail.is_empty() {
            let seeded_len = char_len(&tail) + 2 + char_len(&piece);
            if seeded_len <= config.max_chars {
                running = format!("{tail}\n\n{piece}");
                continue;
            }
        }
        running = piece;
    }

    if !running.is_empty() {
        chunks.push(running);
    }
    chunks
}

fn trailing_chars(s: &str, n: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let start = chars.len().saturating_sub(n);
    chars[start..].iter().collect()
}

/// Merges any chunk (other than the first in the page) shorter than
/// `min_chars` into its predecessor, provided the combined length still
/// fits `max_chars` (§4.1 "Tail merge").
pub fn tail_merge(chunks: Vec<String>, config: &ChunkingConfig) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for (i, piece) in chunks.into_iter().enumerate() {
        if i > 0 {
            if let Some(last) = merged.last_mut() {
                if char_len(&piece) < config.min_chars
                    && char_len(last) + 2 + char_len(&piece) <= config.max_chars
                {
                    last.push_str("\n\n");
                    last.push_str(&piece);
                    continue;
                }
            }
        }
        merged.push(piece);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn config() -> ChunkingConfig {
        ChunkingConfig {
            max_chars: 40,
            overlap_chars: 10,
            min_chars: 15,
            heading_path_depth: 4,
            dont_split_inside: HashSet::new(),
        }
    }

    #[test]
    fn packs_pieces_until_overflow() {
        let pieces = vec!["a".repeat(20), "b".repeat(15)];
        let chunks = pack_section(pieces, &config());
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn seeds_next_chunk_with_trailing_overlap() {
        let pieces = vec!["a".repeat(38), "b".repeat(10)];
        let chunks = pack_section(pieces, &config());
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].starts_with('a'));
    }

    #[test]
    fn tail_merge_combines_undersized_chunk_with_previous() {
        let chunks = vec!["a".repeat(30), "b".repeat(5)];
        let merged = tail_merge(chunks, &config());
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn tail_merge_skips_when_combined_exceeds_max_chars() {
        let chunks = vec!["a".repeat(35), "b".repeat(10)];
        let merged = tail_merge(chunks, &config());
        assert_eq!(merged.len(), 2);
    }
}

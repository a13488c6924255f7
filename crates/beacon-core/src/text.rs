/// Text normalization (C3): collapse whitespace, strip control characters,
/// and produce search-result snippets.

/// Collapse runs of whitespace to single spaces, strip ASCII control
/// characters (other than the newline itself, which callers that need line
/// structure should normalize line-by-line instead), and trim.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_control() && ch != '\n' && ch != '\t' {
            continue;
        }
        let is_space = ch.is_whitespace();
        if is_space {
            if last_was_space {
                continue;
            }
            out.push(' ');
        } else {
            out.push(ch);
        }
        last_was_space = is_space;
    }
    out.trim().to_string()
}

/// First ~`max_chars` characters of `normalize(text)`, trimmed to the last
/// word boundary, with a trailing ellipsis if truncated. Used for
/// `Chunk.snippet` (§3, default `max_chars = 180`).
pub fn snippet(text: &str, max_chars: usize) -> String {
    let normalized = normalize(text);
    if normalized.chars().count() <= max_chars {
        return normalized;
    }

    let truncated: String = normalized.chars().take(max_chars).collect();
    let boundary = truncated.rfind(' ').unwrap_or(truncated.len());
    let trimmed = truncated[..boundary].trim_end();
    format!("{trimmed}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_controls() {
        assert_eq!(normalize("a   b\t\tc"), "a b c");
        assert_eq!(normalize("a\u{0007}b"), "ab");
        assert_eq!(normalize("  leading and trailing  "), "leading and trailing");
    }

    #[test]
    fn snippet_short_text_unchanged() {
        assert_eq!(snippet("short text", 180), "short text");
    }

    #[test]
    fn snippet_truncates_at_word_boundary() {
        let long = "word ".repeat(100);
        let s = snippet(&long, 20);
        assert!(s.ends_with('…'));
        assert!(!s.trim_end_matches('…').ends_with(' '));
        assert!(s.chars().count() <= 21);
    }
}

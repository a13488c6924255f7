use crate::config::{ChunkingConfig, ProtectedKind};

/// A contiguous piece of a section: either ordinary text, or a fenced
/// code/table/blockquote run that should not be split when protected.
pub struct Block {
    pub text: String,
    pub protected: bool,
}

#[derive(PartialEq)]
enum Kind {
    Text,
    Table,
    Quote,
    Fence,
}

struct Building {
    kind: Kind,
    lines: Vec<String>,
}

fn is_fence_toggle(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

fn is_table_separator(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    let inner = s.trim_start_matches('|').trim_end_matches('|');
    if inner.is_empty() {
        return false;
    }
    inner.split('|').all(|cell| {
        let c = cell.trim();
        !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':') && c.contains('-')
    })
}

fn is_table_row(line: &str) -> bool {
    let t = line.trim();
    (t.starts_with('|') && t.ends_with('|') && t.len() >= 2) || is_table_separator(t)
}

fn flush(building: &mut Option<Building>, blocks: &mut Vec<Block>, config: &ChunkingConfig) {
    if let Some(b) = building.take() {
        if b.lines.is_empty() {
            return;
        }
        let protected = match b.kind {
            Kind::Fence => config.protects(ProtectedKind::Code),
            Kind::Table => config.protects(ProtectedKind::Table),
            Kind::Quote => config.protects(ProtectedKind::Blockquote),
            Kind::Text => false,
        };
        blocks.push(Block { text: b.lines.join("\n"), protected });
    }
}

/// Walks a section's lines and groups them into [`Block`]s, per §4.1
/// "Block splitting within a section".
pub fn blockify(lines: &[String], config: &ChunkingConfig) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut building: Option<Building> = None;

    for line in lines {
        if is_fence_toggle(line) {
            match &mut building {
                Some(b) if b.kind == Kind::Fence => {
                    b.lines.push(line.clone());
                    flush(&mut building, &mut blocks, config);
                }
                _ => {
                    flush(&mut building, &mut blocks, config);
                    building = Some(Building { kind: Kind::Fence, lines: vec![line.clone()] });
                }
            }
            continue;
        }

        if let Some(b) = &mut building {
            if b.kind == Kind::Fence {
                b.lines.push(line.clone());
                continue;
            }
        }

        if line.trim().is_empty() {
            flush(&mut building, &mut blocks, config);
            continue;
        }

        if config.protects(ProtectedKind::Table) && is_table_row(line) {
            match &mut building {
                Some(b) if b.kind == Kind::Table => b.lines.push(line.clone()),
                _ => {
                    flush(&mut building, &mut blocks, config);
                    building = Some(Building { kind: Kind::Table, lines: vec![line.clone()] });
                }
            }
            continue;
        }
        if let Some(b) = &building {
            if b.kind == Kind::Table {
                flush(&mut building, &mut blocks, config);
            }
        }

        if config.protects(ProtectedKind::Blockquote) && line.trim_start().starts_with('>') {
            match &mut building {
                Some(b) if b.kind == Kind::Quote => b.lines.push(line.clone()),
                _ => {
                    flush(&mut building, &mut blocks, config);
                    building = Some(Building { kind: Kind::Quote, lines: vec![line.clone()] });
                }
            }
            continue;
        }
        if let Some(b) = &building {
            if b.kind == Kind::Quote {
                flush(&mut building, &mut blocks, config);
            }
        }

        match &mut building {
            Some(b) if b.kind == Kind::Text => b.lines.push(line.clone()),
            _ => {
                flush(&mut building, &mut blocks, config);
                building = Some(Building { kind: Kind::Text, lines: vec![line.clone()] });
            }
        }
    }
    flush(&mut building, &mut blocks, config);
    blocks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Splits an unprotected oversized block into greedy windows of at most
/// `max_chars`, preferring the last space boundary past the 0.6 threshold,
/// with forward progress guaranteed even when `overlap_chars >= max_chars`.
pub fn split_oversized(text: &str, max_chars: usize, overlap_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len <= max_chars || max_chars == 0 {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    while start < len {
        let tentative_end = (start + max_chars).min(len);
        let mut end = tentative_end;
        if tentative_end < len {
            let threshold = start + ((max_chars as f64) * 0.6) as usize;
            let mut cursor = tentative_end;
            while cursor > threshold && cursor > start {
                cursor -= 1;
                if chars[cursor].is_whitespace() {
                    end = cursor;
                    break;
                }
            }
        }
        if end <= start {
            end = tentative_end;
        }
        pieces.push(chars[start..end].iter().collect::<String>());
        if end >= len {
            break;
        }
        let next_start = end
            .saturating_sub(overlap_chars)
            .max(end.saturating_sub(max_chars.saturating_sub(1)));
        start = next_start.max(start + 1);
    }
    pieces
}

pub(crate) fn block_char_len(text: &str) -> usize {
    char_len(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn config(protected: &[ProtectedKind]) -> ChunkingConfig {
        ChunkingConfig {
            max_chars: 40,
            overlap_chars: 10,
            min_chars: 10,
            heading_path_depth: 4,
            dont_split_inside: protected.iter().copied().collect::<HashSet<_>>(),
        }
    }

    #[test]
    fn fenced_code_block_is_protected() {
        let lines: Vec<String> = vec!["```js".into(), "LINE1".into(), "LINE2".into(), "```".into()];
        let blocks = blockify(&lines, &config(&[ProtectedKind::Code]));
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].protected);
        assert!(blocks[0].text.contains("LINE1") && blocks[0].text.contains("LINE2"));
    }

    #[test]
    fn table_rows_group_into_one_block() {
        let lines: Vec<String> = vec!["| a | b |".into(), "|---|---|".into(), "| 1 | 2 |".into()];
        let blocks = blockify(&lines, &config(&[ProtectedKind::Table]));
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].protected);
    }

    #[test]
    fn empty_line_flushes_current_block() {
        let lines: Vec<String> = vec!["para one".into(), "".into(), "para two".into()];
        let blocks = blockify(&lines, &config(&[]));
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn oversized_text_splits_on_space_boundary() {
        let text = "word ".repeat(20); // 100 chars
        let pieces = split_oversized(&text, 40, 10);
        assert!(pieces.len() > 1);
        for p in &pieces[..pieces.len() - 1] {
            assert!(char_len(p) <= 40);
        }
    }

    #[test]
    fn split_terminates_when_overlap_exceeds_max_chars() {
        let text = "x".repeat(500);
        let pieces = split_oversized(&text, 40, 1000);
        assert!(!pieces.is_empty());
        let joined_min_progress = pieces.len() >= 500 / 40;
        assert!(joined_min_progress);
    }
}

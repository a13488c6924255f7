mod block;
mod config;
mod pack;
mod section;

pub use config::{ChunkingConfig, ProtectedKind};

use beacon_core::model::{Chunk, IndexedPage};

const SNIPPET_MAX_CHARS: usize = 180;

struct ChunkDraft {
    heading_path: Vec<String>,
    section_title: Option<String>,
    text: String,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Turns an indexed page into its ordered list of chunks (§4.1). Never
/// fails: empty or whitespace-only markdown yields an empty list.
pub fn chunk_page(page: &IndexedPage, config: &ChunkingConfig) -> Vec<Chunk> {
    let sections = section::sectionize(&page.markdown, config.heading_path_depth);

    let mut drafts: Vec<ChunkDraft> = Vec::new();
    for section in sections {
        let blocks = block::blockify(&section.lines, config);
        let mut pieces: Vec<String> = Vec::new();
        for b in blocks {
            if b.protected {
                pieces.push(b.text);
            } else {
                pieces.extend(block::split_oversized(&b.text, config.max_chars, config.overlap_chars));
            }
        }
        if pieces.is_empty() {
            continue;
        }
        for text in pack::pack_section(pieces, config) {
            drafts.push(ChunkDraft {
                heading_path: section.heading_path.clone(),
                section_title: section.section_title.clone(),
                text,
            });
        }
    }

    let drafts = tail_merge_drafts(drafts, config);

    drafts
        .into_iter()
        .enumerate()
        .map(|(ordinal, draft)| build_chunk(page, ordinal, draft))
        .collect()
}

fn tail_merge_drafts(drafts: Vec<ChunkDraft>, config: &ChunkingConfig) -> Vec<ChunkDraft> {
    let mut merged: Vec<ChunkDraft> = Vec::new();
    for (i, draft) in drafts.into_iter().enumerate() {
        if i > 0 {
            if let Some(last) = merged.last_mut() {
                if char_len(&draft.text) < config.min_chars
                    && char_len(&last.text) + 2 + char_len(&draft.text) <= config.max_chars
                {
                    last.text.push_str("\n\n");
                    last.text.push_str(&draft.text);
                    continue;
                }
            }
        }
        merged.push(draft);
    }
    merged
}

fn build_chunk(page: &IndexedPage, ordinal: usize, draft: ChunkDraft) -> Chunk {
    let chunk_key = Chunk::compute_key(&page.scope.scope_name, &page.url, ordinal, draft.section_title.as_deref());
    let content_hash = Chunk::compute_content_hash(&draft.text);
    let snippet = beacon_core::text::snippet(&draft.text, SNIPPET_MAX_CHARS);

    Chunk {
        chunk_key,
        ordinal,
        url: page.url.clone(),
        path: page.url.clone(),
        title: page.title.clone(),
        section_title: draft.section_title,
        heading_path: draft.heading_path,
        chunk_text: draft.text,
        snippet,
        depth: page.depth,
        incoming_links: page.incoming_links,
        route_file: page.route_file.clone(),
        tags: page.tags.clone(),
        content_hash,
        description: page.description.clone(),
        keywords: page.keywords.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{RouteResolution, Scope};
    use chrono::Utc;

    fn page(markdown: &str) -> IndexedPage {
        IndexedPage {
            scope: Scope::new("proj", "main"),
            url: "/docs/guide".to_string(),
            title: "Guide".to_string(),
            markdown: markdown.to_string(),
            outgoing_links: Vec::new(),
            tags: Vec::new(),
            description: None,
            keywords: None,
            weight: None,
            route_file: "/docs/guide/+page.svelte".to_string(),
            route_resolution: RouteResolution::Exact,
            generated_at: Utc::now(),
            incoming_links: 0,
            depth: 2,
        }
    }

    #[test]
    fn s1_protected_code_block_kept_whole() {
        let md = "# T\npara\n\n```js\nLINE1\nLINE2\n```\n";
        let config = ChunkingConfig {
            max_chars: 40,
            overlap_chars: 5,
            min_chars: 5,
            heading_path_depth: 4,
            dont_split_inside: [ProtectedKind::Code].into_iter().collect(),
        };
        let chunks = chunk_page(&page(md), &config);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].chunk_text.contains("LINE1"));
        assert!(chunks[0].chunk_text.contains("LINE2"));
    }

    #[test]
    fn empty_page_yields_no_chunks() {
        let chunks = chunk_page(&page(""), &ChunkingConfig::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn chunk_identity_is_stable_across_runs() {
        let md = "# Intro\nSome text about the topic.\n\n## Details\nMore details here.\n";
        let config = ChunkingConfig::default();
        let first = chunk_page(&page(md), &config);
        let second = chunk_page(&page(md), &config);
        assert_eq!(
            first.iter().map(|c| c.chunk_key.clone()).collect::<Vec<_>>(),
            second.iter().map(|c| c.chunk_key.clone()).collect::<Vec<_>>()
        );
        assert_eq!(
            first.iter().map(|c| c.content_hash.clone()).collect::<Vec<_>>(),
            second.iter().map(|c| c.content_hash.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn unprotected_chunks_respect_max_chars() {
        let md = "# Section\n".to_string() + &"word ".repeat(100);
        let config = ChunkingConfig {
            max_chars: 80,
            overlap_chars: 10,
            min_chars: 5,
            heading_path_depth: 4,
            dont_split_inside: Default::default(),
        };
        let chunks = chunk_page(&page(&md), &config);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chunk_text.chars().count() <= config.max_chars + config.overlap_chars + 2);
        }
    }
}

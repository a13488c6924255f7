/// Markdown extraction path (§4.4): frontmatter-driven noindex/weight
/// handling plus a top-level `<!-- noindex -->` comment convention for
/// content that has no frontmatter block at all.
use crate::config::ExtractOutcome;
use beacon_core::model::ExtractedPage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static FRONTMATTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---\r?\n?").unwrap());

static NOINDEX_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!--\s*noindex\s*-->").unwrap());

#[derive(Debug, Default, Deserialize)]
struct SearchsocketMeta {
    weight: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    title: Option<String>,
    #[serde(default)]
    noindex: bool,
    description: Option<String>,
    keywords: Option<Vec<String>>,
    searchsocket: Option<SearchsocketMeta>,
}

fn split_frontmatter(markdown: &str) -> (Option<Frontmatter>, &str) {
    if let Some(caps) = FRONTMATTER_RE.captures(markdown) {
        let yaml = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let body = &markdown[caps.get(0).unwrap().end()..];
        let fm: Frontmatter = serde_yaml::from_str(yaml).unwrap_or_default();
        (Some(fm), body)
    } else {
        (None, markdown)
    }
}

/// Whether a top-level `<!-- noindex -->` comment exists outside fenced code.
fn has_top_level_noindex_comment(body: &str) -> bool {
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence && NOINDEX_COMMENT_RE.is_match(line) {
            return true;
        }
    }
    false
}

pub fn extract_markdown(url: &str, raw: &str, title_override: Option<&str>) -> ExtractOutcome {
    let (frontmatter, body) = split_frontmatter(raw);

    if has_top_level_noindex_comment(body) {
        return ExtractOutcome::Dropped;
    }

    let fm = frontmatter.unwrap_or_default();
    if fm.noindex {
        return ExtractOutcome::Dropped;
    }
    if let Some(meta) = &fm.searchsocket {
        if meta.weight == Some(0.0) {
            return ExtractOutcome::Dropped;
        }
    }

    let markdown = beacon_core::text::normalize(body);
    if markdown.is_empty() {
        return ExtractOutcome::Dropped;
    }

    let title = title_override
        .map(|s| s.to_string())
        .or(fm.title)
        .unwrap_or_else(|| url.to_string());

    let weight = fm
        .searchsocket
        .as_ref()
        .and_then(|m| m.weight)
        .filter(|w| w.is_finite() && *w >= 0.0);

    ExtractOutcome::Page(ExtractedPage {
        url: url.to_string(),
        title,
        markdown,
        outgoing_links: Vec::new(),
        noindex: false,
        tags: ExtractedPage::tags_for_url(url),
        description: fm.description,
        keywords: fm.keywords,
        weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(outcome: ExtractOutcome) -> ExtractedPage {
        match outcome {
            ExtractOutcome::Page(p) => p,
            ExtractOutcome::Dropped => panic!("expected a page"),
        }
    }

    #[test]
    fn title_precedence_override_then_frontmatter_then_url() {
        let md = "---\ntitle: FM Title\n---\nbody text\n";
        let p = page(extract_markdown("/docs/x", md, Some("Override")));
        assert_eq!(p.title, "Override");

        let p = page(extract_markdown("/docs/x", md, None));
        assert_eq!(p.title, "FM Title");

        let p = page(extract_markdown("/docs/x", "no frontmatter here\n", None));
        assert_eq!(p.title, "/docs/x");
    }

    #[test]
    fn frontmatter_noindex_drops_page() {
        let md = "---\nnoindex: true\n---\nbody\n";
        assert!(matches!(extract_markdown("/docs/x", md, None), ExtractOutcome::Dropped));
    }

    #[test]
    fn top_level_noindex_comment_drops_page() {
        let md = "<!-- noindex -->\nbody text\n";
        assert!(matches!(extract_markdown("/docs/x", md, None), ExtractOutcome::Dropped));
    }

    #[test]
    fn noindex_comment_inside_fence_does_not_drop() {
        let md = "intro\n```\n<!-- noindex -->\n```\nmore text\n";
        assert!(matches!(extract_markdown("/docs/x", md, None), ExtractOutcome::Page(_)));
    }

    #[test]
    fn zero_weight_frontmatter_drops_page() {
        let md = "---\nsearchsocket:\n  weight: 0\n---\nbody\n";
        assert!(matches!(extract_markdown("/docs/x", md, None), ExtractOutcome::Dropped));
    }

    #[test]
    fn empty_body_after_normalization_drops_page() {
        let md = "---\ntitle: X\n---\n   \n";
        assert!(matches!(extract_markdown("/docs/x", md, None), ExtractOutcome::Dropped));
    }
}

/// `source.mode = content-files`: walk a directory of raw `.md` files and
/// SvelteKit-style `+page.svelte` route files, deriving a URL from the file
/// path using the same route-segment rules as the filesystem route tree
/// (§4.3).
use beacon_core::model::PageSource;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

static SCRIPT_STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<(script|style)\b[^>]*>.*?</(script|style)>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static BRACE_EXPR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").unwrap());

fn transform_segment(seg: &str) -> Option<String> {
    if seg.starts_with('(') && seg.ends_with(')') {
        None
    } else if seg.starts_with("[...") && seg.ends_with(']') {
        Some("splat".to_string())
    } else if seg.starts_with("[[") && seg.ends_with("]]") {
        Some("optional".to_string())
    } else if seg.starts_with('[') && seg.ends_with(']') {
        Some("param".to_string())
    } else {
        Some(seg.to_string())
    }
}

fn derive_url(rel_path: &Path) -> String {
    let mut segments: Vec<String> = Vec::new();
    if let Some(parent) = rel_path.parent() {
        for comp in parent.components() {
            if let Some(s) = comp.as_os_str().to_str() {
                if let Some(t) = transform_segment(s) {
                    segments.push(t);
                }
            }
        }
    }

    let stem = rel_path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    if stem != "+page" {
        if let Some(t) = transform_segment(stem) {
            if t != "index" {
                segments.push(t);
            }
        }
    }

    let url = format!("/{}", segments.join("/"));
    beacon_core::url::normalize(&url)
}

/// Strips Svelte `<script>`/`<style>` blocks, remaining tag markup, and
/// `{expr}` template syntax, then collapses whitespace.
fn strip_svelte_markup(raw: &str) -> String {
    let without_blocks = SCRIPT_STYLE_RE.replace_all(raw, "");
    let without_tags = TAG_RE.replace_all(&without_blocks, " ");
    let without_braces = BRACE_EXPR_RE.replace_all(&without_tags, "");
    beacon_core::text::normalize(&without_braces)
}

pub fn load_content_files(base_dir: &Path) -> beacon_core::Result<Vec<PageSource>> {
    let mut pages = Vec::new();

    for entry in WalkDir::new(base_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let is_markdown = path.extension().and_then(|e| e.to_str()) == Some("md");
        let is_svelte_page = file_name == "+page.svelte";
        if !is_markdown && !is_svelte_page {
            continue;
        }

        let rel_path = path.strip_prefix(base_dir).unwrap_or(path);
        let url = derive_url(rel_path);
        let file_path = path.to_string_lossy().to_string();

        let raw = match std::fs::read_to_string(path) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %file_path, error = %e, "skipping unreadable content file");
                continue;
            }
        };

        let markdown = if is_svelte_page { strip_svelte_markup(&raw) } else { raw };
        pages.push(PageSource::from_markdown(url, file_path, markdown));
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tempdir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("beacon-content-test-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn derives_url_from_dynamic_and_group_segments() {
        let dir = tempdir("a");
        fs::create_dir_all(dir.join("(marketing)/blog/[slug]")).unwrap();
        fs::write(dir.join("(marketing)/blog/[slug]/+page.svelte"), "<script>let x=1</script><p>hi {x}</p>").unwrap();

        let pages = load_content_files(&dir).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "/blog/param");
        assert!(pages[0].markdown.as_deref().unwrap().contains("hi"));
        assert!(!pages[0].markdown.as_deref().unwrap().contains("script"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn index_md_collapses_to_parent_directory() {
        let dir = tempdir("b");
        fs::create_dir_all(dir.join("docs")).unwrap();
        fs::write(dir.join("docs/index.md"), "# Docs home").unwrap();

        let pages = load_content_files(&dir).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "/docs");

        fs::remove_dir_all(&dir).ok();
    }
}

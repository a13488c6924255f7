/// URL-path canonicalization utilities (C1).
///
/// Every page in the system is addressed by a canonical path: it starts
/// with `/`, has no trailing slash (except the root `/` itself), and never
/// contains a run of repeated slashes.
/// Canonicalize a URL path per the rules above.
///
/// Idempotent: `normalize(normalize(u)) == normalize(u)` for all `u`.
pub fn normalize(path: &str) -> String {
    let trimmed = strip_fragment_and_query(path);

    let mut collapsed = String::with_capacity(trimmed.len() + 1);
    let mut prev_was_slash = false;
    for ch in trimmed.chars() {
        if ch == '/' {
            if prev_was_slash {
                continue;
            }
            prev_was_slash = true;
        } else {
            prev_was_slash = false;
        }
        collapsed.push(ch);
    }

    if !collapsed.starts_with('/') {
        collapsed.insert(0, '/');
    }

    if collapsed.len() > 1 {
        while collapsed.ends_with('/') {
            collapsed.pop();
        }
        if collapsed.is_empty() {
            collapsed.push('/');
        }
    }

    collapsed
}

fn strip_fragment_and_query(path: &str) -> &str {
    let path = path.split('#').next().unwrap_or(path);
    path
}

/// The first non-empty `/`-separated segment of a normalized path, or `None`
/// for the root. Used to derive `ExtractedPage.tags`.
pub fn first_segment(path: &str) -> Option<String> {
    let normalized = normalize(path);
    normalized
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Number of non-empty `/`-separated segments. Used for `IndexedPage.depth`.
pub fn depth(path: &str) -> usize {
    let normalized = normalize(path);
    normalized
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .count()
}

/// Whether `path` equals `prefix` (trailing-slash trimmed) or starts with
/// `prefix/`. Used by vector store path-prefix filters (§4.5).
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    let path = normalize(path);
    let mut prefix = normalize(prefix);
    if prefix != "/" {
        while prefix.ends_with('/') {
            prefix.pop();
        }
    }
    path == prefix || path.starts_with(&format!("{}/", if prefix == "/" { "" } else { &prefix }))
}

/// Map a filesystem path under `static_output_dir` to a canonical URL,
/// per the `static-output` loader's rules in §4.3:
/// strip the root prefix, drop a trailing `/index.html` to `/`, drop `.html`.
pub fn static_html_file_to_url(file_path: &str, static_output_dir: &str) -> String {
    let root = static_output_dir.trim_end_matches('/');
    let mut rel = file_path.strip_prefix(root).unwrap_or(file_path).to_string();
    if !rel.starts_with('/') {
        rel.insert(0, '/');
    }

    if let Some(stripped) = rel.strip_suffix("/index.html") {
        rel = if stripped.is_empty() {
            "/".to_string()
        } else {
            stripped.to_string()
        };
    } else if let Some(stripped) = rel.strip_suffix(".html") {
        rel = stripped.to_string();
    }

    normalize(&rel)
}

/// Resolve an `href` found on `base_url` to a canonical same-origin path, or
/// `None` if it is not an http(s) same-origin link worth following/recording.
/// `base_url` and `href` are both canonical paths already scoped to a single
/// origin (the origin itself is handled by the caller, which only passes
/// hrefs it already knows are same-origin or fully-qualified for that origin).
pub fn resolve_link(base_path: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    if href.starts_with("//") {
        return None; // protocol-relative external link, no origin context here
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        // Caller is responsible for origin-checking; we just strip scheme+host.
        let without_scheme = href.splitn(2, "://").nth(1)?;
        let path_start = without_scheme.find('/').unwrap_or(without_scheme.len());
        let path = &without_scheme[path_start..];
        return Some(normalize(if path.is_empty() { "/" } else { path }));
    }

    if href.starts_with('/') {
        return Some(normalize(href));
    }

    // Relative path: resolve against the directory of base_path, collapsing
    // "." and ".." segments.
    let normalized_base = normalize(base_path);
    let mut segments: Vec<&str> = normalized_base
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    segments.pop(); // drop the base page's own segment, keep its directory

    for part in href.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    Some(normalize(&format!("/{}", segments.join("/"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_idempotent() {
        let cases = ["/a//b/", "a/b/c", "/", "", "/foo/bar///baz/"];
        for c in cases {
            let once = normalize(c);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {c:?}");
        }
    }

    #[test]
    fn normalize_basic() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("a/b"), "/a/b");
        assert_eq!(normalize("/a/b/"), "/a/b");
        assert_eq!(normalize("/a//b///c"), "/a/b/c");
    }

    #[test]
    fn first_segment_cases() {
        assert_eq!(first_segment("/"), None);
        assert_eq!(first_segment("/docs/intro"), Some("docs".to_string()));
    }

    #[test]
    fn depth_cases() {
        assert_eq!(depth("/"), 0);
        assert_eq!(depth("/a"), 1);
        assert_eq!(depth("/a/b/c"), 3);
    }

    #[test]
    fn prefix_matching() {
        assert!(matches_prefix("/docs/intro", "/docs"));
        assert!(matches_prefix("/docs", "/docs"));
        assert!(!matches_prefix("/docsother", "/docs"));
    }

    #[test]
    fn static_file_mapping() {
        assert_eq!(
            static_html_file_to_url("/out/docs/intro/index.html", "/out"),
            "/docs/intro"
        );
        assert_eq!(static_html_file_to_url("/out/index.html", "/out"), "/");
        assert_eq!(static_html_file_to_url("/out/about.html", "/out"), "/about");
    }

    #[test]
    fn resolve_link_cases() {
        assert_eq!(
            resolve_link("/docs/intro", "../guide"),
            Some("/guide".to_string())
        );
        assert_eq!(
            resolve_link("/docs/intro", "./sibling"),
            Some("/docs/sibling".to_string())
        );
        assert_eq!(
            resolve_link("/docs/intro", "/other"),
            Some("/other".to_string())
        );
        assert_eq!(resolve_link("/docs/intro", "#section"), None);
        assert_eq!(resolve_link("/docs/intro", "mailto:a@b.com"), None);
        assert_eq!(
            resolve_link("/docs/intro", "https://example.com/x/y"),
            Some("/x/y".to_string())
        );
    }
}

/// `source.mode = build`: discover pages by crawling a running preview
/// server breadth-first from a set of seed URLs, following same-origin
/// links up to `max_depth`/`max_pages`, honoring `exclude` patterns (§4.3).
use beacon_core::model::PageSource;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub base_url: String,
    pub seed_urls: Vec<String>,
    pub max_depth: usize,
    pub max_pages: usize,
    pub exclude: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            seed_urls: vec!["/".to_string()],
            max_depth: 10,
            max_pages: 10_000,
            exclude: Vec::new(),
        }
    }
}

/// An `exclude` entry matches either exactly, or as a `/prefix/*` glob.
fn is_excluded(path: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|pattern| {
        if let Some(prefix) = pattern.strip_suffix("/*") {
            beacon_core::url::matches_prefix(path, prefix)
        } else {
            beacon_core::url::normalize(pattern) == beacon_core::url::normalize(path)
        }
    })
}

fn same_origin_path(base: &url::Url, candidate: &str) -> Option<String> {
    let resolved = base.join(candidate).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    if resolved.origin() != base.origin() {
        return None;
    }
    Some(beacon_core::url::normalize(resolved.path()))
}

fn extract_links(base: &url::Url, html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("static selector");
    doc.select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| same_origin_path(base, href))
        .collect()
}

async fn fetch(client: &reqwest::Client, url: &str) -> Option<(String, String)> {
    let resp = client.get(url).send().await.ok()?;
    if !resp.status().is_success() {
        tracing::warn!(url = %url, status = %resp.status(), "skipping non-ok response during discovery");
        return None;
    }
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !content_type.contains("html") {
        return None;
    }
    let body = resp.text().await.ok()?;
    Some((content_type, body))
}

pub async fn discover_pages(
    client: &reqwest::Client,
    config: &BuildConfig,
) -> beacon_core::Result<Vec<PageSource>> {
    let base = url::Url::parse(&config.base_url).map_err(|e| {
        beacon_core::BeaconError::invalid_request(format!("invalid source.build.baseUrl: {e}"))
    })?;

    let mut queue: VecDeque<(String, usize)> = config
        .seed_urls
        .iter()
        .filter(|s| !is_excluded(s, &config.exclude))
        .map(|s| (beacon_core::url::normalize(s), 0usize))
        .collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut pages = Vec::new();

    while let Some((path, depth)) = queue.pop_front() {
        if pages.len() >= config.max_pages {
            break;
        }
        if !visited.insert(path.clone()) {
            continue;
        }
        if is_excluded(&path, &config.exclude) {
            continue;
        }

        let absolute = match base.join(&path) {
            Ok(u) => u.to_string(),
            Err(_) => continue,
        };
        let Some((_, html)) = fetch(client, &absolute).await else {
            continue;
        };

        if depth < config.max_depth {
            for link in extract_links(&base, &html) {
                if !visited.contains(&link) && !is_excluded(&link, &config.exclude) {
                    queue.push_back((link, depth + 1));
                }
            }
        }

        pages.push(PageSource::from_html(path, absolute, html));
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_matches_exact_and_prefix_glob() {
        let exclude = vec!["/private".to_string(), "/drafts/*".to_string()];
        assert!(is_excluded("/private", &exclude));
        assert!(is_excluded("/drafts/post-1", &exclude));
        assert!(!is_excluded("/public", &exclude));
    }

    #[test]
    fn same_origin_path_rejects_cross_origin_and_non_http() {
        let base = url::Url::parse("https://example.com/docs").unwrap();
        assert_eq!(same_origin_path(&base, "/guide"), Some("/guide".to_string()));
        assert_eq!(same_origin_path(&base, "https://other.com/x"), None);
        assert_eq!(same_origin_path(&base, "mailto:a@example.com"), None);
    }

    #[test]
    fn extract_links_collects_same_origin_anchors() {
        let base = url::Url::parse("https://example.com/").unwrap();
        let html = r#"<a href="/docs">Docs</a><a href="https://other.com/x">Other</a>"#;
        let links = extract_links(&base, html);
        assert_eq!(links, vec!["/docs".to_string()]);
    }
}

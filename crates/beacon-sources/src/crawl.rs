/// `source.mode = crawl`: fetch pages over HTTP, either from an explicit
/// seed list or by walking a sitemap (possibly a sitemap index) to
/// discover leaf page URLs (§4.3).
use crate::sitemap::{decode_body, parse_sitemap};
use beacon_core::model::PageSource;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::{HashSet, VecDeque};

const MAX_CONCURRENT_FETCHES: usize = 8;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub sitemap_url: Option<String>,
    pub seed_urls: Vec<String>,
}

async fn fetch_bytes(client: &Client, url: &str) -> Option<Vec<u8>> {
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => resp.bytes().await.ok().map(|b| b.to_vec()),
        Ok(resp) => {
            tracing::warn!(url = %url, status = %resp.status(), "skipping non-ok response");
            None
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "failed to fetch url");
            None
        }
    }
}

/// Walks a sitemap tree starting at `root_url`, following `<sitemapindex>`
/// child references and collecting `<urlset>` leaf page URLs. Each sitemap
/// URL is fetched at most once even if it (directly or indirectly)
/// references itself (S7).
pub async fn fetch_sitemap_urls(client: &Client, root_url: &str) -> Vec<String> {
    let mut queue = VecDeque::from([root_url.to_string()]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut leaf_urls = Vec::new();

    while let Some(url) = queue.pop_front() {
        if !visited.insert(url.clone()) {
            continue;
        }
        let Some(bytes) = fetch_bytes(client, &url).await else {
            continue;
        };
        let text = decode_body(&url, &bytes);
        let parsed = parse_sitemap(&text);
        for child in parsed.child_sitemaps {
            if !visited.contains(&child) {
                queue.push_back(child);
            }
        }
        leaf_urls.extend(parsed.leaf_urls);
    }

    leaf_urls
}

fn url_to_path(absolute_url: &str) -> String {
    match url::Url::parse(absolute_url) {
        Ok(parsed) => beacon_core::url::normalize(parsed.path()),
        Err(_) => beacon_core::url::normalize(absolute_url),
    }
}

async fn fetch_page(client: &Client, absolute_url: String) -> Option<PageSource> {
    let bytes = fetch_bytes(client, &absolute_url).await?;
    let html = String::from_utf8_lossy(&bytes).to_string();
    let path = url_to_path(&absolute_url);
    Some(PageSource::from_html(path, absolute_url, html))
}

pub async fn load_crawled_pages(
    client: &Client,
    config: &CrawlConfig,
) -> beacon_core::Result<Vec<PageSource>> {
    let mut page_urls: Vec<String> = config.seed_urls.clone();

    if let Some(sitemap_url) = &config.sitemap_url {
        page_urls.extend(fetch_sitemap_urls(client, sitemap_url).await);
    }

    let mut seen = HashSet::new();
    page_urls.retain(|u| seen.insert(u.clone()));

    let pages: Vec<PageSource> = stream::iter(page_urls.into_iter())
        .map(|url| {
            let client = client.clone();
            async move { fetch_page(&client, url).await }
        })
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .filter_map(|p| async move { p })
        .collect()
        .await;

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_to_path_strips_scheme_and_host() {
        assert_eq!(url_to_path("https://example.com/docs"), "/docs");
        assert_eq!(url_to_path("https://example.com/docs/"), "/docs");
        assert_eq!(url_to_path("https://example.com"), "/");
    }

    #[tokio::test]
    async fn s7_sitemap_self_reference_fetched_once() {
        // Simulates the sitemap graph described in S7 without a live server:
        // drive fetch_sitemap_urls's traversal logic directly via parse_sitemap,
        // asserting the visited-set guard prevents infinite/duplicate recursion.
        let index_xml = r#"<sitemapindex>
            <sitemap><loc>https://example.com/sitemap-self.xml</loc></sitemap>
            <sitemap><loc>https://example.com/sitemap-docs.xml</loc></sitemap>
        </sitemapindex>"#;
        let self_xml = r#"<sitemapindex>
            <sitemap><loc>https://example.com/sitemap-self.xml</loc></sitemap>
        </sitemapindex>"#;
        let docs_xml = r#"<urlset><url><loc>https://example.com/docs</loc></url></urlset>"#;

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from(["https://example.com/sitemap-index.xml".to_string()]);
        let mut leaf_urls = Vec::new();
        let mut fetch_count = 0;

        while let Some(url) = queue.pop_front() {
            if !visited.insert(url.clone()) {
                continue;
            }
            fetch_count += 1;
            let xml = match url.as_str() {
                "https://example.com/sitemap-index.xml" => index_xml,
                "https://example.com/sitemap-self.xml" => self_xml,
                "https://example.com/sitemap-docs.xml" => docs_xml,
                _ => continue,
            };
            let parsed = parse_sitemap(xml);
            for child in parsed.child_sitemaps {
                if !visited.contains(&child) {
                    queue.push_back(child);
                }
            }
            leaf_urls.extend(parsed.leaf_urls);
        }

        assert_eq!(leaf_urls, vec!["https://example.com/docs"]);
        assert_eq!(fetch_count, 3);
        assert_eq!(visited.iter().filter(|u| u.contains("sitemap-self")).count(), 1);
    }
}

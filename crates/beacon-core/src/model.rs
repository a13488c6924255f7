use crate::scope::Scope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single loaded page, exactly one of `html`/`markdown` populated (C4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSource {
    pub url: String,
    pub html: Option<String>,
    pub markdown: Option<String>,
    pub source_path: String,
    pub outgoing_links: Vec<String>,
}

impl PageSource {
    pub fn from_html(url: impl Into<String>, source_path: impl Into<String>, html: String) -> Self {
        Self {
            url: crate::url::normalize(&url.into()),
            html: Some(html),
            markdown: None,
            source_path: source_path.into(),
            outgoing_links: Vec::new(),
        }
    }

    pub fn from_markdown(
        url: impl Into<String>,
        source_path: impl Into<String>,
        markdown: String,
    ) -> Self {
        Self {
            url: crate::url::normalize(&url.into()),
            html: None,
            markdown: Some(markdown),
            source_path: source_path.into(),
            outgoing_links: Vec::new(),
        }
    }
}

/// A page after content extraction (C5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    pub title: String,
    pub markdown: String,
    pub outgoing_links: Vec<String>,
    pub noindex: bool,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub weight: Option<f32>,
}

impl ExtractedPage {
    /// `tags` is the page's first URL segment (empty for `/`).
    pub fn tags_for_url(url: &str) -> Vec<String> {
        crate::url::first_segment(url).into_iter().collect()
    }
}

/// Route resolution confidence (§4.2 phase 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteResolution {
    Exact,
    BestEffort,
}

/// An `ExtractedPage` enriched with scope/route/graph metadata, ready to
/// chunk (C11 phases 4-5 output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPage {
    pub scope: Scope,
    pub url: String,
    pub title: String,
    pub markdown: String,
    pub outgoing_links: Vec<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub weight: Option<f32>,
    pub route_file: String,
    pub route_resolution: RouteResolution,
    pub generated_at: DateTime<Utc>,
    pub incoming_links: usize,
    pub depth: usize,
}

impl IndexedPage {
    pub fn from_extracted(
        page: ExtractedPage,
        scope: Scope,
        route_file: String,
        route_resolution: RouteResolution,
        incoming_links: usize,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let depth = crate::url::depth(&page.url);
        Self {
            scope,
            url: page.url,
            title: page.title,
            markdown: page.markdown,
            outgoing_links: page.outgoing_links,
            tags: page.tags,
            description: page.description,
            keywords: page.keywords,
            weight: page.weight,
            route_file,
            route_resolution,
            generated_at,
            incoming_links,
            depth,
        }
    }
}

/// A bounded, identity-stable text fragment of a page (C7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_key: String,
    pub ordinal: usize,
    pub url: String,
    pub path: String,
    pub title: String,
    pub section_title: Option<String>,
    pub heading_path: Vec<String>,
    pub chunk_text: String,
    pub snippet: String,
    pub depth: usize,
    pub incoming_links: usize,
    pub route_file: String,
    pub tags: Vec<String>,
    pub content_hash: String,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl Chunk {
    /// `sha1(scopeName "|" url "|" ordinal "|" lower(normalize(sectionTitle?)))`.
    pub fn compute_key(
        scope_name: &str,
        url: &str,
        ordinal: usize,
        section_title: Option<&str>,
    ) -> String {
        let section = section_title
            .map(|s| crate::text::normalize(s).to_lowercase())
            .unwrap_or_default();
        let ordinal_str = ordinal.to_string();
        crate::hash::sha1_join(&[scope_name, url, &ordinal_str, &section])
    }

    /// `sha256(normalize(chunkText))`.
    pub fn compute_content_hash(chunk_text: &str) -> String {
        crate::hash::sha256_hex(&crate::text::normalize(chunk_text))
    }
}

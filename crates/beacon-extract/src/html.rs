/// HTML extraction path (§4.4): select the main content subtree, resolve
/// title/noindex/weight from metadata, strip ignored elements, and convert
/// what remains to Markdown.
use crate::config::{ExtractConfig, ExtractOutcome, TransformConfig};
use beacon_core::model::ExtractedPage;
use scraper::{ElementRef, Html, Selector};

fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    Selector::parse(selector).ok().and_then(|sel| doc.select(&sel).next())
}

fn meta_content(doc: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[name='{name}'], meta[property='{name}']")).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn has_noindex_attr(doc: &Html, attr: &str) -> bool {
    Selector::parse(&format!("[{attr}]"))
        .ok()
        .map(|sel| doc.select(&sel).next().is_some())
        .unwrap_or(false)
}

fn robots_noindex(doc: &Html) -> bool {
    meta_content(doc, "robots")
        .map(|v| v.to_lowercase().contains("noindex"))
        .unwrap_or(false)
}

fn resolve_weight(doc: &Html) -> Option<f32> {
    let raw = meta_content(doc, "searchsocket-weight")?;
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}

fn title_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

fn resolve_title(doc: &Html, main: ElementRef<'_>, url: &str) -> String {
    if let Some(og) = meta_content(doc, "og:title") {
        return og;
    }
    if let Some(h1_selector) = Selector::parse("h1").ok() {
        if let Some(h1) = main.select(&h1_selector).next() {
            let text = title_text(h1);
            if !text.is_empty() {
                return text;
            }
        }
    }
    if let Some(tw) = meta_content(doc, "twitter:title") {
        return tw;
    }
    if let Some(title_el) = select_first(doc, "title") {
        let text = title_text(title_el);
        if !text.is_empty() {
            return text;
        }
    }
    url.to_string()
}

fn outgoing_links(main: ElementRef<'_>, page_url: &str) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    main.select(&a_selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| beacon_core::url::resolve_link(page_url, href))
        .collect()
}

/// Strips `drop_tags`, `drop_selectors`, and `[ignoreAttr]` matches from the
/// rendered HTML of `main` by operating on its serialized markup: `scraper`
/// has no mutable-DOM API, so removal is done with a second parse pass over
/// a lightweight string-level filter driven by the same selectors.
fn strip_ignored(main_html: &str, config: &ExtractConfig) -> String {
    let fragment = Html::parse_fragment(main_html);
    let mut drop_selectors: Vec<Selector> = config
        .drop_tags
        .iter()
        .filter_map(|t| Selector::parse(t).ok())
        .collect();
    drop_selectors.extend(config.drop_selectors.iter().filter_map(|s| Selector::parse(s).ok()));
    if let Ok(ignore_sel) = Selector::parse(&format!("[{}]", config.ignore_attr)) {
        drop_selectors.push(ignore_sel);
    }

    let mut dropped_html: Vec<String> = Vec::new();
    for sel in &drop_selectors {
        for el in fragment.select(sel) {
            dropped_html.push(el.html());
        }
    }

    let mut out = main_html.to_string();
    for snippet in dropped_html {
        out = out.replace(&snippet, "");
    }
    out
}

pub fn extract_html(url: &str, html: &str, extract: &ExtractConfig, transform: &TransformConfig) -> ExtractOutcome {
    let doc = Html::parse_document(html);

    if has_noindex_attr(&doc, &extract.noindex_attr) {
        return ExtractOutcome::Dropped;
    }
    if extract.respect_robots_noindex && robots_noindex(&doc) {
        return ExtractOutcome::Dropped;
    }

    let weight = resolve_weight(&doc);
    if weight == Some(0.0) {
        return ExtractOutcome::Dropped;
    }

    let main = select_first(&doc, &extract.main_selector).or_else(|| select_first(&doc, "body"));
    let Some(main) = main else {
        return ExtractOutcome::Dropped;
    };

    let title = resolve_title(&doc, main, url);
    let links = outgoing_links(main, url);

    let cleaned_html = strip_ignored(&main.html(), extract);
    let mut markdown = html2md::parse_html(&cleaned_html);
    if !transform.preserve_tables {
        markdown = strip_markdown_tables(&markdown);
    }
    let markdown = beacon_core::text::normalize(&markdown);
    if markdown.is_empty() {
        return ExtractOutcome::Dropped;
    }

    let description = meta_content(&doc, "description");
    let keywords = meta_content(&doc, "keywords")
        .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect());

    ExtractOutcome::Page(ExtractedPage {
        url: url.to_string(),
        title,
        markdown,
        outgoing_links: links,
        noindex: false,
        tags: ExtractedPage::tags_for_url(url),
        description,
        keywords,
        weight,
    })
}

fn strip_markdown_tables(markdown: &str) -> String {
    markdown
        .lines()
        .filter(|line| {
            let t = line.trim();
            !(t.starts_with('|') && t.ends_with('|'))
        })
        .collect::<Vec<_>>()
        .join("\n")
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
    fn title_prefers_og_title() {
        let html = r#"<html><head><meta property="og:title" content="OG Title"><title>Doc Title</title></head>
            <body><main><h1>H1 Title</h1><p>body text</p></main></body></html>"#;
        let p = page(extract_html("/docs/x", html, &ExtractConfig::default(), &TransformConfig::default()));
        assert_eq!(p.title, "OG Title");
    }

    #[test]
    fn title_falls_back_to_h1_then_document_title() {
        let html = r#"<html><head><title>Doc Title</title></head>
            <body><main><h1>H1 Title</h1><p>body text</p></main></body></html>"#;
        let p = page(extract_html("/docs/x", html, &ExtractConfig::default(), &TransformConfig::default()));
        assert_eq!(p.title, "H1 Title");
    }

    #[test]
    fn robots_noindex_drops_page() {
        let html = r#"<html><head><meta name="robots" content="noindex, nofollow"></head>
            <body><main><p>text</p></main></body></html>"#;
        let outcome = extract_html("/docs/x", html, &ExtractConfig::default(), &TransformConfig::default());
        assert!(matches!(outcome, ExtractOutcome::Dropped));
    }

    #[test]
    fn zero_weight_drops_page() {
        let html = r#"<html><head><meta name="searchsocket-weight" content="0"></head>
            <body><main><p>text</p></main></body></html>"#;
        let outcome = extract_html("/docs/x", html, &ExtractConfig::default(), &TransformConfig::default());
        assert!(matches!(outcome, ExtractOutcome::Dropped));
    }

    #[test]
    fn negative_weight_is_ignored_not_fatal() {
        let html = r#"<html><head><meta name="searchsocket-weight" content="-1"></head>
            <body><main><p>some text here</p></main></body></html>"#;
        let p = page(extract_html("/docs/x", html, &ExtractConfig::default(), &TransformConfig::default()));
        assert_eq!(p.weight, None);
    }

    #[test]
    fn collects_and_normalizes_outgoing_links() {
        let html = r#"<html><body><main>
            <a href="/docs/other">rel</a>
            <a href="https://example.com/docs/abs">abs</a>
            <a href="mailto:a@b.com">mail</a>
            <p>text</p>
            </main></body></html>"#;
        let p = page(extract_html("/docs/x", html, &ExtractConfig::default(), &TransformConfig::default()));
        assert!(p.outgoing_links.contains(&"/docs/other".to_string()));
        assert!(p.outgoing_links.contains(&"/docs/abs".to_string()));
        assert!(!p.outgoing_links.iter().any(|l| l.starts_with("mailto")));
    }
}

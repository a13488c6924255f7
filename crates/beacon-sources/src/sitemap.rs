/// Sitemap XML parsing: `<sitemapindex>` entries recurse into child
/// sitemaps, `<urlset>` entries are leaf page URLs. `.gz` bodies are
/// transparently decompressed. The caller drives fetching with a visited
/// set so a self-referential sitemap is fetched at most once (§4.3, S7).
use flate2::read::GzDecoder;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;

enum Container {
    None,
    Sitemap,
    Url,
}

pub struct SitemapParseResult {
    pub child_sitemaps: Vec<String>,
    pub leaf_urls: Vec<String>,
}

pub fn decode_body(url: &str, bytes: &[u8]) -> String {
    let looks_gzip = bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b;
    if url.ends_with(".gz") || looks_gzip {
        let mut decoder = GzDecoder::new(bytes);
        let mut out = String::new();
        if decoder.read_to_string(&mut out).is_ok() {
            return out;
        }
    }
    String::from_utf8_lossy(bytes).to_string()
}

pub fn parse_sitemap(xml: &str) -> SitemapParseResult {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut container = Container::None;
    let mut in_loc = false;
    let mut child_sitemaps = Vec::new();
    let mut leaf_urls = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sitemap" => container = Container::Sitemap,
                b"url" => container = Container::Url,
                b"loc" => in_loc = true,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_loc {
                    if let Ok(text) = t.unescape() {
                        let text = text.trim().to_string();
                        if text.starts_with("http://") || text.starts_with("https://") {
                            match container {
                                Container::Sitemap => child_sitemaps.push(text),
                                Container::Url => leaf_urls.push(text),
                                Container::None => {}
                            }
                        }
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sitemap" | b"url" => container = Container::None,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    SitemapParseResult { child_sitemaps, leaf_urls }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urlset_leaves() {
        let xml = r#"<?xml version="1.0"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://example.com/docs</loc></url>
              <url><loc>https://example.com/about</loc></url>
            </urlset>"#;
        let result = parse_sitemap(xml);
        assert!(result.child_sitemaps.is_empty());
        assert_eq!(result.leaf_urls, vec!["https://example.com/docs", "https://example.com/about"]);
    }

    #[test]
    fn parses_sitemapindex_children() {
        let xml = r#"<?xml version="1.0"?>
            <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sitemap><loc>https://example.com/sitemap-a.xml</loc></sitemap>
              <sitemap><loc>https://example.com/sitemap-self.xml</loc></sitemap>
            </sitemapindex>"#;
        let result = parse_sitemap(xml);
        assert!(result.leaf_urls.is_empty());
        assert_eq!(result.child_sitemaps.len(), 2);
    }

    #[test]
    fn ignores_non_http_loc_entries() {
        let xml = r#"<urlset><url><loc>ftp://example.com/x</loc></url></urlset>"#;
        let result = parse_sitemap(xml);
        assert!(result.leaf_urls.is_empty());
    }
}

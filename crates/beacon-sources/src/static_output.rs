/// `source.mode = static-output`: walk a prerendered HTML output directory
/// and map each file to a URL (§4.3).
use beacon_core::model::PageSource;
use std::path::Path;
use walkdir::WalkDir;

pub fn load_static_output(static_output_dir: &Path) -> beacon_core::Result<Vec<PageSource>> {
    let root = static_output_dir.to_string_lossy().to_string();
    let mut pages = Vec::new();

    for entry in WalkDir::new(static_output_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let file_path = entry.path().to_string_lossy().to_string();
        let html = match std::fs::read_to_string(entry.path()) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(path = %file_path, error = %e, "skipping unreadable static-output file");
                continue;
            }
        };
        let url = beacon_core::url::static_html_file_to_url(&file_path, &root);
        pages.push(PageSource::from_html(url, file_path, html));
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn maps_index_and_nested_files_to_urls() {
        let dir = tempfile_dir();
        fs::create_dir_all(dir.join("docs")).unwrap();
        fs::write(dir.join("index.html"), "<html><body>home</body></html>").unwrap();
        fs::write(dir.join("docs/intro/index.html"), "<html><body>intro</body></html>").unwrap();
        fs::write(dir.join("about.html"), "<html><body>about</body></html>").unwrap();

        let pages = load_static_output(&dir).unwrap();
        let mut urls: Vec<String> = pages.into_iter().map(|p| p.url).collect();
        urls.sort();
        assert_eq!(urls, vec!["/", "/about", "/docs/intro"]);

        fs::remove_dir_all(&dir).ok();
    }

    fn tempfile_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("beacon-static-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}

/// `getPage`: reads the canonical page record, either from a local
/// filesystem mirror written by the index pipeline, or returns `None`
/// if no mirror is configured or the page was never indexed (§4.7, §6).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMirrorRecord {
    pub url: String,
    pub title: String,
    pub scope: String,
    #[serde(rename = "routeFile")]
    pub route_file: String,
    #[serde(rename = "routeResolution")]
    pub route_resolution: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "incomingLinks")]
    pub incoming_links: usize,
    #[serde(rename = "outgoingLinks")]
    pub outgoing_links: Vec<String>,
    pub depth: usize,
    pub tags: Vec<String>,
    #[serde(default)]
    pub body: String,
}

fn mirror_path(state_dir: &Path, scope_name: &str, path_or_url: &str) -> PathBuf {
    let normalized = beacon_core::url::normalize(path_or_url);
    let relative = normalized.trim_start_matches('/');
    let file_name = if relative.is_empty() { "index".to_string() } else { relative.to_string() };
    state_dir.join("pages").join(scope_name).join(format!("{file_name}.md"))
}

/// Parses a mirror file's `---`-delimited YAML frontmatter and trailing
/// Markdown body. Returns `None` if the file does not exist; propagates
/// parse errors since a present-but-corrupt mirror indicates a bug.
pub fn get_page(state_dir: &Path, scope_name: &str, path_or_url: &str) -> beacon_core::Result<Option<PageMirrorRecord>> {
    let path = mirror_path(state_dir, scope_name, path_or_url);
    let raw = match std::fs::read_to_string(&path) {
        Ok(r) => r,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(beacon_core::BeaconError::internal(format!(
                "failed to read page mirror {}: {e}",
                path.display()
            )))
        }
    };

    let mut parts = raw.splitn(3, "---");
    let _empty = parts.next();
    let frontmatter = parts.next().ok_or_else(|| {
        beacon_core::BeaconError::internal(format!("page mirror {} missing frontmatter", path.display()))
    })?;
    let body = parts.next().unwrap_or("").trim_start().to_string();

    let mut record: PageMirrorRecord = serde_yaml::from_str(frontmatter).map_err(|e| {
        beacon_core::BeaconError::internal(format!("invalid frontmatter in {}: {e}", path.display()))
    })?;
    record.body = body;
    Ok(Some(record))
}

/// Serializes a mirror record content-addressed by dropping `generatedAt`
/// from the equality comparison with any existing file, so unchanged pages
/// are not rewritten (§5).
pub fn write_page_mirror(state_dir: &Path, record: &PageMirrorRecord) -> beacon_core::Result<()> {
    let path = mirror_path(state_dir, &record.scope, &record.url);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| beacon_core::BeaconError::internal(format!("failed to create {}: {e}", parent.display())))?;
    }

    if let Ok(existing) = std::fs::read_to_string(&path) {
        if content_equal_ignoring_generated_at(&existing, record) {
            return Ok(());
        }
    }

    let frontmatter = serde_yaml::to_string(record)
        .map_err(|e| beacon_core::BeaconError::internal(format!("failed to serialize page mirror: {e}")))?;
    let contents = format!("---\n{frontmatter}---\n\n{}\n", record.body);
    std::fs::write(&path, contents)
        .map_err(|e| beacon_core::BeaconError::internal(format!("failed to write {}: {e}", path.display())))
}

fn content_equal_ignoring_generated_at(existing_raw: &str, record: &PageMirrorRecord) -> bool {
    let mut parts = existing_raw.splitn(3, "---");
    let _ = parts.next();
    let Some(frontmatter) = parts.next() else { return false };
    let body = parts.next().unwrap_or("").trim_start();

    let Ok(mut existing): Result<PageMirrorRecord, _> = serde_yaml::from_str(frontmatter) else {
        return false;
    };
    existing.generated_at = record.generated_at;
    existing.body = record.body.clone();
    body == record.body && serde_json::to_value(&existing).ok() == serde_json::to_value(record).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> PageMirrorRecord {
        PageMirrorRecord {
            url: "/docs/intro".to_string(),
            title: "Intro".to_string(),
            scope: "main".to_string(),
            route_file: "/docs/intro/+page.svelte".to_string(),
            route_resolution: "exact".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            incoming_links: 2,
            outgoing_links: vec!["/docs".to_string()],
            depth: 2,
            tags: vec!["docs".to_string()],
            body: "# Intro\n\nHello.".to_string(),
        }
    }

    #[test]
    fn writes_and_reads_back_mirror() {
        let dir = std::env::temp_dir().join(format!("beacon-mirror-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let record = sample_record();
        write_page_mirror(&dir, &record).unwrap();
        let loaded = get_page(&dir, "main", "/docs/intro").unwrap().unwrap();
        assert_eq!(loaded.title, "Intro");
        assert_eq!(loaded.body, "# Intro\n\nHello.");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_page_returns_none() {
        let dir = std::env::temp_dir().join(format!("beacon-mirror-missing-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let loaded = get_page(&dir, "main", "/nope").unwrap();
        assert!(loaded.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rewrite_with_only_generated_at_changed_is_a_noop() {
        let dir = std::env::temp_dir().join(format!("beacon-mirror-noop-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let mut record = sample_record();
        write_page_mirror(&dir, &record).unwrap();
        let path = mirror_path(&dir, &record.scope, &record.url);
        let first_write_modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        record.generated_at = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        write_page_mirror(&dir, &record).unwrap();
        let second_write_modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(first_write_modified, second_write_modified);

        std::fs::remove_dir_all(&dir).ok();
    }
}

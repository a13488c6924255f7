use serde::{Deserialize, Serialize};

/// `extract.*` configuration (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub main_selector: String,
    pub drop_tags: Vec<String>,
    pub drop_selectors: Vec<String>,
    pub ignore_attr: String,
    pub noindex_attr: String,
    pub respect_robots_noindex: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            main_selector: "main".to_string(),
            drop_tags: vec!["script".to_string(), "style".to_string(), "nav".to_string(), "footer".to_string()],
            drop_selectors: Vec::new(),
            ignore_attr: "data-beacon-ignore".to_string(),
            noindex_attr: "data-beacon-noindex".to_string(),
            respect_robots_noindex: true,
        }
    }
}

/// `transform.*` configuration (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    pub preserve_code_blocks: bool,
    pub preserve_tables: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self { preserve_code_blocks: true, preserve_tables: true }
    }
}

/// Result of extraction: either a fully extracted page, a page dropped by
/// `noindex`/zero-weight rules, or nothing (empty after normalization).
pub enum ExtractOutcome {
    Page(beacon_core::ExtractedPage),
    Dropped,
}

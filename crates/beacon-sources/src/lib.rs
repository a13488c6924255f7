pub mod build;
pub mod content_files;
pub mod crawl;
pub mod sitemap;
pub mod static_output;

pub use build::{discover_pages, BuildConfig};
pub use content_files::load_content_files;
pub use crawl::{fetch_sitemap_urls, load_crawled_pages, CrawlConfig};
pub use static_output::load_static_output;

use beacon_core::model::PageSource;
use std::path::PathBuf;

/// One `source.mode` configuration (§4.3, §6). Exactly one variant is
/// active per project; the pipeline calls `load` without caring which.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    StaticOutput { dir: PathBuf },
    ContentFiles { dir: PathBuf },
    Crawl(CrawlConfig),
    Build(BuildConfig),
}

impl SourceConfig {
    pub async fn load(&self, client: &reqwest::Client) -> beacon_core::Result<Vec<PageSource>> {
        match self {
            SourceConfig::StaticOutput { dir } => load_static_output(dir),
            SourceConfig::ContentFiles { dir } => load_content_files(dir),
            SourceConfig::Crawl(config) => load_crawled_pages(client, config).await,
            SourceConfig::Build(config) => discover_pages(client, config).await,
        }
    }
}

/// Translates the `source.*` configuration model into a concrete
/// `beacon_sources::SourceConfig` ready to load (§4.3, §6).
use beacon_core::{BeaconError, Result};
use beacon_sources::{BuildConfig, CrawlConfig, SourceConfig as LoaderConfig};
use std::path::PathBuf;

pub fn resolve_loader_config(source: &beacon_config::SourceConfig, source_override: Option<&str>) -> Result<LoaderConfig> {
    let mode = source_override.map(parse_mode_override).transpose()?.unwrap_or(source.mode);

    match mode {
        beacon_config::SourceMode::StaticOutput => {
            let dir = source
                .static_output_dir
                .clone()
                .ok_or_else(|| BeaconError::config_missing("source.staticOutputDir is required"))?;
            Ok(LoaderConfig::StaticOutput { dir: PathBuf::from(dir) })
        }
        beacon_config::SourceMode::ContentFiles => {
            let dir = source
                .base_dir
                .clone()
                .ok_or_else(|| BeaconError::config_missing("source.baseDir is required"))?;
            Ok(LoaderConfig::ContentFiles { dir: PathBuf::from(dir) })
        }
        beacon_config::SourceMode::Crawl => Ok(LoaderConfig::Crawl(CrawlConfig {
            sitemap_url: source.sitemap_url.clone(),
            seed_urls: source.seed_urls.clone(),
        })),
        beacon_config::SourceMode::Build => {
            let base_url = source
                .build_base_url
                .clone()
                .ok_or_else(|| BeaconError::config_missing("source.build.baseUrl is required"))?;
            Ok(LoaderConfig::Build(BuildConfig {
                base_url,
                seed_urls: if source.seed_urls.is_empty() { vec!["/".to_string()] } else { source.seed_urls.clone() },
                max_depth: source.max_depth.unwrap_or(10),
                max_pages: source.max_pages_discover.unwrap_or(10_000),
                exclude: source.exclude.clone(),
            }))
        }
    }
}

fn parse_mode_override(raw: &str) -> Result<beacon_config::SourceMode> {
    match raw {
        "static-output" => Ok(beacon_config::SourceMode::StaticOutput),
        "content-files" => Ok(beacon_config::SourceMode::ContentFiles),
        "crawl" => Ok(beacon_config::SourceMode::Crawl),
        "build" => Ok(beacon_config::SourceMode::Build),
        other => Err(BeaconError::config_missing(format!("unrecognized source mode override: {other}"))),
    }
}

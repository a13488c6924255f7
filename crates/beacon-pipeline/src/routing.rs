/// Route mapping glue (C6, §4.2 phase 5): discovers route files under a
/// routes tree and resolves each page's URL against them.
use beacon_config::SourceConfig;
use beacon_core::{BeaconError, Result, RouteResolution};
use beacon_extract::RouteMapper;
use std::path::Path;
use walkdir::WalkDir;

fn discover_route_files(routes_dir: &Path) -> Vec<String> {
    WalkDir::new(routes_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            name == "+page.svelte" || name == "+page.md"
        })
        .filter_map(|e| {
            let rel = e.path().strip_prefix(routes_dir).ok()?;
            Some(format!("/{}", rel.to_string_lossy()))
        })
        .collect()
}

/// Resolves every page's `(routeFile, routeResolution)`. Returns `None`
/// when no routes tree is configured for this source mode: callers should
/// fall back to a routeless default rather than treat it as a failure.
pub fn build_route_mapper(source: &SourceConfig) -> Option<RouteMapper> {
    let routes_dir = source
        .routes_dir
        .clone()
        .or_else(|| matches!(source.mode, beacon_config::SourceMode::ContentFiles).then(|| source.base_dir.clone()).flatten())?;

    let route_files = discover_route_files(Path::new(&routes_dir));
    Some(RouteMapper::new(route_files))
}

pub fn resolve_route(
    mapper: Option<&RouteMapper>,
    url: &str,
    strict: bool,
) -> Result<(String, RouteResolution)> {
    match mapper {
        None => Ok((url.to_string(), RouteResolution::Exact)),
        Some(mapper) => {
            let (route_file, resolution) = mapper.resolve(url)?;
            if strict && resolution == RouteResolution::BestEffort {
                return Err(BeaconError::route_mapping_failed(format!(
                    "best-effort route resolution for {url} under strict route mapping"
                )));
            }
            Ok((route_file, resolution))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routeless_mode_passes_through() {
        let result = resolve_route(None, "/docs/anything", true).unwrap();
        assert_eq!(result.0, "/docs/anything");
        assert_eq!(result.1, RouteResolution::Exact);
    }

    #[test]
    fn s4_strict_best_effort_fails() {
        let mapper = RouteMapper::new(vec!["/+page.svelte".to_string()]);
        let result = resolve_route(Some(&mapper), "/docs/orphan", true);
        assert!(result.is_err());
    }

    #[test]
    fn non_strict_best_effort_succeeds() {
        let mapper = RouteMapper::new(vec!["/+page.svelte".to_string()]);
        let result = resolve_route(Some(&mapper), "/docs/orphan", false).unwrap();
        assert_eq!(result.1, RouteResolution::BestEffort);
    }
}

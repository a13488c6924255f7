/// Maps a source URL to a filesystem route file, given the route patterns
/// discovered under a routes tree (C6). A pattern matches "exactly" when a
/// registered route (static or dynamic) covers the full URL; when nothing
/// does, the nearest matching ancestor is used instead and the resolution
/// is reported as best-effort so callers can fail strict runs (§4.2 step 5).
use beacon_core::{BeaconError, RouteResolution};

#[derive(Debug, Clone, PartialEq)]
enum Seg {
    Literal(String),
    Param,
    Splat,
    Optional,
}

fn parse_route_file(route_file: &str) -> Vec<Seg> {
    let without_file = route_file
        .trim_end_matches("+page.svelte")
        .trim_end_matches("+page.md")
        .trim_end_matches("+page")
        .trim_end_matches('/');

    without_file
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .filter(|s| !(s.starts_with('(') && s.ends_with(')')))
        .map(|s| {
            if s.starts_with("[...") && s.ends_with(']') {
                Seg::Splat
            } else if s.starts_with("[[") && s.ends_with("]]") {
                Seg::Optional
            } else if s.starts_with('[') && s.ends_with(']') {
                Seg::Param
            } else {
                Seg::Literal(s.to_string())
            }
        })
        .collect()
}

fn specificity_rank(pattern: &[Seg]) -> usize {
    pattern
        .iter()
        .map(|s| match s {
            Seg::Literal(_) => 0,
            Seg::Param => 1,
            Seg::Optional => 2,
            Seg::Splat => 3,
        })
        .sum()
}

fn matches_pattern(pattern: &[Seg], candidate: &[&str]) -> bool {
    fn go(pattern: &[Seg], candidate: &[&str]) -> bool {
        match pattern.first() {
            None => candidate.is_empty(),
            Some(Seg::Literal(lit)) => {
                !candidate.is_empty() && candidate[0] == lit.as_str() && go(&pattern[1..], &candidate[1..])
            }
            Some(Seg::Param) => !candidate.is_empty() && go(&pattern[1..], &candidate[1..]),
            Some(Seg::Optional) => {
                (!candidate.is_empty() && go(&pattern[1..], &candidate[1..])) || go(&pattern[1..], candidate)
            }
            Some(Seg::Splat) => {
                for take in 0..=candidate.len() {
                    if go(&pattern[1..], &candidate[take..]) {
                        return true;
                    }
                }
                false
            }
        }
    }
    go(pattern, candidate)
}

pub struct RouteMapper {
    routes: Vec<(Vec<Seg>, String)>,
}

impl RouteMapper {
    pub fn new(route_files: Vec<String>) -> Self {
        let mut routes: Vec<(Vec<Seg>, String)> =
            route_files.into_iter().map(|f| (parse_route_file(&f), f)).collect();
        routes.sort_by_key(|(pattern, _)| specificity_rank(pattern));
        Self { routes }
    }

    fn find_matching(&self, segments: &[&str]) -> Option<String> {
        self.routes
            .iter()
            .find(|(pattern, _)| matches_pattern(pattern, segments))
            .map(|(_, f)| f.clone())
    }

    /// Resolves `url` to `(routeFile, resolution)`, or a `ROUTE_MAPPING_FAILED`
    /// error if no registered route -- not even the root -- covers any prefix
    /// of the URL.
    pub fn resolve(&self, url: &str) -> beacon_core::Result<(String, RouteResolution)> {
        let normalized = beacon_core::url::normalize(url);
        let segments: Vec<&str> = normalized
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if let Some(route_file) = self.find_matching(&segments) {
            return Ok((route_file, RouteResolution::Exact));
        }

        let mut depth = segments.len();
        while depth > 0 {
            depth -= 1;
            if let Some(route_file) = self.find_matching(&segments[..depth]) {
                return Ok((route_file, RouteResolution::BestEffort));
            }
        }

        Err(BeaconError::route_mapping_failed(format!(
            "no route file covers any prefix of {url}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_on_static_route() {
        let mapper = RouteMapper::new(vec!["/docs/guide/+page.svelte".to_string()]);
        let (file, resolution) = mapper.resolve("/docs/guide").unwrap();
        assert_eq!(file, "/docs/guide/+page.svelte");
        assert_eq!(resolution, RouteResolution::Exact);
    }

    #[test]
    fn dynamic_param_segment_matches_exactly() {
        let mapper = RouteMapper::new(vec!["/docs/[slug]/+page.svelte".to_string()]);
        let (file, resolution) = mapper.resolve("/docs/getting-started").unwrap();
        assert_eq!(file, "/docs/[slug]/+page.svelte");
        assert_eq!(resolution, RouteResolution::Exact);
    }

    #[test]
    fn s4_falls_back_to_root_as_best_effort() {
        let mapper = RouteMapper::new(vec!["/+page.svelte".to_string()]);
        let (file, resolution) = mapper.resolve("/docs/orphan").unwrap();
        assert_eq!(file, "/+page.svelte");
        assert_eq!(resolution, RouteResolution::BestEffort);
    }

    #[test]
    fn no_routes_at_all_fails() {
        let mapper = RouteMapper::new(vec![]);
        assert!(mapper.resolve("/docs/orphan").is_err());
    }

    #[test]
    fn splat_consumes_remaining_segments() {
        let mapper = RouteMapper::new(vec!["/blog/[...rest]/+page.svelte".to_string()]);
        let (file, resolution) = mapper.resolve("/blog/2024/01/post").unwrap();
        assert_eq!(file, "/blog/[...rest]/+page.svelte");
        assert_eq!(resolution, RouteResolution::Exact);
    }
}

/// Shared helpers for vector-store adapters: cosine similarity for backends
/// that store vectors as opaque blobs, and "directory bucket" fields for
/// backends lacking a native path-prefix filter (§4.5).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        (dot / (mag_a * mag_b)).clamp(-1.0, 1.0)
    }
}

/// Split a canonical path into up to `max_depth` non-empty directory
/// buckets: `/docs/guides/intro` -> `["docs", "guides", "intro"]`. Adapters
/// without native prefix filters store these as `dir0..dirN` metadata
/// fields and combine them with equality predicates at query time.
pub fn dir_buckets(path: &str, max_depth: usize) -> Vec<Option<String>> {
    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    (0..max_depth)
        .map(|i| segments.get(i).map(|s| s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn dir_buckets_cases() {
        let buckets = dir_buckets("/docs/guides/intro", 4);
        assert_eq!(
            buckets,
            vec![
                Some("docs".to_string()),
                Some("guides".to_string()),
                Some("intro".to_string()),
                None,
            ]
        );
    }
}

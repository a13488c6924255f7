/// Merge policy between the initial vector-store order and the reranked
/// order, keyed by URL (§4.6).
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MergeEntry {
    pub id: String,
    pub url: String,
    pub score: f32,
}

/// If any URL's displacement between the initial and reranked order
/// exceeds `max_displacement`, adopt the reranked order wholesale.
/// Otherwise keep the initial order, overwriting scores from the
/// reranked response where available. Empty inputs return the reranked
/// response unchanged.
///
/// Displacement is measured per `url` (a page can contribute more than one
/// chunk `id` to the candidate set; the first occurrence of a URL fixes its
/// position), while score overwrite still matches on the finer-grained
/// `id` so each chunk keeps its own rerank score.
pub fn merge(initial: &[MergeEntry], reranked: &[MergeEntry], max_displacement: usize) -> Vec<MergeEntry> {
    if initial.is_empty() {
        return reranked.to_vec();
    }
    if reranked.is_empty() {
        return initial.to_vec();
    }

    let mut initial_positions: HashMap<&str, usize> = HashMap::new();
    for (i, e) in initial.iter().enumerate() {
        initial_positions.entry(e.url.as_str()).or_insert(i);
    }
    let mut reranked_positions: HashMap<&str, usize> = HashMap::new();
    for (i, e) in reranked.iter().enumerate() {
        reranked_positions.entry(e.url.as_str()).or_insert(i);
    }

    let exceeds = initial_positions.iter().any(|(url, &initial_pos)| {
        match reranked_positions.get(url) {
            Some(&reranked_pos) => initial_pos.abs_diff(reranked_pos) > max_displacement,
            None => false,
        }
    });

    if exceeds {
        return reranked.to_vec();
    }

    let reranked_scores: HashMap<&str, f32> = reranked.iter().map(|e| (e.id.as_str(), e.score)).collect();
    initial
        .iter()
        .map(|e| {
            let score = reranked_scores.get(e.id.as_str()).copied().unwrap_or(e.score);
            MergeEntry { id: e.id.clone(), url: e.url.clone(), score }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(urls: &[&str]) -> Vec<MergeEntry> {
        urls.iter().map(|u| MergeEntry { id: u.to_string(), url: u.to_string(), score: 0.5 }).collect()
    }

    fn hits(urls: &[&str]) -> Vec<MergeEntry> {
        urls.iter()
            .enumerate()
            .map(|(i, u)| MergeEntry { id: u.to_string(), url: u.to_string(), score: 1.0 - i as f32 * 0.1 })
            .collect()
    }

    #[test]
    fn s5_merge_keeps_initial_order_under_displacement_bound() {
        let initial = entries(&["/a", "/b", "/c", "/d"]);
        let reranked = hits(&["/a", "/c", "/b", "/d"]);
        let merged = merge(&initial, &reranked, 3);
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["/a", "/b", "/c", "/d"]);
        let b = merged.iter().find(|e| e.id == "/b").unwrap();
        assert_eq!(b.score, hits(&["/a", "/c", "/b", "/d"])[2].score);
    }

    #[test]
    fn s6_merge_adopts_rerank_order_over_displacement_bound() {
        let initial = entries(&["/a", "/b", "/c", "/d", "/e"]);
        let reranked = hits(&["/e", "/b", "/c", "/d", "/a"]);
        let merged = merge(&initial, &reranked, 3);
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["/e", "/b", "/c", "/d", "/a"]);
    }

    #[test]
    fn property_zero_displacement_always_adopts_rerank() {
        let initial = entries(&["/a", "/b"]);
        let reranked = hits(&["/b", "/a"]);
        let merged = merge(&initial, &reranked, 0);
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["/b", "/a"]);
    }

    #[test]
    fn property_infinite_displacement_always_keeps_initial() {
        let initial = entries(&["/a", "/b", "/c"]);
        let reranked = hits(&["/c", "/a", "/b"]);
        let merged = merge(&initial, &reranked, usize::MAX);
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn empty_initial_returns_reranked_unchanged() {
        let reranked = hits(&["/a", "/b"]);
        let merged = merge(&[], &reranked, 3);
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["/a", "/b"]);
    }

    #[test]
    fn empty_reranked_returns_initial_unchanged() {
        let initial = entries(&["/a", "/b"]);
        let merged = merge(&initial, &[], 3);
        assert_eq!(merged, initial);
    }

    #[test]
    fn displacement_is_measured_per_url_not_per_chunk_id() {
        // Two chunks of the same page (distinct ids) share a url; the
        // page's position should be judged once, by its first occurrence.
        let initial = vec![
            MergeEntry { id: "/a#0".into(), url: "/a".into(), score: 0.9 },
            MergeEntry { id: "/a#1".into(), url: "/a".into(), score: 0.8 },
            MergeEntry { id: "/b#0".into(), url: "/b".into(), score: 0.5 },
        ];
        let reranked = vec![
            MergeEntry { id: "/a#1".into(), url: "/a".into(), score: 0.95 },
            MergeEntry { id: "/a#0".into(), url: "/a".into(), score: 0.9 },
            MergeEntry { id: "/b#0".into(), url: "/b".into(), score: 0.4 },
        ];
        // "/a" occupies position 0 in both orderings (first occurrence),
        // so displacement is 0 for every url and the initial order is kept.
        let merged = merge(&initial, &reranked, 0);
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["/a#0", "/a#1", "/b#0"]);
        let a0 = merged.iter().find(|e| e.id == "/a#0").unwrap();
        assert_eq!(a0.score, 0.9);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which markdown constructs must never be split across a chunk boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectedKind {
    Code,
    Table,
    Blockquote,
}

/// Chunker configuration (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
    pub min_chars: usize,
    pub heading_path_depth: usize,
    pub dont_split_inside: HashSet<ProtectedKind>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 1500,
            overlap_chars: 150,
            min_chars: 200,
            heading_path_depth: 4,
            dont_split_inside: [ProtectedKind::Code, ProtectedKind::Table, ProtectedKind::Blockquote]
                .into_iter()
                .collect(),
        }
    }
}

impl ChunkingConfig {
    pub fn protects(&self, kind: ProtectedKind) -> bool {
        self.dont_split_inside.contains(&kind)
    }
}

/// Configuration models for every key recognized under §6. All fields are
/// optional on disk; `Default` fills the rest.
use beacon_chunking::ChunkingConfig;
use beacon_extract::{ExtractConfig, TransformConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BeaconConfig {
    pub project: ProjectConfig,
    pub scope: ScopeConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector: VectorConfig,
    #[serde(default)]
    pub rerank: RerankConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub mcp: McpConfig,
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { id: String::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    #[default]
    Fixed,
    Env,
    Git,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    pub mode: ScopeMode,
    pub fixed: String,
    pub env_var: Option<String>,
    pub sanitize: bool,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self { mode: ScopeMode::Fixed, fixed: "main".to_string(), env_var: None, sanitize: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMode {
    #[default]
    StaticOutput,
    Crawl,
    ContentFiles,
    Build,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    pub mode: SourceMode,
    pub static_output_dir: Option<String>,
    pub base_dir: Option<String>,
    pub sitemap_url: Option<String>,
    pub seed_urls: Vec<String>,
    pub build_base_url: Option<String>,
    pub max_depth: Option<usize>,
    pub max_pages_discover: Option<usize>,
    pub exclude: Vec<String>,
    pub strict_route_mapping: bool,
    /// Filesystem route tree to map pages against (C6). Defaults to
    /// `base_dir` for `content-files` mode; unset for modes with no
    /// filesystem route tree, in which case route mapping is skipped.
    pub routes_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingsProviderKind {
    #[default]
    Local,
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub provider: EmbeddingsProviderKind,
    pub model: String,
    pub api_key_env: Option<String>,
    pub batch_size: usize,
    pub concurrency: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingsProviderKind::Local,
            model: "local-hash-384".to_string(),
            api_key_env: None,
            batch_size: 96,
            concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VectorProviderKind {
    #[default]
    Local,
    Pinecone,
    Milvus,
    Turso,
    Upstash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    pub provider: VectorProviderKind,
    pub url: Option<String>,
    pub api_key_env: Option<String>,
    pub dimension: usize,
    pub local_db_path: Option<String>,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self { provider: VectorProviderKind::Local, url: None, api_key_env: None, dimension: 384, local_db_path: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RerankProviderKind {
    #[default]
    None,
    Jina,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    pub provider: RerankProviderKind,
    pub top_n: usize,
    pub api_key_env: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub max_displacement: usize,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self { provider: RerankProviderKind::None, top_n: 10, api_key_env: None, api_base: None, model: None, max_displacement: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingWeights {
    pub incoming_links: f32,
    pub depth: f32,
    pub rerank: f32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        // See DESIGN.md: the combination formula is an unspecified Open
        // Question in the source; these weights are exposed as linear
        // factors with rerank dominant and the two boosts as tie-breakers.
        Self { incoming_links: 0.1, depth: -0.05, rerank: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RankingConfig {
    pub enable_incoming_link_boost: bool,
    pub enable_depth_boost: bool,
    pub weights: RankingWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    #[default]
    Stdio,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpHttpConfig {
    pub port: u16,
    pub path: String,
}

impl Default for McpHttpConfig {
    fn default() -> Self {
        Self { port: 7777, path: "/mcp".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct McpConfig {
    pub enable: bool,
    pub transport: McpTransport,
    pub http: McpHttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    pub dir: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { dir: ".beacon".to_string() }
    }
}

pub mod adapters;
pub mod model;
pub mod traits;
pub mod util;

pub use model::{HealthStatus, QueryOptions, ScopeInfo, VectorHit, VectorMetadata, VectorRecord};
pub use traits::VectorStore;
pub use util::{cosine_similarity, dir_buckets};

pub mod memory;
pub mod qdrant;

#[cfg(feature = "embedded")]
pub mod embedded;

pub use memory::InMemoryVectorStore;
pub use qdrant::{QdrantAdapter, QdrantConfig};

#[cfg(feature = "embedded")]
pub use embedded::EmbeddedVectorStore;

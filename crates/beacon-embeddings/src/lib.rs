pub mod local;
pub mod openai;
pub mod traits;

pub use local::LocalEmbeddingsProvider;
pub use openai::{OpenAiEmbeddingsConfig, OpenAiEmbeddingsProvider};
pub use traits::{EmbeddingTask, EmbeddingsProvider};

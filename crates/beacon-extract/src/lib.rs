pub mod config;
pub mod html;
pub mod markdown;
pub mod route;

pub use config::{ExtractConfig, ExtractOutcome, TransformConfig};
pub use html::extract_html;
pub use markdown::extract_markdown;
pub use route::RouteMapper;

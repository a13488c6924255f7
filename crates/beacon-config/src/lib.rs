pub mod loader;
pub mod models;

pub use loader::{load_config, load_config_from_file, validate, ConfigError, ConfigResolver};
pub use models::*;

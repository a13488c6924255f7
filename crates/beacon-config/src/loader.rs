/// Layered configuration loading: defaults, then an optional TOML file,
/// then `BEACON_`-prefixed environment variables, each layer overriding
/// the last (§6).
use crate::models::BeaconConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),
    #[error("configuration parsing error: {0}")]
    ParseError(String),
    #[error("validation error: {0}")]
    ValidationError(String),
}

const ENV_PREFIX: &str = "BEACON_";
const DEFAULT_FILE_NAMES: &[&str] = &["beacon.toml", ".beacon.toml"];

pub struct ConfigResolver {
    file_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Searches the current directory for a default config file name.
    pub fn new() -> Self {
        let file_path = DEFAULT_FILE_NAMES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists());
        Self { file_path }
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self { file_path: Some(path.into()) }
    }

    pub fn without_file() -> Self {
        Self { file_path: None }
    }

    pub fn load(&self) -> Result<BeaconConfig, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(BeaconConfig::default()));

        if let Some(path) = &self.file_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            } else if self.file_path_was_explicit() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: BeaconConfig =
            figment.extract().map_err(|e| ConfigError::ParseError(e.to_string()))?;
        validate(&config)?;
        Ok(config)
    }

    fn file_path_was_explicit(&self) -> bool {
        match &self.file_path {
            Some(p) => !DEFAULT_FILE_NAMES.iter().any(|d| Path::new(d) == p.as_path()),
            None => false,
        }
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate(config: &BeaconConfig) -> Result<(), ConfigError> {
    if config.project.id.trim().is_empty() {
        return Err(ConfigError::ValidationError("project.id is required".to_string()));
    }

    match config.scope.mode {
        crate::models::ScopeMode::Env => {
            if config.scope.env_var.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(ConfigError::ValidationError(
                    "scope.envVar must be set when scope.mode = env".to_string(),
                ));
            }
        }
        crate::models::ScopeMode::Fixed | crate::models::ScopeMode::Git => {
            if config.scope.fixed.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "scope.fixed must be set (used directly for fixed mode, as a fallback for git mode)".to_string(),
                ));
            }
        }
    }

    match config.source.mode {
        crate::models::SourceMode::StaticOutput if config.source.static_output_dir.is_none() => {
            return Err(ConfigError::ValidationError(
                "source.staticOutputDir is required when source.mode = static-output".to_string(),
            ));
        }
        crate::models::SourceMode::ContentFiles if config.source.base_dir.is_none() => {
            return Err(ConfigError::ValidationError(
                "source.baseDir is required when source.mode = content-files".to_string(),
            ));
        }
        crate::models::SourceMode::Build if config.source.build_base_url.is_none() => {
            return Err(ConfigError::ValidationError(
                "source.build.baseUrl is required when source.mode = build".to_string(),
            ));
        }
        _ => {}
    }

    if config.embeddings.batch_size == 0 {
        return Err(ConfigError::ValidationError("embeddings.batchSize must be a positive integer".to_string()));
    }
    if config.embeddings.concurrency == 0 {
        return Err(ConfigError::ValidationError("embeddings.concurrency must be a positive integer".to_string()));
    }

    Ok(())
}

pub fn load_config() -> Result<BeaconConfig, ConfigError> {
    ConfigResolver::new().load()
}

pub fn load_config_from_file(path: impl Into<PathBuf>) -> Result<BeaconConfig, ConfigError> {
    ConfigResolver::with_file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_id_fails_validation() {
        let config = BeaconConfig::default();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn explicit_missing_file_is_reported() {
        let resolver = ConfigResolver::with_file("/nonexistent/beacon.toml");
        let result = resolver.load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn load_without_file_falls_back_to_env_and_defaults() {
        std::env::set_var("BEACON_PROJECT__ID", "demo-project");
        let resolver = ConfigResolver::without_file();
        let config = resolver.load().unwrap();
        assert_eq!(config.project.id, "demo-project");
        std::env::remove_var("BEACON_PROJECT__ID");
    }
}

/// Scope resolution (C10, §6): turns `scope.mode` plus the project id into
/// a concrete `Scope` for the run.
use beacon_config::{ScopeConfig, ScopeMode};
use beacon_core::{BeaconError, Result, Scope};

pub fn resolve_scope(project_id: &str, config: &ScopeConfig) -> Result<Scope> {
    let raw_name = match config.mode {
        ScopeMode::Fixed => config.fixed.clone(),
        ScopeMode::Env => {
            let var = config.env_var.as_deref().unwrap_or("");
            if var.is_empty() {
                return Err(BeaconError::config_missing("scope.envVar must be set when scope.mode = env"));
            }
            match std::env::var(var) {
                Ok(value) if !value.trim().is_empty() => value,
                _ => {
                    return Err(BeaconError::config_missing(format!(
                        "environment variable {var} is unset or empty"
                    )))
                }
            }
        }
        ScopeMode::Git => current_git_branch().unwrap_or_else(|| config.fixed.clone()),
    };

    Ok(if config.sanitize {
        Scope::new(project_id, raw_name)
    } else {
        Scope::from_sanitized(project_id, raw_name)
    })
}

fn current_git_branch() -> Option<String> {
    let repo = git2::Repository::discover(".").ok()?;
    let head = repo.head().ok()?;
    if head.is_branch() {
        head.shorthand().map(|s| s.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mode_uses_configured_name() {
        let config = ScopeConfig { mode: ScopeMode::Fixed, fixed: "Main Branch".into(), env_var: None, sanitize: true };
        let scope = resolve_scope("proj", &config).unwrap();
        assert_eq!(scope.scope_name, "main-branch");
    }

    #[test]
    fn env_mode_fails_closed_on_missing_var() {
        std::env::remove_var("BEACON_TEST_SCOPE_VAR_UNSET");
        let config = ScopeConfig {
            mode: ScopeMode::Env,
            fixed: "main".into(),
            env_var: Some("BEACON_TEST_SCOPE_VAR_UNSET".into()),
            sanitize: true,
        };
        let result = resolve_scope("proj", &config);
        assert!(result.is_err());
    }

    #[test]
    fn env_mode_reads_set_variable() {
        std::env::set_var("BEACON_TEST_SCOPE_VAR", "feature/foo");
        let config = ScopeConfig {
            mode: ScopeMode::Env,
            fixed: "main".into(),
            env_var: Some("BEACON_TEST_SCOPE_VAR".into()),
            sanitize: true,
        };
        let scope = resolve_scope("proj", &config).unwrap();
        assert_eq!(scope.scope_name, "feature-foo");
        std::env::remove_var("BEACON_TEST_SCOPE_VAR");
    }

    #[test]
    fn unsanitized_scope_is_used_verbatim() {
        let config = ScopeConfig { mode: ScopeMode::Fixed, fixed: "Already-Fine".into(), env_var: None, sanitize: false };
        let scope = resolve_scope("proj", &config).unwrap();
        assert_eq!(scope.scope_name, "Already-Fine");
    }
}

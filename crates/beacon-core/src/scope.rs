use serde::{Deserialize, Serialize};

/// A `(projectId, scopeName)` namespace isolating indexed content (C10).
///
/// Resolved once per pipeline/search run and immutable within that run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub project_id: String,
    pub scope_name: String,
}

impl Scope {
    pub fn new(project_id: impl Into<String>, scope_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            scope_name: sanitize_scope_name(&scope_name.into()),
        }
    }

    /// Construct without re-sanitizing; used when reconstructing a `Scope`
    /// from a value that is already known-sanitized (e.g. round-tripped
    /// through the vector store).
    pub fn from_sanitized(project_id: impl Into<String>, scope_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            scope_name: scope_name.into(),
        }
    }

    /// Stable `projectId ":" scopeName` key used by adapters that need a
    /// single string to namespace records (e.g. a collection name).
    pub fn scope_id(&self) -> String {
        format!("{}:{}", self.project_id, self.scope_name)
    }
}

/// Sanitize a scope name: lowercase ASCII, `[a-z0-9-]` only, other runs of
/// characters collapsed to a single `-`, leading/trailing `-` trimmed.
pub fn sanitize_scope_name(raw: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_dash = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_mixed_input() {
        assert_eq!(sanitize_scope_name("Feature/Add-Login!!"), "feature-add-login");
        assert_eq!(sanitize_scope_name("  spaced  out  "), "spaced-out");
        assert_eq!(sanitize_scope_name("already-ok"), "already-ok");
        assert_eq!(sanitize_scope_name("---trim---"), "trim");
    }

    #[test]
    fn scope_id_is_stable() {
        let s = Scope::new("proj", "Main Branch");
        assert_eq!(s.scope_name, "main-branch");
        assert_eq!(s.scope_id(), "proj:main-branch");
    }
}

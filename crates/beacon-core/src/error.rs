use thiserror::Error;

/// Stable error kind identifiers, each carrying the HTTP-style status code
/// a search/index surface should report for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    ConfigMissing,
    RouteMappingFailed,
    BuildManifestNotFound,
    BuildServerFailed,
    VectorBackendUnavailable,
    EmbeddingProviderFailed,
    RerankFailed,
    Internal,
    Cancelled,
}

impl ErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            ErrorKind::InvalidRequest => 400,
            ErrorKind::ConfigMissing => 400,
            ErrorKind::RouteMappingFailed => 400,
            ErrorKind::BuildManifestNotFound => 400,
            ErrorKind::BuildServerFailed => 500,
            ErrorKind::VectorBackendUnavailable => 503,
            ErrorKind::EmbeddingProviderFailed => 502,
            ErrorKind::RerankFailed => 502,
            ErrorKind::Internal => 500,
            ErrorKind::Cancelled => 499,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::ConfigMissing => "CONFIG_MISSING",
            ErrorKind::RouteMappingFailed => "ROUTE_MAPPING_FAILED",
            ErrorKind::BuildManifestNotFound => "BUILD_MANIFEST_NOT_FOUND",
            ErrorKind::BuildServerFailed => "BUILD_SERVER_FAILED",
            ErrorKind::VectorBackendUnavailable => "VECTOR_BACKEND_UNAVAILABLE",
            ErrorKind::EmbeddingProviderFailed => "EMBEDDING_PROVIDER_FAILED",
            ErrorKind::RerankFailed => "RERANK_FAILED",
            ErrorKind::Internal => "INTERNAL_ERROR",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }
}

/// Error type shared across every Beacon crate.
#[derive(Error, Debug)]
#[error("{kind_code}: {message}")]
pub struct BeaconError {
    pub kind: ErrorKind,
    pub kind_code: &'static str,
    pub message: String,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BeaconError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind_code: kind.code(),
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        mut self,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigMissing, message)
    }

    pub fn route_mapping_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RouteMappingFailed, message)
    }

    pub fn build_manifest_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BuildManifestNotFound, message)
    }

    pub fn build_server_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BuildServerFailed, message)
    }

    pub fn vector_backend_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VectorBackendUnavailable, message)
    }

    pub fn embedding_provider_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmbeddingProviderFailed, message)
    }

    pub fn rerank_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RerankFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Whether this error represents a transient condition worth retrying
    /// (429 / 5xx / the two upstream-failure kinds used by HTTP adapters).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::VectorBackendUnavailable
                | ErrorKind::EmbeddingProviderFailed
                | ErrorKind::RerankFailed
        )
    }
}

pub type Result<T> = std::result::Result<T, BeaconError>;

impl From<serde_json::Error> for BeaconError {
    fn from(e: serde_json::Error) -> Self {
        BeaconError::internal(format!("serialization error: {e}"))
    }
}

impl From<std::io::Error> for BeaconError {
    fn from(e: std::io::Error) -> Self {
        BeaconError::internal(format!("io error: {e}"))
    }
}

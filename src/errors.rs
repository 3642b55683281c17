use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    UpstreamUnavailable,
    ConfigInvalid,
    DocumentInvalid,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorCode::ConfigInvalid => "CONFIG_INVALID",
            ErrorCode::DocumentInvalid => "DOCUMENT_INVALID",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn retry_hint_ms(&self) -> u64 {
        match self {
            ErrorCode::ConfigInvalid | ErrorCode::DocumentInvalid => 0,
            ErrorCode::UpstreamUnavailable | ErrorCode::InternalError => 60_000,
        }
    }
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid document: {0}")]
    Document(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

impl PricingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PricingError::Upstream(_) => ErrorCode::UpstreamUnavailable,
            PricingError::Config(_) => ErrorCode::ConfigInvalid,
            PricingError::Document(_) => ErrorCode::DocumentInvalid,
            PricingError::Io(_) | PricingError::Any(_) => ErrorCode::InternalError,
        }
    }

    pub fn retry_hint_ms(&self) -> u64 {
        self.code().retry_hint_ms()
    }
}

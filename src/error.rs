use std::fmt;

/// Ошибки клиента каталога. Каждая сетевая/парсинг-ошибка приводится к одному
/// из этих видов на месте вызова, наружу не пролетает ни одна паника.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Required field missing or malformed — blocked at the input boundary,
    /// never reaches the network.
    Validation(String),
    /// Delete attempted with no stored access token.
    AuthMissing(String),
    /// Network unreachable, timeout, or the response body was not readable.
    ConnectionFailed(String),
    /// Search endpoint answered non-2xx.
    SearchRejected(String),
    /// Create/update/delete or auth endpoint answered non-2xx; carries the
    /// server's message when the body had one.
    MutationRejected(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::AuthMissing(msg) => write!(f, "Auth Error: {}", msg),
            ApiError::ConnectionFailed(msg) => write!(f, "Connection Failed: {}", msg),
            ApiError::SearchRejected(msg) => write!(f, "Search Rejected: {}", msg),
            ApiError::MutationRejected(msg) => write!(f, "Mutation Rejected: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::ConnectionFailed(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

// Специфичные ошибки для клиента BD Doc
impl ApiError {
    pub fn no_access_token() -> Self {
        ApiError::AuthMissing("No access token stored, log in first".to_string())
    }

    /// Short machine-readable kind for the view layer.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::AuthMissing(_) => "auth-missing",
            ApiError::ConnectionFailed(_) => "connection-failed",
            ApiError::SearchRejected(_) => "search-rejected",
            ApiError::MutationRejected(_) => "mutation-rejected",
        }
    }
}

// AI Service Error Types
//
// Every failure of an orchestration call maps onto one of four kinds:
// validation, configuration, provider, malformed response.

use thiserror::Error;

/// Remediation hint shown whenever the provider credential is missing or rejected
pub const CONFIGURATION_HINT: &str =
    "Set GROQ_API_KEY in .env (get a key at console.groq.com)";

/// Detail shown when the code-edit response violates the JSON contract
pub const RETRY_HINT: &str = "AI returned an unusable response. Please try again or rephrase.";

/// AI Service Error
#[derive(Error, Debug)]
pub enum AIError {
    /// A required request field is missing or empty
    #[error("{0} required")]
    MissingField(String),

    /// No provider credential configured
    #[error("GROQ_API_KEY is not set")]
    NotConfigured,

    /// The provider rejected the credential
    #[error("Invalid or expired API key: {0}")]
    AuthFailed(String),

    /// Connection failed
    #[error("Cannot connect to AI service: {0}")]
    ConnectionFailed(String),

    /// Rate limited
    #[error("API rate limit exceeded, please try again later")]
    RateLimited,

    /// Request timeout
    #[error("AI service response timeout")]
    Timeout,

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// API error from provider
    #[error("AI service error: {0}")]
    ApiError(String),

    /// Provider answered but the envelope could not be decoded
    #[error("Response parse error: {0}")]
    ParseError(String),

    /// Code-edit response was not valid JSON
    #[error("AI returned invalid JSON. Please try again or rephrase.")]
    InvalidJson(String),

    /// Code-edit response was JSON but broke the action schema
    #[error("{0}")]
    InvalidSchema(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for AIError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AIError::Timeout
        } else if err.is_connect() {
            AIError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            AIError::ParseError(err.to_string())
        } else {
            AIError::ApiError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AIError {
    fn from(err: serde_json::Error) -> Self {
        AIError::ParseError(err.to_string())
    }
}

/// Result type for AI operations
pub type AIResult<T> = Result<T, AIError>;

/// The four failure kinds surfaced at the orchestration boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Provider,
    MalformedResponse,
}

impl ErrorKind {
    /// HTTP status the API layer reports for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Configuration => 503,
            ErrorKind::Provider | ErrorKind::MalformedResponse => 502,
        }
    }
}

/// AI Error codes for clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIErrorCode {
    MissingField,
    NotConfigured,
    AuthFailed,
    ConnectionFailed,
    RateLimited,
    Timeout,
    ModelNotFound,
    ApiError,
    ParseError,
    InvalidJson,
    InvalidSchema,
    InvalidConfig,
}

impl AIErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AIErrorCode::MissingField => "AI_MISSING_FIELD",
            AIErrorCode::NotConfigured => "AI_NOT_CONFIGURED",
            AIErrorCode::AuthFailed => "AI_AUTH_FAILED",
            AIErrorCode::ConnectionFailed => "AI_CONNECTION_FAILED",
            AIErrorCode::RateLimited => "AI_RATE_LIMITED",
            AIErrorCode::Timeout => "AI_TIMEOUT",
            AIErrorCode::ModelNotFound => "AI_MODEL_NOT_FOUND",
            AIErrorCode::ApiError => "AI_API_ERROR",
            AIErrorCode::ParseError => "AI_PARSE_ERROR",
            AIErrorCode::InvalidJson => "AI_INVALID_JSON",
            AIErrorCode::InvalidSchema => "AI_INVALID_SCHEMA",
            AIErrorCode::InvalidConfig => "AI_INVALID_CONFIG",
        }
    }
}

impl AIError {
    pub fn code(&self) -> AIErrorCode {
        match self {
            AIError::MissingField(_) => AIErrorCode::MissingField,
            AIError::NotConfigured => AIErrorCode::NotConfigured,
            AIError::AuthFailed(_) => AIErrorCode::AuthFailed,
            AIError::ConnectionFailed(_) => AIErrorCode::ConnectionFailed,
            AIError::RateLimited => AIErrorCode::RateLimited,
            AIError::Timeout => AIErrorCode::Timeout,
            AIError::ModelNotFound(_) => AIErrorCode::ModelNotFound,
            AIError::ApiError(_) => AIErrorCode::ApiError,
            AIError::ParseError(_) => AIErrorCode::ParseError,
            AIError::InvalidJson(_) => AIErrorCode::InvalidJson,
            AIError::InvalidSchema(_) => AIErrorCode::InvalidSchema,
            AIError::InvalidConfig(_) => AIErrorCode::InvalidConfig,
        }
    }

    /// Classify into one of the four boundary kinds
    ///
    /// A rejected credential is reported like a missing one: the remedy is the same.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AIError::MissingField(_) => ErrorKind::Validation,
            AIError::NotConfigured | AIError::AuthFailed(_) | AIError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            AIError::InvalidJson(_) | AIError::InvalidSchema(_) => ErrorKind::MalformedResponse,
            AIError::ConnectionFailed(_)
            | AIError::RateLimited
            | AIError::Timeout
            | AIError::ModelNotFound(_)
            | AIError::ApiError(_)
            | AIError::ParseError(_) => ErrorKind::Provider,
        }
    }

    /// Short headline for clients
    pub fn headline(&self) -> String {
        match self.kind() {
            ErrorKind::Validation => self.to_string(),
            ErrorKind::Configuration => "AI service not configured".to_string(),
            ErrorKind::Provider => "AI service temporarily unavailable".to_string(),
            ErrorKind::MalformedResponse => "AI returned an unusable response".to_string(),
        }
    }

    /// Client-facing detail; never carries raw parse diagnostics
    pub fn detail(&self) -> Option<String> {
        match self.kind() {
            ErrorKind::Validation => None,
            ErrorKind::Configuration => Some(CONFIGURATION_HINT.to_string()),
            ErrorKind::Provider => Some(self.to_string()),
            ErrorKind::MalformedResponse => match self {
                AIError::InvalidJson(_) => Some(self.to_string()),
                _ => Some(format!("{} {}", self, RETRY_HINT)),
            },
        }
    }
}

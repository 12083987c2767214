//! Centralized Error Handling Module
//!
//! Every startup or infrastructure failure carries a unique error code so it
//! can be grepped in logs. The request path itself never errors: malformed
//! referrers and query strings degrade to empty values instead.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - CFG_xxx: Configuration errors
//! - SRV_xxx: Server lifecycle errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Configuration value present but empty
    ConfigEmptyValue,

    // ============================================
    // Server Errors
    // ============================================
    /// Bind address could not be parsed or bound
    ServerBindFailed,
    /// Server stopped with an I/O error
    ServerIo,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigEmptyValue => "CFG_EMPTY_VALUE",
            Self::ServerBindFailed => "SRV_BIND_FAILED",
            Self::ServerIo => "SRV_IO",
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Environment variable holds an unusable value
    pub fn invalid_value(var: &str, value: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("{}={:?} is invalid, expected {}", var, value, expected),
        )
    }

    /// Environment variable set to an empty string
    pub fn empty_value(var: &str) -> Self {
        Self::new(ErrorCode::ConfigEmptyValue, format!("{} must not be empty", var))
    }

    pub fn bind_failed(addr: &str, source: std::io::Error) -> Self {
        Self::with_source(
            ErrorCode::ServerBindFailed,
            format!("Failed to bind {}", addr),
            source,
        )
    }
}

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::ServerIo, "IO error", err)
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(err: std::net::AddrParseError) -> Self {
        Self::with_source(ErrorCode::ServerBindFailed, "Invalid bind address", err)
    }
}

//! Error handling for the liquidation slippage estimator
//!
//! A single error type covers provider failures, degenerate market data,
//! caller misuse and AMM invariant violations. Report assembly turns any of
//! these into an absent cell instead of aborting the batch.

use std::fmt;
use std::io;

/// Main error type for the slippage estimator
#[derive(Debug, Clone, PartialEq)]
pub enum SlippageError {
    // Provider errors
    DataUnavailable(String),

    // Market data errors
    InsufficientData(String),
    InvalidMarketData(String),

    // Caller errors
    InvalidArgument(String, String), // (parameter_name, reason)

    // AMM errors
    UnknownAsset(String, String), // (asset, pool)
    InvalidSwap(String),

    // Configuration errors
    ConfigNotFound(String),
    ConfigParse(String),
    ConfigValidation(String),

    // IO errors
    FileRead(String),
    FileWrite(String),

    // General errors
    Internal(String),
}

impl SlippageError {
    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            SlippageError::ConfigNotFound(path) => {
                format!(
                    "Configuration file not found: {}\n\n\
                    💡 Quick fix:\n\
                    1. Run: slippage init\n\
                    2. Edit config.toml with your venues, pairs and pools\n\
                    3. Try again",
                    path
                )
            }
            SlippageError::ConfigValidation(msg) => {
                format!(
                    "Configuration validation error: {}\n\n\
                    💡 Check config.toml for:\n\
                    - Positive notional sizes\n\
                    - A fee rate between 0 and 1\n\
                    - At least one exchange/pair or AMM asset",
                    msg
                )
            }
            SlippageError::DataUnavailable(msg) => {
                format!(
                    "Market data unavailable: {}\n\n\
                    💡 The affected row is reported as empty.\n\
                    Check the data provider URL and your network connection",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, SlippageError::DataUnavailable(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            SlippageError::DataUnavailable(_) => "provider",

            SlippageError::InsufficientData(_)
            | SlippageError::InvalidMarketData(_) => "market_data",

            SlippageError::InvalidArgument(_, _) => "argument",

            SlippageError::UnknownAsset(_, _)
            | SlippageError::InvalidSwap(_) => "amm",

            SlippageError::ConfigNotFound(_)
            | SlippageError::ConfigParse(_)
            | SlippageError::ConfigValidation(_) => "config",

            SlippageError::FileRead(_)
            | SlippageError::FileWrite(_) => "io",

            SlippageError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for SlippageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlippageError::DataUnavailable(msg) => {
                write!(f, "Data unavailable: {}", msg)
            }

            SlippageError::InsufficientData(msg) => {
                write!(f, "Insufficient data: {}", msg)
            }
            SlippageError::InvalidMarketData(msg) => {
                write!(f, "Invalid market data: {}", msg)
            }

            SlippageError::InvalidArgument(param, reason) => {
                write!(f, "Invalid argument '{}': {}", param, reason)
            }

            SlippageError::UnknownAsset(asset, pool) => {
                write!(f, "Unknown asset '{}' for pool {}", asset, pool)
            }
            SlippageError::InvalidSwap(msg) => {
                write!(f, "Invalid swap: {}", msg)
            }

            SlippageError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path)
            }
            SlippageError::ConfigParse(msg) => {
                write!(f, "Configuration parse error: {}", msg)
            }
            SlippageError::ConfigValidation(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }

            SlippageError::FileRead(msg) => {
                write!(f, "File read error: {}", msg)
            }
            SlippageError::FileWrite(msg) => {
                write!(f, "File write error: {}", msg)
            }

            SlippageError::Internal(msg) => {
                write!(f, "Internal error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SlippageError {}

// Conversion implementations for common error types

impl From<io::Error> for SlippageError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                SlippageError::FileRead(err.to_string())
            }
            _ => SlippageError::FileWrite(format!("IO error: {}", err)),
        }
    }
}

impl From<reqwest::Error> for SlippageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SlippageError::DataUnavailable(format!("request timed out: {}", err))
        } else if err.is_status() {
            SlippageError::DataUnavailable(format!("bad response status: {}", err))
        } else if err.is_decode() {
            SlippageError::DataUnavailable(format!("malformed response body: {}", err))
        } else {
            SlippageError::DataUnavailable(err.to_string())
        }
    }
}

// Report writer path; depth parsing maps its own csv errors to DataUnavailable
impl From<csv::Error> for SlippageError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            SlippageError::FileWrite(format!("CSV IO error: {}", err))
        } else {
            SlippageError::DataUnavailable(format!("CSV parse error: {}", err))
        }
    }
}

impl From<serde_json::Error> for SlippageError {
    fn from(err: serde_json::Error) -> Self {
        SlippageError::DataUnavailable(format!("JSON parse error: {}", err))
    }
}

impl From<toml::de::Error> for SlippageError {
    fn from(err: toml::de::Error) -> Self {
        SlippageError::ConfigParse(format!("TOML parse error: {}", err))
    }
}

impl From<crate::config::ConfigError> for SlippageError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::FileNotFound(path) => SlippageError::ConfigNotFound(path),
            ConfigError::FileRead(msg) => SlippageError::FileRead(msg),
            ConfigError::FileWrite(msg) => SlippageError::FileWrite(msg),
            ConfigError::Parse(msg) => SlippageError::ConfigParse(msg),
            ConfigError::Serialize(msg) => SlippageError::Internal(msg),
            ConfigError::Validation(msg) => SlippageError::ConfigValidation(msg),
        }
    }
}

/// Result type alias using SlippageError
pub type SlippageResult<T> = Result<T, SlippageError>;

/// Helper macro for creating context-rich errors
#[macro_export]
macro_rules! slippage_error {
    (invalid_arg, $param:expr, $reason:expr) => {
        $crate::error::SlippageError::InvalidArgument($param.to_string(), $reason.to_string())
    };
    (unknown_asset, $asset:expr, $pool:expr) => {
        $crate::error::SlippageError::UnknownAsset($asset.to_string(), $pool.to_string())
    };
    (market_data, $($arg:tt)*) => {
        $crate::error::SlippageError::InvalidMarketData(format!($($arg)*))
    };
}

//! Core error types for Quarry.

use thiserror::Error;

/// Result type alias using `QuarryError`.
pub type QuarryResult<T> = std::result::Result<T, QuarryError>;

/// Core error type for Quarry operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuarryError {
    /// A binder name repeats along a single root-to-leaf path.
    #[error("HygieneViolation: {0}")]
    HygieneViolation(String),

    /// Invalid parameter provided (wrong node shape, bad config value).
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// Internal error (bug in Quarry).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl QuarryError {
    /// Create a new `HygieneViolation`.
    pub fn hygiene<S: Into<String>>(msg: S) -> Self {
        Self::HygieneViolation(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether this error signals a bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalError(_) | Self::HygieneViolation(_))
    }
}

/// Ensure a condition holds, returning an `InternalError` if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::QuarryError::$variant(format!($($msg)*)));
        }
    };
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::QuarryError::InternalError($msg.to_string()));
        }
    };
}

/// Return early with an `InvalidParameter` error.
#[macro_export]
macro_rules! invalid_param_err {
    ($($arg:tt)*) => {
        return Err($crate::QuarryError::InvalidParameter(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_positive(n: i64) -> QuarryResult<i64> {
        ensure!(n > 0, InvalidParameter: "expected positive, got {}", n);
        Ok(n)
    }

    #[test]
    fn test_error_display() {
        let err = QuarryError::hygiene("binder `a` repeats on path Map > Filter");
        assert_eq!(
            err.to_string(),
            "HygieneViolation: binder `a` repeats on path Map > Filter"
        );
    }

    #[test]
    fn test_error_constructors() {
        assert!(QuarryError::internal("unexpected shape").is_internal());
        assert!(QuarryError::hygiene("dup").is_internal());
        assert!(!QuarryError::invalid_parameter("max_iterations").is_internal());
    }

    #[test]
    fn test_ensure_macro() {
        assert_eq!(check_positive(3).unwrap(), 3);
        let err = check_positive(0).unwrap_err();
        assert!(matches!(err, QuarryError::InvalidParameter(_)));
        assert_eq!(err.to_string(), "InvalidParameter: expected positive, got 0");
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: QuarryError = parse.unwrap_err().into();
        assert!(matches!(err, QuarryError::SerdeJsonError(_)));
    }
}

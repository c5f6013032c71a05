//! Schema validation errors.

use thiserror::Error;

/// A metadata payload did not match the shape declared for its message key.
///
/// Never propagated to callers: logging methods embed the error in the
/// fallback payload instead of failing the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("metadata for `{key}` does not match its declared shape: {reason}")]
pub struct SchemaError {
    /// Message key whose schema rejected the payload.
    pub key: String,
    /// Deserialization failure detail.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_key() {
        let err = SchemaError {
            key: "stats".to_owned(),
            reason: "missing field `a`".to_owned(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("`stats`"));
        assert!(rendered.contains("missing field `a`"));
    }
}

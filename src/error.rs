use thiserror::Error;

/// Unified error type for auto-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid release intent: {0}")]
    InvalidIntent(String),

    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),

    #[error("Tag operation failed: {0}")]
    TagOperationFailed(String),

    #[error("Release creation failed: {0}")]
    ReleaseCreationFailed(String),

    #[error("Major version reconciliation failed: {0}")]
    MajorReconciliationFailed(String),

    #[error("Asset copy failed: {0}")]
    AssetCopyFailed(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Release API request failed: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in auto-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create an invalid intent error with context
    pub fn invalid_intent(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidIntent(msg.into())
    }

    /// Create an invalid version format error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidVersionFormat(msg.into())
    }

    /// Create a tag operation error with context
    pub fn tag_operation(msg: impl Into<String>) -> Self {
        ReleaseError::TagOperationFailed(msg.into())
    }

    /// Create a release creation error with context
    pub fn release_creation(msg: impl Into<String>) -> Self {
        ReleaseError::ReleaseCreationFailed(msg.into())
    }

    /// Create a major reconciliation error with context
    pub fn major_reconciliation(msg: impl Into<String>) -> Self {
        ReleaseError::MajorReconciliationFailed(msg.into())
    }

    /// Create an asset copy error with context
    pub fn asset_copy(msg: impl Into<String>) -> Self {
        ReleaseError::AssetCopyFailed(msg.into())
    }

    /// Create a release API error with context
    pub fn api(msg: impl Into<String>) -> Self {
        ReleaseError::Api(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseError::config("missing repository");
        assert_eq!(err.to_string(), "Configuration error: missing repository");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_git2() {
        let git_err = git2::Error::from_str("reference not found");
        let err: ReleaseError = git_err.into();
        assert!(err.to_string().starts_with("Git operation failed"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ReleaseError::invalid_intent("x"), "Invalid release intent"),
            (ReleaseError::invalid_version("x"), "Invalid version format"),
            (ReleaseError::tag_operation("x"), "Tag operation failed"),
            (ReleaseError::release_creation("x"), "Release creation failed"),
            (
                ReleaseError::major_reconciliation("x"),
                "Major version reconciliation failed",
            ),
            (ReleaseError::asset_copy("x"), "Asset copy failed"),
            (ReleaseError::api("x"), "Release API request failed"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_error_long_messages() {
        let long_msg = "a".repeat(1000);
        let err = ReleaseError::api(&long_msg);
        assert!(err.to_string().contains(&long_msg));
    }
}

//! Provider error types.

use crate::domain::DomainError;

/// Errors that can occur when fetching network data.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Reading the backing store failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse network JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Records are internally inconsistent
    #[error("invalid network data: {0}")]
    Invalid(#[from] DomainError),

    /// The upstream source could not be reached
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProviderError::Unavailable("schedule store timed out".into());
        assert_eq!(
            err.to_string(),
            "provider unavailable: schedule store timed out"
        );

        let err: ProviderError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON parse error"));

        let err: ProviderError = DomainError::DuplicateId {
            kind: "route",
            id: "R1".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid network data: duplicate route id: R1"
        );
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrossLensError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrossLensError {
    /// Caller-supplied data failed a precondition. Surfaced as a client error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Article body could not be retrieved. Recoverable per article.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Model capability misconfigured, unreachable, or returned unusable output.
    #[error("Service error: {0}")]
    Service(String),
}

impl CrossLensError {
    /// The bare reason, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(m) | Self::Extraction(m) | Self::Service(m) => m,
        }
    }

    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_strips_variant_prefix() {
        let err = CrossLensError::Service("Model response missing key_claims".to_string());
        assert_eq!(err.message(), "Model response missing key_claims");
        assert_eq!(
            err.to_string(),
            "Service error: Model response missing key_claims"
        );
    }

    #[test]
    fn only_extraction_is_recoverable() {
        assert!(CrossLensError::Extraction("timeout".into()).is_extraction());
        assert!(!CrossLensError::Service("boom".into()).is_extraction());
        assert!(!CrossLensError::InvalidInput("empty".into()).is_extraction());
    }
}

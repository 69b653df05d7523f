use passbook_core::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

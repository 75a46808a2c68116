use thiserror::Error;

/// Domain-level error taxonomy. The API layer maps these onto HTTP
/// status codes; reasoning failures are deliberately absent because the
/// resolution engine recovers them into the decision text.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("dispute already resolved: {0}")]
    AlreadyResolved(String),

    #[error("no reasoning provider configured: {0}")]
    ProviderUnavailable(String),
}

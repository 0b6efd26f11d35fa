use thiserror::Error;

/// Failures from the generation provider. None of these are allowed past the
/// dispatcher: each one is absorbed into a user-facing fallback sentence
/// before the transport boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    /// No API key is configured, or the provider could not be reached.
    /// A missing key short-circuits before any network call.
    #[error("generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("generation provider returned status {code}")]
    ProviderError { code: u16 },
    #[error("generation provider response had an unexpected shape")]
    MalformedResponse,
    #[error("generation call exceeded its time budget")]
    Timeout,
}

/// Cold-start population of the content cache failed. Only the catalog read
/// can fail here; a missing site-text resource is a valid empty state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("content source read failed: {0}")]
    Source(String),
}

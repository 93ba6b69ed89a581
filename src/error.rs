use thiserror::Error;

/// Failure modes of the generative gateway. Lore- and voice-stage errors
/// abort a run and are shown to the user verbatim; image-stage errors are
/// swallowed per angle and only degrade the gallery.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("the model returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("generation failed: {0}")]
    GenerationFailure(String),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

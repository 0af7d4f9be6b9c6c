#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform rejected the request ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("config error: {0}")]
    Config(String),
}

impl PlatformError {
    /// Add context to the error message, preserving the variant.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            PlatformError::Api { status, body } => PlatformError::Api {
                status,
                body: format!("{ctx}: {body}"),
            },
            PlatformError::Config(msg) => PlatformError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

/// Crate-wide result alias.
pub type NewsreelResult<T> = Result<T, NewsreelError>;

#[derive(thiserror::Error, Debug)]
pub enum NewsreelError {
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-2xx, network, timeout or decode failure from the news source.
    #[error("upstream fetch failed: {0}")]
    Upstream(String),

    #[error("render error: {0}")]
    Render(String),

    /// The host lacks a capability the capture pipeline requires.
    #[error("capture unsupported: {0}")]
    CaptureUnsupported(String),

    #[error("capture setup failed: {0}")]
    CaptureSetup(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NewsreelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn capture_unsupported(msg: impl Into<String>) -> Self {
        Self::CaptureUnsupported(msg.into())
    }

    pub fn capture_setup(msg: impl Into<String>) -> Self {
        Self::CaptureSetup(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

pub type DepthstackResult<T> = Result<T, DepthstackError>;

#[derive(thiserror::Error, Debug)]
pub enum DepthstackError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("dimension mismatch: {0}")]
    Dimensions(String),

    #[error("compositing error: {0}")]
    Compositing(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DepthstackError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn dimensions(msg: impl Into<String>) -> Self {
        Self::Dimensions(msg.into())
    }

    pub fn compositing(msg: impl Into<String>) -> Self {
        Self::Compositing(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

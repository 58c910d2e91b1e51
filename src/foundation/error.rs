pub type TileGridResult<T> = Result<T, TileGridError>;

#[derive(thiserror::Error, Debug)]
pub enum TileGridError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("image load error: {0}")]
    ImageLoad(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TileGridError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for TileGridError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RfStackError {
    // IO and serialization errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    // Adapter level errors, the engines themselves never fail
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input shape {h}x{w}x{c}, all dimensions must be positive")]
    InvalidInputShape { h: usize, w: usize, c: usize },

    #[error("No layers in the stack")]
    EmptyStack,
}

pub type Result<T> = std::result::Result<T, RfStackError>;

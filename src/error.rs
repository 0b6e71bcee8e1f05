use thiserror::Error;

/// Failure talking to the log endpoint or the image host.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("unreadable response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_body() {
            TransportError::Body(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("received unexpected data format (not an array): {0}")]
    Schema(String),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("image host rejected the upload")]
    Rejected,

    #[error("could not process image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum FlywayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing image host key; pass --image-key or set FLYWAY_IMAGE_KEY")]
    MissingImageKey,

    #[error("invalid season filter: {0}")]
    InvalidSeason(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FlywayError>;

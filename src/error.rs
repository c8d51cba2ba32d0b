use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("detection worker failed: {0}")]
    WorkerFailed(String),

    #[error("frame source error: {0}")]
    FrameSource(String),

    #[error("detection loop is not running")]
    LoopStopped,
}

pub type Result<T> = std::result::Result<T, DetectorError>;

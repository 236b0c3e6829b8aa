use crate::crop::RatioError;
use crate::output::OutputError;
use crate::state::StateError;
use thiserror::Error;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("image bounds {width}x{height} must be positive on both axes")]
    InvalidImageBounds { width: u32, height: u32 },
    #[error("no image is loaded")]
    NoImage,
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Ratio(#[from] RatioError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

//! Interactive crop-box engine: hit-testing, drag resizing with an optional
//! aspect lock, and two-way sync with a host's crop parameters.

pub mod config;
pub mod crop;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod output;
pub mod state;
pub mod sync;

pub use engine::{CropEngine, PointerResponse};
pub use error::{EngineError, EngineResult};

/// Builds an engine from the user's config file with logging installed.
pub fn engine_from_user_config() -> CropEngine {
    logging::init();
    let config = config::load_engine_config();
    tracing::info!(
        ratio = %config.default_ratio,
        lock = config.ratio_lock,
        "crop engine configured"
    );
    CropEngine::new(config)
}

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "dragcrop=info";

/// Installs the global `fmt` subscriber. `RUST_LOG` overrides the default
/// filter. Calling this again after a subscriber is set is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
pub(crate) fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("dragcrop=debug"))
        .with_test_writer()
        .try_init();
}

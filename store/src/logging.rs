//! Tracing setup shared by the workspace binaries.
//!
//! Diagnostics go to stderr and are filtered through `RUST_LOG`. Document
//! files under the data directory are the only persisted product output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "hpg_server=info,hpg_store=info,hpg_engine=warn";

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
///
/// # Example
/// ```bash
/// RUST_LOG=hpg_store=debug cargo run -p hpg-server
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

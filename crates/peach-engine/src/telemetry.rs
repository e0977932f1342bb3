//! Tracing setup for hosts embedding the engine.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "peach_engine=debug,peach_store=info,warn";

/// Install a fmt subscriber honouring `RUST_LOG`, falling back to
/// `default_directives`. Returns `false` if a global subscriber was already
/// installed, which is harmless.
pub fn init_tracing(default_directives: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok()
}

//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system, falling back to `level` when `RUST_LOG` is unset
///
/// Returns `false` if a logger was already installed.
pub fn init_with_level(level: &str) -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// Wrapper that renders a slice one entry per line in `{:?}` log output
pub struct PrettyList<'a, T>(pub &'a [T]);

impl<T: std::fmt::Debug> std::fmt::Debug for PrettyList<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        for entry in self.0 {
            writeln!(f, "  {entry:?}")?;
        }
        Ok(())
    }
}

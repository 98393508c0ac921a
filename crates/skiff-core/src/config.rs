//! Server configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default maximum request body size: 1MB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default timeout applied to file I/O on the dispatch path.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration applied to every request.
///
/// Built once before `listen` and copied into each request context; the
/// dispatch path never mutates it. Derives `Deserialize` so applications
/// can embed it in their own config files.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use skiff_core::Config;
///
/// let config = Config::new()
///     .max_body_size(10 * 1024 * 1024)
///     .io_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_body_size, 10 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum request body size in bytes; larger bodies fail collection
    /// with a body-too-large error.
    pub max_body_size: usize,
    /// Upper bound on each file read/write performed by the request
    /// context. The underlying server imposes no timeout of its own, so
    /// this is the only bound on static serving and uploads.
    pub io_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }
}

impl Config {
    /// Creates a config with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum request body size in bytes.
    #[must_use]
    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    /// Sets the file I/O timeout.
    #[must_use]
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }
}

use serde::Serialize;
use thiserror::Error;

pub mod config;
pub mod ffi;
pub mod fibonacci;
#[cfg(not(target_os = "windows"))]
pub mod loader;

pub use config::PluginConfig;
pub use ffi::FibStatus;
pub use fibonacci::{compute, compute_blocking, LONG_RUNNING_DELAY, MAX_N};
#[cfg(not(target_os = "windows"))]
pub use loader::NativeLibrary;

#[derive(Error, Debug)]
pub enum FibError {
    #[error("Invalid argument: n must be non-negative, got {0}")]
    InvalidArgument(i32),

    #[error("Overflow: F({n}) exceeds the supported bound (max n = {max})")]
    Overflow { n: i32, max: u32 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Library error: {0}")]
    Library(String),
}

impl FibError {
    /// Status code reported across the C ABI for this error.
    pub fn status(&self) -> FibStatus {
        match self {
            FibError::InvalidArgument(_) => FibStatus::InvalidArgument,
            FibError::Overflow { .. } => FibStatus::Overflow,
            _ => FibStatus::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, FibError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub integer_width: u32,
    pub max_n: u32,
    pub long_running_delay_ms: u64,
    pub exports: Vec<String>,
}

/// Symbols exported by the `cdylib`.
pub const EXPORTED_SYMBOLS: [&str; 5] = [
    "fib",
    "fib_long_running",
    "fib_checked",
    "fib_long_running_checked",
    "fib_max_n",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FibonacciPlugin {
    max_n: u32,
}

impl FibonacciPlugin {
    pub fn new() -> Self {
        Self { max_n: MAX_N }
    }

    pub fn with_config(config: &PluginConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            max_n: config.max_n,
        })
    }

    pub fn max_n(&self) -> u32 {
        self.max_n
    }

    /// Short-lived; fine to call on the caller's main thread.
    pub fn fib(&self, n: i32) -> Result<i32> {
        fibonacci::compute_bounded(n, self.max_n)
    }

    /// Occupies the calling thread for [`LONG_RUNNING_DELAY`] before computing.
    /// Call it from a worker thread, never from an interactive one.
    pub fn fib_long_running(&self, n: i32) -> Result<i32> {
        fibonacci::sleep_long_running();
        fibonacci::compute_bounded(n, self.max_n)
    }

    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            integer_width: i32::BITS,
            max_n: self.max_n,
            long_running_delay_ms: LONG_RUNNING_DELAY.as_millis() as u64,
            exports: EXPORTED_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for FibonacciPlugin {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration file loading for threadline
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables: `THREADLINE_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./threadline.toml` or `./.threadline.toml`
//! 4. Global: `$XDG_CONFIG_HOME/threadline/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLoggingConfig, FileReplConfig, FileServiceConfig,
    FileStorageConfig,
};
pub use loader::ConfigLoader;

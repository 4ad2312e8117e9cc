//! Configuration system for the cachet session store.
//!
//! Provides TOML-based configuration with:
//! - A `[session]` table (key prefix, TTL, in-process capacity)
//! - Config file layering (user config + project-local overrides)
//! - Encryption key resolution (env var, then config file, else generated)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigPaths, ConfigScope, ConfigSource, LoadedConfig, PROJECT_CONFIG_FILE, init_config,
    load_config, read_config, save_config, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{
    KEY_ENV_VAR, KeySource, build_encrypter, generate_encoded_key, resolve_encryption_key,
};
pub use types::*;

//! Locating, reading and writing cachet config files.
//!
//! Two files are consulted, the later overriding the earlier field by field
//! within `[session]`:
//! 1. the user file, `$CACHET_CONFIG_DIR/config.toml` or `<config dir>/cachet/config.toml`
//! 2. the project file, `./cachet.toml`
//!
//! A missing file is skipped silently. An unreadable or malformed one is
//! skipped with a warning so a typo never stops the store from starting.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{CachetConfig, ConfigError, Result};

/// Name of the project-local config file.
pub const PROJECT_CONFIG_FILE: &str = "cachet.toml";

const USER_CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "cachet";
const CONFIG_DIR_ENV: &str = "CACHET_CONFIG_DIR";

/// Comment block written at the top of every saved config file.
const FILE_HEADER: &str = "\
# Cachet configuration
#
# [session]
#   prefix          prepended to session ids to form cache keys
#   timeout_secs    record lifetime in the cache, in seconds
#   max_entries     capacity of the in-process cache backend
#   encryption_key  base64 key of 16 or 32 bytes; prefer the
#                   CACHET_ENCRYPTION_KEY env var (`cachet keygen`)

";

/// Which of the two config files a source refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    User,
    Project,
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScope::User => f.write_str("user"),
            ConfigScope::Project => f.write_str("project"),
        }
    }
}

/// One config file that was checked.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub scope: ConfigScope,
    pub path: PathBuf,
    /// Whether the file existed and parsed.
    pub loaded: bool,
}

/// Merged configuration plus how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CachetConfig,
    /// Files checked, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Skipped files and plaintext-key notices.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of the files that contributed to the config.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// The pair of config file locations to read.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    user: Option<PathBuf>,
    project: PathBuf,
}

impl ConfigPaths {
    /// Standard locations; `project_dir` defaults to the working directory.
    pub fn discover(project_dir: Option<&Path>) -> Self {
        let project = match project_dir {
            Some(dir) => dir.join(PROJECT_CONFIG_FILE),
            None => PathBuf::from(PROJECT_CONFIG_FILE),
        };
        Self {
            user: user_config_path(),
            project,
        }
    }

    /// Read the user file from `dir` instead of the discovered directory.
    pub fn with_user_dir(mut self, dir: &Path) -> Self {
        self.user = Some(dir.join(USER_CONFIG_FILE));
        self
    }

    /// Read both files and merge them.
    pub fn load(&self) -> Result<LoadedConfig> {
        let mut loaded = LoadedConfig {
            config: CachetConfig::new(),
            sources: Vec::with_capacity(2),
            warnings: Vec::new(),
        };

        let user = self.user.as_deref().map(|p| (ConfigScope::User, p));
        let project = Some((ConfigScope::Project, self.project.as_path()));

        for (scope, path) in user.into_iter().chain(project) {
            let layer = read_config(path).unwrap_or_else(|e| {
                loaded
                    .warnings
                    .push(format!("Ignoring {scope} config {}: {e}", path.display()));
                None
            });

            loaded.sources.push(ConfigSource {
                scope,
                path: path.to_path_buf(),
                loaded: layer.is_some(),
            });
            if let Some(layer) = layer {
                debug!(scope = %scope, path = %path.display(), "Loaded config file");
                loaded.config.merge(layer);
            }
        }

        if loaded.config.session.has_plaintext_key() {
            loaded.warnings.push(
                "[session] contains a plaintext encryption_key; \
                 set CACHET_ENCRYPTION_KEY instead"
                    .to_string(),
            );
        }

        for warning in &loaded.warnings {
            warn!(warning = %warning, "Config warning");
        }

        Ok(loaded)
    }
}

/// Discover, read and merge the user and project config files.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    ConfigPaths::discover(project_dir).load()
}

/// Read one config file. A missing file is `Ok(None)`.
pub fn read_config(path: &Path) -> Result<Option<CachetConfig>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => CachetConfig::from_toml(&contents).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Write `config` to `path` under a descriptive header, creating parent
/// directories as needed.
pub fn save_config(config: &CachetConfig, path: &Path) -> Result<()> {
    let write_err = |p: &Path, source: io::Error| ConfigError::WriteFile {
        path: p.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }

    let contents = format!("{FILE_HEADER}{}", config.to_toml()?);
    std::fs::write(path, contents).map_err(|e| write_err(path, e))
}

/// Create a config file holding the defaults. Returns `false` and leaves
/// the file untouched if it already exists.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&CachetConfig::with_defaults(), path)?;
    Ok(true)
}

/// Path of the user config file.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// User config directory: `CACHET_CONFIG_DIR` if set, else the platform
/// config directory.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

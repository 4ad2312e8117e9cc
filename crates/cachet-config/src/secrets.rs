//! Encryption key resolution.
//!
//! Resolution order:
//! 1. `CACHET_ENCRYPTION_KEY` environment variable
//! 2. Config file (`[session] encryption_key`, with a warning at load time)
//! 3. Generated at startup (records do not survive a restart)
//!
//! Keys are standard base64 encodings of 16 or 32 raw bytes.

use base64::{Engine, engine::general_purpose::STANDARD};
use cachet_session::{AesDataEncrypter, generate_key};

use crate::{ConfigError, Result, SessionConfig};

/// Environment variable holding the encryption key.
pub const KEY_ENV_VAR: &str = "CACHET_ENCRYPTION_KEY";

/// Where an encryption key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Environment variable.
    EnvVar(String),
    /// Plaintext key in a config file.
    ConfigFile,
    /// Randomly generated for this process.
    Generated,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::EnvVar(var) => write!(f, "env var {}", var),
            KeySource::ConfigFile => write!(f, "config file (plaintext)"),
            KeySource::Generated => write!(f, "generated (ephemeral)"),
        }
    }
}

/// Resolve key material, or `None` if no key is configured anywhere.
pub fn resolve_encryption_key(session: &SessionConfig) -> Result<Option<(Vec<u8>, KeySource)>> {
    let env_value = std::env::var(KEY_ENV_VAR).ok();
    resolve_from(env_value.as_deref(), session.encryption_key.as_deref())
}

/// Build the data encrypter for `session`, generating a key if none is set.
pub fn build_encrypter(session: &SessionConfig) -> Result<(AesDataEncrypter, KeySource)> {
    encrypter_for(resolve_encryption_key(session)?)
}

/// Encode a fresh random key of `len` bytes as base64.
pub fn generate_encoded_key(len: usize) -> String {
    STANDARD.encode(generate_key(len))
}

fn resolve_from(
    env_value: Option<&str>,
    config_value: Option<&str>,
) -> Result<Option<(Vec<u8>, KeySource)>> {
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        let source = KeySource::EnvVar(KEY_ENV_VAR.to_string());
        return decode(value, &source).map(|key| Some((key, source)));
    }

    match config_value.filter(|v| !v.is_empty()) {
        Some(value) => {
            decode(value, &KeySource::ConfigFile).map(|key| Some((key, KeySource::ConfigFile)))
        }
        None => Ok(None),
    }
}

fn encrypter_for(resolved: Option<(Vec<u8>, KeySource)>) -> Result<(AesDataEncrypter, KeySource)> {
    match resolved {
        Some((key, source)) => {
            let encrypter = AesDataEncrypter::new(&key).map_err(|e| ConfigError::InvalidKey {
                source_name: source.to_string(),
                reason: e.to_string(),
            })?;
            Ok((encrypter, source))
        }
        None => Ok((AesDataEncrypter::generate(), KeySource::Generated)),
    }
}

fn decode(value: &str, source: &KeySource) -> Result<Vec<u8>> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| ConfigError::InvalidKey {
            source_name: source.to_string(),
            reason: e.to_string(),
        })
}

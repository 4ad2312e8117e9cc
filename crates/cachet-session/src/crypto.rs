//! Symmetric encryption of serialized session payloads.
//!
//! [`DataEncrypter`] is the seam the store encrypts through; [`AesDataEncrypter`]
//! is the AES-GCM implementation. Each ciphertext is laid out as
//! `nonce (12 bytes) || ciphertext || tag`, so the same plaintext never
//! encrypts to the same bytes twice.

use std::fmt;

use aes_gcm::{
    Aes128Gcm, Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;

use crate::error::{Error, Result};

/// Length of a generated key in bytes (AES-128).
pub const DEFAULT_KEY_LEN: usize = 16;

/// Length of the random nonce prepended to every ciphertext.
const NONCE_LEN: usize = 12;

/// Encrypts and decrypts opaque byte payloads under a fixed key.
///
/// `None` passes through unchanged in both directions. For every byte
/// sequence `x`, `decrypt(encrypt(x)) == x`.
pub trait DataEncrypter: Send + Sync + fmt::Debug {
    /// Encrypt `plain`, or return `None` if there is nothing to encrypt.
    fn encrypt(&self, plain: Option<&[u8]>) -> Result<Option<Vec<u8>>>;

    /// Decrypt `cipher`, or return `None` if there is nothing to decrypt.
    ///
    /// Input not produced by [`encrypt`](Self::encrypt) under the same key
    /// fails with [`Error::Decryption`]; it is never reported as absent.
    fn decrypt(&self, cipher: Option<&[u8]>) -> Result<Option<Vec<u8>>>;
}

enum Cipher {
    Aes128(Box<Aes128Gcm>),
    Aes256(Box<Aes256Gcm>),
}

/// AES-GCM data encrypter.
///
/// The key is fixed for the lifetime of the encrypter. Rotating keys makes
/// every previously written record undecryptable.
pub struct AesDataEncrypter {
    cipher: Cipher,
    key_len: usize,
}

impl AesDataEncrypter {
    /// Create an encrypter from an explicit key.
    ///
    /// 16-byte keys select AES-128, 32-byte keys AES-256. Anything else,
    /// including an empty key, is rejected with [`Error::InvalidArgument`].
    pub fn new(key: &[u8]) -> Result<Self> {
        let cipher = match key.len() {
            16 => Cipher::Aes128(Box::new(
                Aes128Gcm::new_from_slice(key).map_err(|e| Error::InvalidArgument(e.to_string()))?,
            )),
            32 => Cipher::Aes256(Box::new(
                Aes256Gcm::new_from_slice(key).map_err(|e| Error::InvalidArgument(e.to_string()))?,
            )),
            0 => return Err(Error::InvalidArgument("key must not be empty".to_string())),
            n => {
                return Err(Error::InvalidArgument(format!(
                    "key must be 16 or 32 bytes, got {n}"
                )));
            }
        };

        Ok(Self {
            cipher,
            key_len: key.len(),
        })
    }

    /// Create an encrypter with a freshly generated random 16-byte key.
    pub fn generate() -> Self {
        let mut key = [0u8; DEFAULT_KEY_LEN];
        rand::rng().fill_bytes(&mut key);
        Self {
            cipher: Cipher::Aes128(Box::new(Aes128Gcm::new(&key.into()))),
            key_len: DEFAULT_KEY_LEN,
        }
    }

    /// Length of the key in bytes.
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    fn seal(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from(nonce_bytes);

        let ciphertext = match &self.cipher {
            Cipher::Aes128(c) => c.encrypt(&nonce, plain),
            Cipher::Aes256(c) => c.encrypt(&nonce, plain),
        }
        .map_err(|e| Error::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn open(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < NONCE_LEN {
            return Err(Error::Decryption(
                "invalid encrypted data: too short".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let nonce_array: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| Error::Decryption("invalid nonce length".to_string()))?;
        let nonce = Nonce::from(nonce_array);

        match &self.cipher {
            Cipher::Aes128(c) => c.decrypt(&nonce, ciphertext),
            Cipher::Aes256(c) => c.decrypt(&nonce, ciphertext),
        }
        .map_err(|e| Error::Decryption(e.to_string()))
    }
}

impl DataEncrypter for AesDataEncrypter {
    fn encrypt(&self, plain: Option<&[u8]>) -> Result<Option<Vec<u8>>> {
        plain.map(|p| self.seal(p)).transpose()
    }

    fn decrypt(&self, cipher: Option<&[u8]>) -> Result<Option<Vec<u8>>> {
        cipher.map(|c| self.open(c)).transpose()
    }
}

impl fmt::Debug for AesDataEncrypter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesDataEncrypter")
            .field("key_len", &self.key_len)
            .finish_non_exhaustive()
    }
}

/// Generate `len` bytes of key material from the thread-local CSPRNG.
pub fn generate_key(len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    rand::rng().fill_bytes(&mut key);
    key
}

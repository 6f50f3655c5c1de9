//! Storage for passwords and API tokens.
//!
//! Secrets are addressed by `(site, login)`. The platform keyring is the
//! default backend; the encrypted file backend exists for machines without a
//! keyring service (CI runners, bare SSH sessions).

use super::data_storage::DataStorage;
use aes::Aes256;
use anyhow::Result;
use base64::prelude::*;
use block_modes::block_padding::Pkcs7;
use block_modes::{BlockMode, Cbc};
use clap::ValueEnum;
use keyring::{Entry, Error as KeyringError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

// Include generated metadata: keyring service name and file store key material
include!(concat!(env!("OUT_DIR"), "/app_metadata.rs"));

type Aes256Cbc = Cbc<Aes256, Pkcs7>;

const SECRETS_FILE: &str = "secrets.json";

pub trait SecretStore {
    fn get(&self, site: &str, login: &str) -> Result<Option<String>>;
    fn set(&self, site: &str, login: &str, secret: &str) -> Result<()>;
    fn delete(&self, site: &str, login: &str) -> Result<()>;
}

fn account(site: &str, login: &str) -> String {
    format!("{}@{}", login, site)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    #[default]
    Keyring,
    File,
}

impl SecretBackend {
    pub fn open(self) -> Result<Box<dyn SecretStore>> {
        Ok(match self {
            SecretBackend::Keyring => Box::new(KeyringStore::new()),
            SecretBackend::File => Box::new(FileStore::new()?),
        })
    }
}

#[derive(Clone, Debug)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: APP_METADATA_KEYRING_SERVICE.to_string(),
        }
    }

    /// Keyring service the entries are filed under.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, site: &str, login: &str) -> Result<Entry> {
        Ok(Entry::new(&self.service, &account(site, login))?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, site: &str, login: &str) -> Result<Option<String>> {
        match self.entry(site, login)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, site: &str, login: &str, secret: &str) -> Result<()> {
        self.entry(site, login)?.set_password(secret)?;
        Ok(())
    }

    fn delete(&self, site: &str, login: &str) -> Result<()> {
        match self.entry(site, login)?.delete_credential() {
            Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// AES-256-CBC encrypted secrets kept in one JSON file, keyed by account.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl FileStore {
    pub fn new() -> Result<Self> {
        Ok(Self::at(DataStorage::new().get_path(SECRETS_FILE)?))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            key: APP_METADATA_SECRETS_KEY.to_vec(),
            iv: APP_METADATA_SECRETS_IV.to_vec(),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, secrets: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(secrets)?)?;
        Ok(())
    }

    fn encrypt(&self, secret: &str) -> Result<String> {
        let cipher = Aes256Cbc::new_from_slices(&self.key, &self.iv)?;
        let ciphertext = cipher.encrypt_vec(secret.as_bytes());
        Ok(BASE64_STANDARD.encode(ciphertext))
    }

    fn decrypt(&self, encoded: &str) -> Result<String> {
        let ciphertext = BASE64_STANDARD.decode(encoded)?;
        let cipher = Aes256Cbc::new_from_slices(&self.key, &self.iv)?;
        let plaintext = cipher.decrypt_vec(&ciphertext)?;
        Ok(String::from_utf8(plaintext)?)
    }
}

impl SecretStore for FileStore {
    fn get(&self, site: &str, login: &str) -> Result<Option<String>> {
        let secrets = self.load()?;
        match secrets.get(&account(site, login)) {
            // An entry that no longer decrypts is as good as missing.
            Some(encoded) => Ok(self.decrypt(encoded).ok()),
            None => Ok(None),
        }
    }

    fn set(&self, site: &str, login: &str, secret: &str) -> Result<()> {
        let mut secrets = self.load()?;
        secrets.insert(account(site, login), self.encrypt(secret)?);
        self.save(&secrets)
    }

    fn delete(&self, site: &str, login: &str) -> Result<()> {
        let mut secrets = self.load()?;
        if secrets.remove(&account(site, login)).is_some() {
            self.save(&secrets)?;
        }
        Ok(())
    }
}

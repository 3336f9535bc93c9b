//! API key providers
//!
//! The engine only ever asks a [`KeyProvider`] for a credential. Storing one
//! is the job of a [`KeyStore`], used by the CLI's `set-key` command.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "POSTCRAFT_API_KEY";

/// Directory under the home directory holding the key file
const KEY_DIR_NAME: &str = ".postcraft";

/// Key file name
const KEY_FILE_NAME: &str = "credentials.json";

/// Opaque API key. Debug output is masked.
///
/// Surrounding whitespace is stripped once, when the key enters the
/// program through [`Credential::new`]; the stored value is never changed
/// after that.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key with surrounding whitespace removed, returning `None`
    /// when it is blank
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", crate::http_logger::mask_token(&self.0))
    }
}

/// Supplies the API key on demand
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn get_credential(&self) -> Option<Credential>;
}

/// A provider that can also persist a key
#[async_trait]
pub trait KeyStore: KeyProvider {
    async fn set_credential(&self, credential: Credential) -> Result<()>;
}

/// Fixed credential, or none at all
#[derive(Debug, Clone, Default)]
pub struct StaticKeyProvider {
    credential: Option<Credential>,
}

impl StaticKeyProvider {
    pub fn new(credential: Option<Credential>) -> Self {
        Self { credential }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn get_credential(&self) -> Option<Credential> {
        self.credential.clone()
    }
}

/// Reads the key from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvKeyProvider {
    var: String,
}

impl EnvKeyProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvKeyProvider {
    fn default() -> Self {
        Self::new(ENV_API_KEY)
    }
}

#[async_trait]
impl KeyProvider for EnvKeyProvider {
    async fn get_credential(&self) -> Option<Credential> {
        std::env::var(&self.var).ok().and_then(Credential::new)
    }
}

/// On-disk key file format
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    api_key: String,
}

/// JSON file backed key store
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.postcraft/credentials.json`, or the current directory when
    /// no home directory is known
    pub fn default_path() -> PathBuf {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        home.join(KEY_DIR_NAME).join(KEY_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyProvider for FileKeyStore {
    async fn get_credential(&self) -> Option<Credential> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No key file at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to read key file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<KeyFile>(&content) {
            Ok(file) => Credential::new(file.api_key),
            Err(e) => {
                warn!("Failed to parse key file {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn set_credential(&self, credential: Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow!("Failed to create directory {}: {}", parent.display(), e)
                })?;
            }
        }

        let body = serde_json::to_string_pretty(&KeyFile {
            api_key: credential.expose().to_string(),
        })?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|e| anyhow!("Failed to open key file {}: {}", self.path.display(), e))?;

        // `mode` only applies to new files; an existing one keeps its old bits
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms)
                .await
                .map_err(|e| {
                    anyhow!(
                        "Failed to restrict key file permissions {}: {}",
                        self.path.display(),
                        e
                    )
                })?;
        }

        file.write_all(body.as_bytes())
            .await
            .map_err(|e| anyhow!("Failed to write key file {}: {}", self.path.display(), e))?;
        file.flush()
            .await
            .map_err(|e| anyhow!("Failed to write key file {}: {}", self.path.display(), e))?;

        Ok(())
    }
}

/// Asks each provider in turn, first credential wins
#[derive(Clone, Default)]
pub struct ChainKeyProvider {
    providers: Vec<Arc<dyn KeyProvider>>,
}

impl ChainKeyProvider {
    pub fn new(providers: Vec<Arc<dyn KeyProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl KeyProvider for ChainKeyProvider {
    async fn get_credential(&self) -> Option<Credential> {
        for provider in &self.providers {
            if let Some(credential) = provider.get_credential().await {
                return Some(credential);
            }
        }
        None
    }
}

//! Token persistence
//!
//! The session token lives under a single well-known location and survives
//! process restarts. The trait exists so the store can be backed by memory in
//! tests (and by whatever durable storage a host platform provides).

use crate::error::{ClientError, ClientResult};
use parking_lot::Mutex;
use std::path::PathBuf;

/// Durable storage for the one session token
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, if any
    fn load(&self) -> ClientResult<Option<String>>;

    /// Persist the token, replacing any previous value
    fn store(&self, token: &str) -> ClientResult<()>;

    /// Remove the persisted token
    fn clear(&self) -> ClientResult<()>;
}

/// File-based token storage
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Use an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `~/.cinematch/token`
    pub fn default_location() -> ClientResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| ClientError::storage("cannot find home directory"))?;
        let dir = home.join(".cinematch");

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            let mut builder = std::fs::DirBuilder::new();
            builder.recursive(true).mode(0o700);
            builder
                .create(&dir)
                .map_err(|e| ClientError::storage(e.to_string()))?;
        }

        #[cfg(not(unix))]
        {
            std::fs::create_dir_all(&dir).map_err(|e| ClientError::storage(e.to_string()))?;
        }

        Ok(Self::new(dir.join("token")))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> ClientResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::storage(e.to_string()))?;
        let token = contents.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    fn store(&self, token: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::storage(e.to_string()))?;
        }

        std::fs::write(&self.path, token).map_err(|e| ClientError::storage(e.to_string()))?;

        // Restrict to the owning user on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| ClientError::storage(e.to_string()))?;
        }

        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| ClientError::storage(e.to_string()))?;
        }
        Ok(())
    }
}

/// In-memory token storage for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> ClientResult<Option<String>> {
        Ok(self.token.lock().clone())
    }

    fn store(&self, token: &str) -> ClientResult<()> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.token.lock() = None;
        Ok(())
    }
}

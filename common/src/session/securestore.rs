use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;

/// Errors from the on-disk secret store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no usable config directory on this platform")]
    NoConfigDir,
    #[error("could not encode the student list: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A small file-backed key-value store for secrets.
///
/// One file per key under the per-user config directory. Values are written
/// with owner-only permissions on unix.
pub struct SecureStore {
    root: PathBuf,
}

impl SecureStore {
    /// Open the store in its default location.
    pub fn open() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("app", "orime", "orime-tracker")
            .ok_or(StoreError::NoConfigDir)?;

        Ok(Self::with_root(dirs.config_dir().join("secrets")))
    }

    /// Open a store rooted at `root` instead of the default location.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// The value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.root.join(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("failed to read stored {key}: {e}");
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;

        let path = self.root.join(key);
        fs::write(&path, value)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.root.join(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

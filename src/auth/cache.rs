//! On-disk token cache, one file per API identifier

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::TokenRecord;

/// Token cache rooted at a directory. Each API gets `<dir>/<api>.token`.
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
}

impl TokenCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache rooted at the platform cache directory.
    pub fn platform() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "youtube-cli", "youtube-cli")
            .context("Could not determine cache directory")?;
        Ok(Self::new(proj_dirs.cache_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file for the given API identifier.
    pub fn path_for(&self, api: &str) -> PathBuf {
        self.dir.join(format!("{}.token", api))
    }

    /// Write the token for `api`, replacing any previous one.
    pub fn save(&self, api: &str, token: &TokenRecord) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create cache directory {}", self.dir.display())
        })?;

        let path = self.path_for(api);
        let content = serde_json::to_string_pretty(token).context("Failed to serialize token")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write token cache {}", path.display()))?;

        // Owner read/write only (file holds credentials)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms)
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        tracing::debug!("Saved {} token to {}", api, path.display());
        Ok(())
    }

    /// Read the token for `api`. Fails when the file is absent or corrupt.
    pub fn load(&self, api: &str) -> Result<TokenRecord> {
        let path = self.path_for(api);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read token cache {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse token cache {}", path.display()))
    }

    /// Delete the token for `api`. Returns `Ok(false)` if there was none.
    pub fn remove(&self, api: &str) -> Result<bool> {
        let path = self.path_for(api);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove token cache {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_token() -> TokenRecord {
        TokenRecord {
            access_token: "A".to_string(),
            refresh_token: Some("R".to_string()),
            expires_at: Some(1_700_000_000),
            token_type: "Bearer".to_string(),
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());

        cache.save("video", &sample_token()).unwrap();
        let loaded = cache.load("video").unwrap();

        assert_eq!(loaded, sample_token());
    }

    #[test]
    fn test_save_overwrites_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());

        cache.save("youtube", &sample_token()).unwrap();
        let newer = TokenRecord {
            access_token: "B".to_string(),
            ..sample_token()
        };
        cache.save("youtube", &newer).unwrap();

        assert_eq!(cache.load("youtube").unwrap().access_token, "B");
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("nested").join("cache"));

        cache.save("youtube", &sample_token()).unwrap();
        assert!(cache.path_for("youtube").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());
        cache.save("youtube", &sample_token()).unwrap();

        let mode = fs::metadata(cache.path_for("youtube"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_apis_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());

        cache.save("youtube", &sample_token()).unwrap();
        assert!(cache.load("drive").is_err());
        assert_ne!(cache.path_for("youtube"), cache.path_for("drive"));
    }

    #[test]
    fn test_load_missing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());
        assert!(cache.load("youtube").is_err());
    }

    #[test]
    fn test_load_corrupt_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());
        fs::write(cache.path_for("youtube"), b"\x00not json").unwrap();

        let err = cache.load("youtube").unwrap_err();
        assert!(format!("{:#}", err).contains("parse"));
    }

    #[test]
    fn test_remove_then_load_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());

        cache.save("youtube", &sample_token()).unwrap();
        assert!(cache.remove("youtube").unwrap());
        assert!(cache.load("youtube").is_err());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());
        assert!(!cache.remove("youtube").unwrap());
    }
}

// Filesystem storage backend.
// Maps keys to JSON files under a base directory, written atomically.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, SproutError};

use super::Storage;

/// Storage backend that keeps each key as a file under a base directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a storage rooted at the platform cache directory
    /// (~/.cache/sprout on Linux).
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "sprout")
            .ok_or_else(|| SproutError::Storage("no home directory available".to_string()))?;
        Ok(Self::new(dirs.cache_dir()))
    }

    /// Base directory this storage writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root).await?;

        // Write atomically via temp file
        let path = self.path_for(key);
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Sanitize a key for use as a file name.
/// Replaces problematic characters with underscores.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("simple"), "simple");
        assert_eq!(sanitize_key("with/slash"), "with_slash");
        assert_eq!(sanitize_key("a:b*c"), "a_b_c");
    }

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("content_cache_animal", "[1,2,3]").await.unwrap();
        let value = storage.get("content_cache_animal").await.unwrap();
        assert_eq!(value, Some("[1,2,3]".to_string()));

        // Overwrite replaces the previous value.
        storage.set("content_cache_animal", "[4]").await.unwrap();
        let value = storage.get("content_cache_animal").await.unwrap();
        assert_eq!(value, Some("[4]".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert_eq!(storage.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("doomed", "bye").await.unwrap();
        storage.remove("doomed").await.unwrap();
        assert_eq!(storage.get("doomed").await.unwrap(), None);

        // Removing a missing key is not an error.
        storage.remove("doomed").await.unwrap();
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("entry", "{}").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["entry.json".to_string()]);
    }
}

use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem storage. Relative paths are resolved against `base_path`;
/// absolute paths are used as given.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path).try_exists()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_relative_to_base() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        tokio_test::block_on(storage.write_file("nested/items.xml", b"<data/>")).unwrap();

        assert!(temp_dir.path().join("nested/items.xml").exists());
        assert!(tokio_test::block_on(storage.exists("nested/items.xml")).unwrap());
        assert!(!tokio_test::block_on(storage.exists("nested/missing.xml")).unwrap());
        assert_eq!(
            tokio_test::block_on(storage.read_file("nested/items.xml")).unwrap(),
            b"<data/>"
        );
    }

    #[test]
    fn test_absolute_paths_ignore_base() {
        let temp_dir = TempDir::new().unwrap();
        let absolute = temp_dir.path().join("items.xml");
        let storage = LocalStorage::new("/definitely/not/here".to_string());

        tokio_test::block_on(storage.write_file(absolute.to_str().unwrap(), b"<a/>")).unwrap();

        assert_eq!(std::fs::read(&absolute).unwrap(), b"<a/>");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let storage = LocalStorage::default();
        let err = tokio_test::block_on(storage.read_file("/no/such/file.xml")).unwrap_err();
        assert!(matches!(err, crate::utils::error::TranslatorError::IoError(_)));
    }
}

use log::info;
use std::path::Path;

use super::config::StorageConfig;
use super::error::FileResult;
use super::page_file::PageFile;

/// Creates, opens and destroys page files with a shared configuration.
///
/// Holds no state besides its configuration. `PageFile::create` and
/// `PageFile::open` work without one and use `StorageConfig::default()`.
#[derive(Debug, Clone, Default)]
pub struct StorageManager {
    config: StorageConfig,
}

impl StorageManager {
    /// Create a storage manager with the default configuration
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Create a storage manager with the given configuration
    pub fn with_config(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Same as `with_config`, and announces the manager in the log
    pub fn init(config: StorageConfig) -> Self {
        info!(
            "storage manager initialized (create_dirs={}, sync_on_write={})",
            config.create_dirs, config.sync_on_write
        );
        Self::with_config(config)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Create a page file holding one zeroed page
    pub fn create_page_file<P: AsRef<Path>>(&self, path: P) -> FileResult<()> {
        PageFile::create_with_config(path.as_ref(), &self.config)
    }

    /// Open an existing page file
    pub fn open_page_file<P: AsRef<Path>>(&self, path: P) -> FileResult<PageFile> {
        PageFile::open_with_config(path.as_ref(), &self.config)
    }

    /// Remove a page file
    pub fn destroy_page_file<P: AsRef<Path>>(&self, path: P) -> FileResult<()> {
        PageFile::destroy(path)
    }

    /// Check whether a page file exists on disk
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        path.as_ref().is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{FileError, PAGE_SIZE};
    use tempfile::TempDir;

    #[test]
    fn test_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.bin");
        let manager = StorageManager::new();

        assert!(!manager.exists(&test_file));
        manager.create_page_file(&test_file).unwrap();
        assert!(manager.exists(&test_file));

        let mut handle = manager.open_page_file(&test_file).unwrap();
        assert_eq!(handle.total_pages(), 1);
        handle.close().unwrap();

        manager.destroy_page_file(&test_file).unwrap();
        assert!(!manager.exists(&test_file));
        assert!(matches!(
            manager.open_page_file(&test_file),
            Err(FileError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_init_is_optional() {
        let temp_dir = TempDir::new().unwrap();
        let with_init = temp_dir.path().join("a.bin");
        let without_init = temp_dir.path().join("b.bin");

        StorageManager::init(StorageConfig::default())
            .create_page_file(&with_init)
            .unwrap();
        PageFile::create(&without_init).unwrap();

        assert_eq!(
            std::fs::read(&with_init).unwrap(),
            std::fs::read(&without_init).unwrap()
        );
    }

    #[test]
    fn test_config_applies_to_opened_files() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("sub/test.bin");
        let manager = StorageManager::with_config(StorageConfig {
            create_dirs: true,
            sync_on_write: true,
        });
        assert!(manager.config().sync_on_write);

        manager.create_page_file(&test_file).unwrap();
        let mut handle = manager.open_page_file(&test_file).unwrap();
        handle.write_block(0, &vec![4u8; PAGE_SIZE]).unwrap();
        handle.close().unwrap();

        assert!(std::fs::read(&test_file).unwrap().iter().all(|&b| b == 4));
    }
}

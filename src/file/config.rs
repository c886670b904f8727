use serde::{Deserialize, Serialize};

/// Options applied to every page file a `StorageManager` creates or opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Create missing parent directories when creating a page file
    pub create_dirs: bool,
    /// Call `sync_data` after every block write and append
    pub sync_on_write: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            create_dirs: true,
            sync_on_write: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert!(config.create_dirs);
        assert!(!config.sync_on_write);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: StorageConfig = serde_json::from_str(r#"{"sync_on_write": true}"#).unwrap();
        assert!(config.create_dirs);
        assert!(config.sync_on_write);
    }
}

mod config;
mod error;
mod page_file;
mod storage_manager;


pub use config::StorageConfig;
pub use error::{FileError, FileResult};
pub use page_file::{PageFile, PageFileInfo};
pub use storage_manager::StorageManager;

/// Page size in bytes (4KB)
pub const PAGE_SIZE: usize = 4096;

/// Page ID type
pub type PageId = usize;

pub mod file;

pub use file::{
    FileError, FileResult, PAGE_SIZE, PageFile, PageFileInfo, PageId, StorageConfig,
    StorageManager,
};

use std::io;
use thiserror::Error;

use super::PageId;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Cannot create file {path}: {source}")]
    FileAccess {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("File handle not initialized")]
    HandleNotInitialized,

    #[error("Page out of range: page_id={page_id}, total_pages={total_pages}")]
    PageOutOfRange { page_id: i64, total_pages: usize },

    #[error("Page write failed: page_id={page_id}, total_pages={total_pages}")]
    PageWrite { page_id: PageId, total_pages: usize },

    #[error("Cannot allocate {0} byte page buffer")]
    MemoryAllocation(usize),

    #[error("Invalid page size: expected {expected}, got {actual}")]
    InvalidPageSize { expected: usize, actual: usize },
}

pub type FileResult<T> = Result<T, FileError>;

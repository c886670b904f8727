//! Page-granular access to a single flat file.
//!
//! A page file is a contiguous run of `PAGE_SIZE` blocks with no header:
//!
//! ```text
//! +-----------------+-----------------+-----------------+
//! | Page 0 (4KB)    | Page 1 (4KB)    | Page 2 (4KB)    | ...
//! +-----------------+-----------------+-----------------+
//! ^ offset 0        ^ offset 4096     ^ offset 8192
//! ```
//!
//! A `PageFile` tracks the page count and a cursor. Positional reads move the
//! cursor, writes never do.

use log::{debug, info, warn};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::config::StorageConfig;
use super::error::{FileError, FileResult};
use super::{PAGE_SIZE, PageId};

/// Snapshot of a handle's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFileInfo {
    pub name: String,
    pub total_pages: usize,
    pub cur_page: PageId,
    pub file_len: u64,
}

/// Handle to an open page file
#[derive(Debug)]
pub struct PageFile {
    /// Path the file was opened with
    name: String,
    /// `None` once the handle is closed
    file: Option<File>,
    /// Number of complete pages in the file
    total_pages: usize,
    /// Page targeted by the last successful read
    cur_page: PageId,
    sync_on_write: bool,
}

impl PageFile {
    /// Create a page file holding a single zeroed page, truncating any existing file
    pub fn create<P: AsRef<Path>>(path: P) -> FileResult<()> {
        Self::create_with_config(path.as_ref(), &StorageConfig::default())
    }

    /// Open an existing page file for reading and writing
    pub fn open<P: AsRef<Path>>(path: P) -> FileResult<Self> {
        Self::open_with_config(path.as_ref(), &StorageConfig::default())
    }

    /// Remove a page file from disk.
    ///
    /// Handles still open on the same path are not tracked. On unix they keep
    /// reading and writing the unlinked file; elsewhere the behavior is up to
    /// the platform. Close handles before destroying their file.
    pub fn destroy<P: AsRef<Path>>(path: P) -> FileResult<()> {
        let path = path.as_ref();
        fs::remove_file(path).map_err(|e| {
            debug!("remove {} failed: {}", path.display(), e);
            FileError::FileNotFound(path.display().to_string())
        })?;
        info!("destroyed page file {}", path.display());
        Ok(())
    }

    pub(crate) fn create_with_config(path: &Path, config: &StorageConfig) -> FileResult<()> {
        let access_error = |source: io::Error| FileError::FileAccess {
            path: path.display().to_string(),
            source,
        };

        if config.create_dirs
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(access_error)?;
        }

        let mut file = File::create(path).map_err(access_error)?;
        let page = zeroed_page()?;
        file.write_all(&page).map_err(access_error)?;
        if config.sync_on_write {
            file.sync_data().map_err(access_error)?;
        }

        info!("created page file {}", path.display());
        Ok(())
    }

    pub(crate) fn open_with_config(path: &Path, config: &StorageConfig) -> FileResult<Self> {
        let name = path.display().to_string();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                debug!("open {} failed: {}", name, e);
                FileError::FileNotFound(name.clone())
            })?;

        let file_len = file
            .metadata()
            .map_err(|e| {
                debug!("stat {} failed: {}", name, e);
                FileError::FileNotFound(name.clone())
            })?
            .len();
        let total_pages = (file_len / PAGE_SIZE as u64) as usize;
        let trailing = file_len % PAGE_SIZE as u64;
        if trailing != 0 {
            warn!(
                "{} has {} trailing bytes past page {}, ignoring them",
                name, trailing, total_pages
            );
        }

        info!("opened page file {} with {} pages", name, total_pages);
        Ok(Self {
            name,
            file: Some(file),
            total_pages,
            cur_page: 0,
            sync_on_write: config.sync_on_write,
        })
    }

    /// Release the underlying file. Closing twice is an error.
    pub fn close(&mut self) -> FileResult<()> {
        let file = self.file.take().ok_or(FileError::HandleNotInitialized)?;
        drop(file);
        info!("closed page file {}", self.name);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Current cursor position
    pub fn block_pos(&self) -> PageId {
        self.cur_page
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn info(&self) -> FileResult<PageFileInfo> {
        let file = self.file.as_ref().ok_or(FileError::HandleNotInitialized)?;
        Ok(PageFileInfo {
            name: self.name.clone(),
            total_pages: self.total_pages,
            cur_page: self.cur_page,
            file_len: file.metadata()?.len(),
        })
    }

    /// Flush written pages to disk
    pub fn sync(&mut self) -> FileResult<()> {
        self.file_mut()?.sync_data()?;
        Ok(())
    }

    /// Read page `page_id` into `buffer` and move the cursor to it
    pub fn read_block(&mut self, page_id: PageId, buffer: &mut [u8]) -> FileResult<()> {
        let total_pages = self.total_pages;
        let file = self.file_mut()?;
        check_buffer(buffer.len())?;

        if page_id >= total_pages {
            return Err(FileError::PageOutOfRange {
                page_id: page_id as i64,
                total_pages,
            });
        }

        let read = file
            .seek(SeekFrom::Start(page_offset(page_id)))
            .and_then(|_| file.read_exact(buffer));
        if let Err(e) = read {
            debug!("short read of page {}: {}", page_id, e);
            return Err(FileError::PageOutOfRange {
                page_id: page_id as i64,
                total_pages,
            });
        }

        debug!("read page {} of {}", page_id, self.name);
        self.cur_page = page_id;
        Ok(())
    }

    pub fn read_first_block(&mut self, buffer: &mut [u8]) -> FileResult<()> {
        self.read_block(0, buffer)
    }

    pub fn read_current_block(&mut self, buffer: &mut [u8]) -> FileResult<()> {
        self.read_block(self.cur_page, buffer)
    }

    pub fn read_previous_block(&mut self, buffer: &mut [u8]) -> FileResult<()> {
        if self.cur_page == 0 {
            return Err(FileError::PageOutOfRange {
                page_id: -1,
                total_pages: self.total_pages,
            });
        }
        self.read_block(self.cur_page - 1, buffer)
    }

    pub fn read_next_block(&mut self, buffer: &mut [u8]) -> FileResult<()> {
        let next = self.cur_page + 1;
        if next >= self.total_pages {
            return Err(FileError::PageOutOfRange {
                page_id: next as i64,
                total_pages: self.total_pages,
            });
        }
        self.read_block(next, buffer)
    }

    pub fn read_last_block(&mut self, buffer: &mut [u8]) -> FileResult<()> {
        let last = self
            .total_pages
            .checked_sub(1)
            .ok_or(FileError::PageOutOfRange {
                page_id: -1,
                total_pages: 0,
            })?;
        self.read_block(last, buffer)
    }

    /// Overwrite an existing page. Does not move the cursor and never grows
    /// the file; use `append_empty_block` first to write past the end.
    pub fn write_block(&mut self, page_id: PageId, buffer: &[u8]) -> FileResult<()> {
        let total_pages = self.total_pages;
        let sync_on_write = self.sync_on_write;
        let file = self.file_mut()?;
        check_buffer(buffer.len())?;

        if page_id >= total_pages {
            return Err(FileError::PageWrite {
                page_id,
                total_pages,
            });
        }

        let written = file
            .seek(SeekFrom::Start(page_offset(page_id)))
            .and_then(|_| file.write_all(buffer))
            .and_then(|_| if sync_on_write { file.sync_data() } else { Ok(()) });
        if let Err(e) = written {
            debug!("write of page {} failed: {}", page_id, e);
            return Err(FileError::PageWrite {
                page_id,
                total_pages,
            });
        }

        debug!("wrote page {} of {}", page_id, self.name);
        Ok(())
    }

    pub fn write_current_block(&mut self, buffer: &[u8]) -> FileResult<()> {
        self.write_block(self.cur_page, buffer)
    }

    /// Add one zeroed page at the end of the file
    pub fn append_empty_block(&mut self) -> FileResult<()> {
        let page_id = self.total_pages;
        let sync_on_write = self.sync_on_write;
        let file = self.file_mut()?;
        let page = zeroed_page()?;

        // Starts at the last complete page so stray trailing bytes get overwritten
        let written = file
            .seek(SeekFrom::Start(page_offset(page_id)))
            .and_then(|_| file.write_all(&page));
        let synced = match &written {
            Ok(()) if sync_on_write => file.sync_data(),
            _ => Ok(()),
        };
        if let Err(e) = written {
            debug!("append of page {} failed: {}", page_id, e);
            return Err(FileError::PageWrite {
                page_id,
                total_pages: page_id,
            });
        }

        // The page is in the file once the write succeeds, even if the sync fails
        self.total_pages += 1;
        if let Err(e) = synced {
            debug!("sync after appending page {} failed: {}", page_id, e);
            return Err(FileError::PageWrite {
                page_id,
                total_pages: self.total_pages,
            });
        }
        debug!("appended page {} to {}", page_id, self.name);
        Ok(())
    }

    /// Append empty pages until the file holds at least `num_pages`.
    /// Pages appended before a failure are kept.
    pub fn ensure_capacity(&mut self, num_pages: usize) -> FileResult<()> {
        if self.file.is_none() {
            return Err(FileError::HandleNotInitialized);
        }
        while self.total_pages < num_pages {
            self.append_empty_block()?;
        }
        Ok(())
    }

    fn file_mut(&mut self) -> FileResult<&mut File> {
        self.file.as_mut().ok_or(FileError::HandleNotInitialized)
    }
}

fn page_offset(page_id: PageId) -> u64 {
    page_id as u64 * PAGE_SIZE as u64
}

fn check_buffer(len: usize) -> FileResult<()> {
    if len != PAGE_SIZE {
        return Err(FileError::InvalidPageSize {
            expected: PAGE_SIZE,
            actual: len,
        });
    }
    Ok(())
}

/// Scratch zero page, freed when the caller returns
fn zeroed_page() -> FileResult<Vec<u8>> {
    let mut page = Vec::new();
    page.try_reserve_exact(PAGE_SIZE)
        .map_err(|_| FileError::MemoryAllocation(PAGE_SIZE))?;
    page.resize(PAGE_SIZE, 0);
    Ok(page)
}

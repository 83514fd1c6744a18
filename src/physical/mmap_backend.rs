//! Concrete `PhysicalFile` backend. Grounded on teacher `mmap/mmap_file.rs`
//! (the `MmapFile` read-only zero-copy wrapper) combined with
//! `memory/buffer_pool.rs`'s pattern of a `Mutex`-guarded shared structure;
//! generalized here from "one memory-mapped segment" to "a growable,
//! page-addressed physical file" since VectorFile needs read-write pages.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use memmap2::Mmap;
use parking_lot::Mutex;

use crate::core::error::{Error, ErrorKind, Result};
use crate::physical::page_manager::{FixMode, PageId, PhysicalFile};

pub struct MmapPhysicalFile {
    path: PathBuf,
    file: Mutex<File>,
    page_size: usize,
    next_page: AtomicU32,
    free_list: Mutex<Vec<PageId>>,
}

impl MmapPhysicalFile {
    pub fn create<P: AsRef<Path>>(path: P, page_size: usize) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(&path)?;
        Ok(MmapPhysicalFile {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(file),
            page_size,
            next_page: AtomicU32::new(0),
            free_list: Mutex::new(Vec::new()),
        })
    }

    pub fn open<P: AsRef<Path>>(path: P, page_size: usize) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let len = file.metadata()?.len();
        let page_count = (len / page_size as u64) as u32;
        Ok(MmapPhysicalFile {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(file),
            page_size,
            next_page: AtomicU32::new(page_count),
            free_list: Mutex::new(Vec::new()),
        })
    }

    fn offset(&self, id: PageId) -> u64 {
        id.0 as u64 * self.page_size as u64
    }

    /// Zero-copy read-only view of the whole file, for bulk sequential
    /// scans. Mirrors teacher `MmapFile::open_read_only`/`data()`.
    pub fn read_only_snapshot(&self) -> Result<Mmap> {
        let file = self.file.lock();
        let mmap = unsafe { Mmap::map(&*file)? };
        Ok(mmap)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PhysicalFile for MmapPhysicalFile {
    fn allocate_page(&self) -> Result<PageId> {
        if let Some(id) = self.free_list.lock().pop() {
            return Ok(id);
        }
        let id = PageId(self.next_page.fetch_add(1, Ordering::SeqCst));
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.offset(id)))?;
        file.write_all(&vec![0u8; self.page_size])?;
        Ok(id)
    }

    fn free_page(&self, id: PageId) -> Result<()> {
        self.free_list.lock().push(id);
        Ok(())
    }

    fn attach_page(&self, id: PageId, mode: FixMode) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.page_size];
        if mode == FixMode::Discardable {
            return Ok(buf);
        }
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.offset(id)))?;
        match file.read_exact(&mut buf) {
            Ok(()) => Ok(buf),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(buf),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn detach_page(&self, id: PageId, data: &[u8]) -> Result<()> {
        if data.len() != self.page_size {
            return Err(Error::new(
                ErrorKind::BadDataPage,
                format!("page {} write size {} != page size {}", id.0, data.len(), self.page_size),
            ));
        }
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.offset(id)))?;
        file.write_all(data)?;
        Ok(())
    }

    fn get_next_page_id(&self, id: PageId) -> Result<Option<PageId>> {
        let next = id.0 + 1;
        if next < self.next_page.load(Ordering::SeqCst) {
            Ok(Some(PageId(next)))
        } else {
            Ok(None)
        }
    }

    fn page_size(&self) -> usize {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.vec");
        let f = MmapPhysicalFile::create(&path, 256).unwrap();

        let p0 = f.allocate_page().unwrap();
        assert_eq!(p0, PageId(0));
        let mut data = vec![0u8; 256];
        data[0] = 7;
        f.detach_page(p0, &data).unwrap();

        let back = f.attach_page(p0, FixMode::ReadOnly).unwrap();
        assert_eq!(back[0], 7);
    }

    #[test]
    fn free_list_reuses_pages() {
        let dir = tempfile::tempdir().unwrap();
        let f = MmapPhysicalFile::create(dir.path().join("d"), 64).unwrap();
        let p0 = f.allocate_page().unwrap();
        f.free_page(p0).unwrap();
        let p1 = f.allocate_page().unwrap();
        assert_eq!(p0, p1);
    }

    #[test]
    fn next_page_id_walks_allocated_pages() {
        let dir = tempfile::tempdir().unwrap();
        let f = MmapPhysicalFile::create(dir.path().join("d"), 64).unwrap();
        let p0 = f.allocate_page().unwrap();
        let p1 = f.allocate_page().unwrap();
        assert_eq!(f.get_next_page_id(p0).unwrap(), Some(p1));
        assert_eq!(f.get_next_page_id(p1).unwrap(), None);
    }
}

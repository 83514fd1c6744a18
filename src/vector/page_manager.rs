//! VectorFile-specific page manager: wires `physical::PhysicalFile` +
//! `physical::cache::PageCache` together with the key→page/block mapping
//! and header (de)serialization. Grounded on original_source
//! `Vector::File::substantiate()` ("the first data page is allocated
//! lazily, on first insert") for sparse/lazy page allocation — since
//! `PhysicalFile::allocate_page` only ever appends the next sequential
//! page, reaching an arbitrary target page id (a key can jump straight
//! to, say, 65537) means padding through every page in between.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::core::error::Result;
use crate::physical::cache::PageCache;
use crate::physical::page_manager::{FixMode, PageId, PhysicalFile};
use crate::vector::header::HeaderPage;
use crate::vector::page::VectorPage;
use crate::vector::schema::VectorSchema;

pub struct PageManager {
    file: Arc<dyn PhysicalFile>,
    cache: PageCache,
    blocks_per_page: usize,
    block_size: usize,
    highest_allocated: AtomicU32,
}

impl PageManager {
    /// Substantiate a brand-new file: allocate page 0 (the header) and
    /// write `header` into it.
    pub fn create(file: Arc<dyn PhysicalFile>, schema: &VectorSchema, header: &HeaderPage) -> Result<Self> {
        let id = file.allocate_page()?;
        debug_assert_eq!(id, PageId::HEADER);
        let page_size = file.page_size();
        let block_size = schema.block_size();
        let mgr = PageManager {
            file,
            cache: PageCache::new(),
            blocks_per_page: VectorPage::blocks_per_page(page_size, block_size),
            block_size,
            highest_allocated: AtomicU32::new(0),
        };
        mgr.store_header(header, false)?;
        Ok(mgr)
    }

    /// Reopen an existing file, reading back its header.
    pub fn open(file: Arc<dyn PhysicalFile>, schema: &VectorSchema) -> Result<(Self, HeaderPage)> {
        let page_size = file.page_size();
        let block_size = schema.block_size();
        let mgr = PageManager {
            file,
            cache: PageCache::new(),
            blocks_per_page: VectorPage::blocks_per_page(page_size, block_size),
            block_size,
            highest_allocated: AtomicU32::new(0),
        };
        mgr.discover_highest_allocated()?;
        let header = mgr.load_header(false)?;
        Ok((mgr, header))
    }

    fn discover_highest_allocated(&self) -> Result<()> {
        let mut last = PageId::HEADER;
        while let Some(next) = self.file.get_next_page_id(last)? {
            last = next;
        }
        self.highest_allocated.store(last.0, Ordering::SeqCst);
        Ok(())
    }

    pub fn blocks_per_page(&self) -> usize {
        self.blocks_per_page
    }

    pub fn load_header(&self, retain: bool) -> Result<HeaderPage> {
        let bytes = self.cache.header.attach(self.file.as_ref(), PageId::HEADER, FixMode::ReadOnly, retain)?;
        HeaderPage::from_bytes(&bytes)
    }

    pub fn store_header(&self, header: &HeaderPage, retain: bool) -> Result<()> {
        let bytes = header.to_bytes(self.file.page_size());
        self.cache.header.release(self.file.as_ref(), PageId::HEADER, bytes, true, retain)
    }

    /// Pad the physical file out to `target` with empty pages, if it
    /// isn't substantiated that far yet.
    fn ensure_page_allocated(&self, target: PageId) -> Result<()> {
        let mut highest = self.highest_allocated.load(Ordering::SeqCst);
        while highest < target.0 {
            let id = self.file.allocate_page()?;
            highest = id.0;
            self.highest_allocated.store(highest, Ordering::SeqCst);
        }
        Ok(())
    }

    pub fn load_page(&self, id: PageId, retain: bool) -> Result<VectorPage> {
        self.ensure_page_allocated(id)?;
        let bytes = self.cache.data.attach(self.file.as_ref(), id, FixMode::Write, retain)?;
        VectorPage::from_bytes(&bytes, self.blocks_per_page, self.block_size)
    }

    /// Like `load_page`, but never substantiates missing pages — used by
    /// scans and fetches that must treat an unallocated page as "no rows
    /// live here" rather than creating it.
    pub fn load_page_if_allocated(&self, id: PageId, retain: bool) -> Result<Option<VectorPage>> {
        if id.0 > self.highest_allocated.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(self.load_page(id, retain)?))
    }

    pub fn store_page(&self, id: PageId, page: &VectorPage, retain: bool) -> Result<()> {
        let bytes = page.to_bytes(self.file.page_size());
        self.cache.data.release(self.file.as_ref(), id, bytes, true, retain)
    }

    pub fn invalidate_cache(&self) {
        self.cache.data.invalidate();
        self.cache.header.invalidate();
    }

    pub fn next_page_id(&self, after: PageId) -> Result<Option<PageId>> {
        self.file.get_next_page_id(after)
    }

    pub fn highest_allocated(&self) -> PageId {
        PageId(self.highest_allocated.load(Ordering::SeqCst))
    }

    pub fn flush(&self) -> Result<()> {
        self.cache.flush_all(self.file.as_ref())
    }
}

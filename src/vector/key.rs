//! Key→location mapping, spec §4.1: "pageID = 1 + key / blocksPerPage;
//! blockID = key mod blocksPerPage. Page 0 is reserved for the header."

pub use crate::core::types::VectorKey;
use crate::physical::page_manager::PageId;

pub fn page_and_block(key: VectorKey, blocks_per_page: usize) -> (PageId, usize) {
    let blocks_per_page = blocks_per_page as u32;
    let page = 1 + key.0 / blocks_per_page;
    let block = (key.0 % blocks_per_page) as usize;
    (PageId(page), block)
}

/// Inverse of `page_and_block`, used by scan iteration to recover the key
/// of a given (page, block) position.
pub fn key_from_location(page: PageId, block: usize, blocks_per_page: usize) -> VectorKey {
    VectorKey((page.0 - 1) * blocks_per_page as u32 + block as u32)
}

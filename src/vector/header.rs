//! HeaderPage (`FileInfo`), spec §3: page 0 carries version, total
//! objectCount, firstVectorKey, lastVectorKey, lastModifiedTimestamp.
//! Invariants: `objectCount == Σ page.count`; `firstVectorKey` is the
//! smallest set bit across all pages or Undefined if count==0;
//! `lastVectorKey` is the largest.

use chrono::{DateTime, Utc};

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::VectorKey;

const LAYOUT_SIZE: usize = 4 + 4 + 4 + 4 + 8;

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderPage {
    pub version: u32,
    pub object_count: u32,
    pub first_key: VectorKey,
    pub last_key: VectorKey,
    pub last_modified: DateTime<Utc>,
}

impl HeaderPage {
    pub fn new(version: u32) -> Self {
        HeaderPage {
            version,
            object_count: 0,
            first_key: VectorKey::UNDEFINED,
            last_key: VectorKey::UNDEFINED,
            last_modified: Utc::now(),
        }
    }

    pub fn to_bytes(&self, page_size: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(page_size);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.object_count.to_le_bytes());
        out.extend_from_slice(&self.first_key.0.to_le_bytes());
        out.extend_from_slice(&self.last_key.0.to_le_bytes());
        // DateTime-canonical 8-byte form (spec §6): millis since epoch.
        out.extend_from_slice(&self.last_modified.timestamp_millis().to_le_bytes());
        out.resize(page_size, 0);
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < LAYOUT_SIZE {
            return Err(Error::new(ErrorKind::BadDataPage, "header page truncated"));
        }
        let version = u32::from_le_bytes(data[0..4].try_into().unwrap());
        let object_count = u32::from_le_bytes(data[4..8].try_into().unwrap());
        let first_key = VectorKey(u32::from_le_bytes(data[8..12].try_into().unwrap()));
        let last_key = VectorKey(u32::from_le_bytes(data[12..16].try_into().unwrap()));
        let millis = i64::from_le_bytes(data[16..24].try_into().unwrap());
        let last_modified = DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now);
        Ok(HeaderPage { version, object_count, first_key, last_key, last_modified })
    }

    pub fn on_insert(&mut self, key: VectorKey) {
        self.object_count += 1;
        if !self.first_key.is_defined() || key.0 < self.first_key.0 {
            self.first_key = key;
        }
        if !self.last_key.is_defined() || key.0 > self.last_key.0 {
            self.last_key = key;
        }
        self.last_modified = Utc::now();
    }

    /// After an expunge, first/last must be recomputed if the removed key
    /// was the boundary; the caller supplies the new boundary (found by
    /// scanning) since recomputation requires page access this struct
    /// doesn't have.
    pub fn on_expunge(&mut self, key: VectorKey, new_first: Option<VectorKey>, new_last: Option<VectorKey>) {
        self.object_count -= 1;
        if self.object_count == 0 {
            self.first_key = VectorKey::UNDEFINED;
            self.last_key = VectorKey::UNDEFINED;
        } else {
            if self.first_key == key {
                self.first_key = new_first.unwrap_or(self.first_key);
            }
            if self.last_key == key {
                self.last_key = new_last.unwrap_or(self.last_key);
            }
        }
        self.last_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut h = HeaderPage::new(1);
        h.on_insert(VectorKey(5));
        h.on_insert(VectorKey(1));
        h.on_insert(VectorKey(17));
        assert_eq!(h.object_count, 3);
        assert_eq!(h.first_key, VectorKey(1));
        assert_eq!(h.last_key, VectorKey(17));

        let bytes = h.to_bytes(64);
        let back = HeaderPage::from_bytes(&bytes).unwrap();
        assert_eq!(back.object_count, 3);
        assert_eq!(back.first_key, VectorKey(1));
        assert_eq!(back.last_key, VectorKey(17));
    }

    #[test]
    fn expunge_to_empty_resets_bounds() {
        let mut h = HeaderPage::new(1);
        h.on_insert(VectorKey(1));
        h.on_expunge(VectorKey(1), None, None);
        assert_eq!(h.object_count, 0);
        assert_eq!(h.first_key, VectorKey::UNDEFINED);
        assert_eq!(h.last_key, VectorKey::UNDEFINED);
    }
}

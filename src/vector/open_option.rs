//! Open-time options, spec §4.1: `open(mode)` and the `Fetch`/`Scan`
//! read sub-modes; `Update` and `Batch` additionally control whether the
//! page cache retains pages between calls (spec §4.1 page-cache note).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Search,
    Update,
    Batch,
    Initialize,
}

impl OpenMode {
    /// Pages may be retained across calls only for isolated/no-version
    /// transactions or batch mode (spec §4.1).
    pub fn retains_pages(self) -> bool {
        matches!(self, OpenMode::Batch)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, OpenMode::Update | OpenMode::Batch | OpenMode::Initialize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSubMode {
    /// Sequential traversal driven by `rewind`/`reset` (spec §4.1 `getNext`).
    Scan,
    /// Point lookup by key, driven by `fetch`.
    Fetch,
}

#[derive(Debug, Clone)]
pub struct OpenOption {
    pub mode: OpenMode,
    pub sub_mode: ReadSubMode,
    /// Bitset of field indices (0-based over the persisted, non-key
    /// fields) to materialize; `None` means all fields.
    pub field_select: Option<Vec<usize>>,
    pub sort_descending: bool,
    /// `fetch`'s search key value, set only when `sub_mode == Fetch`.
    pub search_key: Option<u32>,
    /// Project only the live-row count instead of field values, used by
    /// the planner's count-only scans.
    pub projects_count_only: bool,
}

impl OpenOption {
    pub fn scan() -> Self {
        OpenOption {
            mode: OpenMode::Read,
            sub_mode: ReadSubMode::Scan,
            field_select: None,
            sort_descending: false,
            search_key: None,
            projects_count_only: false,
        }
    }

    pub fn fetch(key: u32) -> Self {
        OpenOption {
            mode: OpenMode::Read,
            sub_mode: ReadSubMode::Fetch,
            field_select: None,
            sort_descending: false,
            search_key: Some(key),
            projects_count_only: false,
        }
    }

    pub fn update() -> Self {
        OpenOption { mode: OpenMode::Update, ..OpenOption::scan() }
    }

    pub fn batch() -> Self {
        OpenOption { mode: OpenMode::Batch, ..OpenOption::scan() }
    }

    pub fn with_field_select(mut self, fields: Vec<usize>) -> Self {
        self.field_select = Some(fields);
        self
    }

    pub fn with_sort_descending(mut self, descending: bool) -> Self {
        self.sort_descending = descending;
        self
    }

    pub fn with_count_only(mut self) -> Self {
        self.projects_count_only = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_mode_retains_pages_but_update_does_not() {
        assert!(OpenMode::Batch.retains_pages());
        assert!(!OpenMode::Update.retains_pages());
    }

    #[test]
    fn fetch_carries_the_search_key() {
        let opt = OpenOption::fetch(42);
        assert_eq!(opt.search_key, Some(42));
        assert_eq!(opt.sub_mode, ReadSubMode::Fetch);
    }
}

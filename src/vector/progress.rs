//! `verify`'s progress/treatment collaborator (spec §4.1 `verify`).
//! Mirrors the `Treatment`/`Progress` split in the original driver:
//! `Treatment` picks what `verify` does when it finds damage,
//! `Progress` accumulates what it found and did.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Treatment {
    /// Report inconsistencies without modifying the file.
    Correct,
    /// Report and repair inconsistencies in place (e.g. recompute
    /// `count`/`popcount`, or the header's object_count/first/last keys).
    Repair,
}

#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub pages_checked: u64,
    pub pages_repaired: u64,
    pub inconsistencies: Vec<String>,
}

impl Progress {
    pub fn new() -> Self {
        Progress::default()
    }

    pub fn note_page(&mut self) {
        self.pages_checked += 1;
    }

    pub fn note_inconsistency(&mut self, description: impl Into<String>) {
        self.inconsistencies.push(description.into());
    }

    pub fn note_repair(&mut self) {
        self.pages_repaired += 1;
    }

    pub fn is_clean(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_progress_has_no_inconsistencies() {
        let mut p = Progress::new();
        p.note_page();
        assert!(p.is_clean());
        p.note_inconsistency("bitmap/count mismatch on page 3");
        assert!(!p.is_clean());
    }
}

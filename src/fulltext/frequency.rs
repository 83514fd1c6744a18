//! `Frequency`, spec §3/§4.2: document-frequency accumulator merged
//! element-wise (including recursive children) across parallel workers.

use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frequency {
    pub document_frequency: u32,
    pub total_term_frequency: u64,
    pub children: Vec<Frequency>,
}

impl Frequency {
    pub fn new() -> Self {
        Frequency::default()
    }

    pub fn leaf(document_frequency: u32, total_term_frequency: u64) -> Self {
        Frequency { document_frequency, total_term_frequency, children: Vec::new() }
    }

    /// Element-wise pairwise sum, recursing into children. Fails
    /// `BadArgument` if the two sides don't have the same child shape —
    /// spec §4.2: "merging across different child counts fails".
    pub fn merge(&mut self, other: &Frequency) -> Result<()> {
        if self.children.len() != other.children.len() {
            return Err(Error::new(
                ErrorKind::BadArgument,
                format!(
                    "frequency merge shape mismatch: {} vs {} children",
                    self.children.len(),
                    other.children.len()
                ),
            ));
        }
        self.document_frequency += other.document_frequency;
        self.total_term_frequency += other.total_term_frequency;
        for (a, b) in self.children.iter_mut().zip(&other.children) {
            a.merge(b)?;
        }
        Ok(())
    }

    /// Fold a batch of per-worker frequencies produced over a partition
    /// of `[1, maxID]` into one total (spec §4.2/§8 scenario E).
    pub fn merge_all(mut parts: Vec<Frequency>) -> Result<Frequency> {
        let mut iter = parts.drain(..);
        let mut total = iter.next().unwrap_or_default();
        for part in iter {
            total.merge(&part)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_document_and_term_frequency() {
        let mut a = Frequency::leaf(3, 10);
        let b = Frequency::leaf(4, 12);
        a.merge(&b).unwrap();
        assert_eq!(a.document_frequency, 7);
        assert_eq!(a.total_term_frequency, 22);
    }

    #[test]
    fn merge_recurses_into_children() {
        let mut a = Frequency { document_frequency: 1, total_term_frequency: 1, children: vec![Frequency::leaf(1, 1)] };
        let b = Frequency { document_frequency: 2, total_term_frequency: 2, children: vec![Frequency::leaf(2, 2)] };
        a.merge(&b).unwrap();
        assert_eq!(a.children[0].document_frequency, 3);
    }

    #[test]
    fn merge_rejects_mismatched_child_shape() {
        let mut a = Frequency { document_frequency: 1, total_term_frequency: 1, children: vec![Frequency::leaf(1, 1)] };
        let b = Frequency::leaf(2, 2);
        let err = a.merge(&b).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadArgument);
    }

    #[test]
    fn merge_all_over_four_workers_matches_single_scan() {
        let parts: Vec<Frequency> = (0..4).map(|_| Frequency::leaf(125, 250)).collect();
        let total = Frequency::merge_all(parts).unwrap();
        assert_eq!(total.document_frequency, 500);
        assert_eq!(total.total_term_frequency, 1000);
    }
}

//! Query expansion, spec §4.2 "Query expansion": given a seed set of
//! matched documents, pick additional terms to fold back into the
//! query. Grounded on original_source `FullText2/Query.cpp`'s
//! expansion pass, which scores candidate terms by inverse document
//! frequency and keeps the top-N.

/// Picks and weighs expansion terms. Split out as a trait so a caller
/// can swap in a different weighting scheme without touching the
/// expansion driver.
pub trait TermWeighter {
    fn weight_term(&self, document_frequency: u32, total_documents: u32) -> f64;

    fn select_terms(&self, candidates: &[(String, u32)], total_documents: u32, limit: usize) -> Vec<String> {
        let mut scored: Vec<(&str, f64)> =
            candidates.iter().map(|(term, df)| (term.as_str(), self.weight_term(*df, total_documents))).collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(limit).map(|(term, _)| term.to_string()).collect()
    }
}

/// `idf`-style weighting: rarer terms in the seed set score higher.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyWeighter;

impl TermWeighter for FrequencyWeighter {
    fn weight_term(&self, document_frequency: u32, total_documents: u32) -> f64 {
        ((total_documents.max(1) as f64) / (document_frequency.max(1) as f64)).ln().max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarer_terms_are_weighted_higher() {
        let weighter = FrequencyWeighter;
        let common = weighter.weight_term(900, 1000);
        let rare = weighter.weight_term(5, 1000);
        assert!(rare > common);
    }

    #[test]
    fn select_terms_keeps_only_the_top_n() {
        let weighter = FrequencyWeighter;
        let candidates = vec![
            ("common".to_string(), 900),
            ("rare".to_string(), 5),
            ("medium".to_string(), 100),
        ];
        let picked = weighter.select_terms(&candidates, 1000, 2);
        assert_eq!(picked, vec!["rare".to_string(), "medium".to_string()]);
    }
}

use std::path::PathBuf;

/// Engine-wide tunables. Grounded on teacher `core/config.rs`; fields
/// replaced with the ones this core actually reads (page size, DF
/// worker policy, process-cost constant) instead of the teacher's
/// writer/reader-pool knobs.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_path: PathBuf,

    /// VectorFile page size in bytes. Spec §6: default 4 KiB for
    /// `Version == 1`, driver default (here, also 4 KiB) for `Version >= 2`.
    pub page_size_bytes: usize,

    /// `DocumentFrequencyCalculatingLimit` (spec §4.2), cap on terms
    /// measured per DF batch.
    pub document_frequency_calculating_limit: usize,

    /// Upper bound on fork-join worker count for parallel DF/count/result
    /// sections (spec §5), independent of the process-wide rayon cap.
    pub max_df_workers: usize,

    /// Documents per worker used by the volume heuristic (spec §5)
    /// before `max_df_workers` clamps it.
    pub docs_per_worker: u32,

    /// Disk transfer speed in bytes/sec, used by `getProcessCost`/`getOverhead`.
    pub transfer_speed_bytes_per_sec: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: PathBuf::from("./data"),
            page_size_bytes: 4 * 1024,
            document_frequency_calculating_limit: 100,
            max_df_workers: num_cpus::get(),
            docs_per_worker: 50_000,
            transfer_speed_bytes_per_sec: 40.0 * 1024.0 * 1024.0,
        }
    }
}

impl Config {
    /// Worker count for a parallel section over `max_document_id` documents,
    /// per spec §5's "document-volume heuristic and process-wide thread cap".
    pub fn worker_count_for(&self, max_document_id: u32) -> usize {
        let by_volume = (max_document_id as u64 / self.docs_per_worker as u64).max(1) as usize;
        by_volume
            .min(self.max_df_workers)
            .min(rayon::current_num_threads())
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_size_is_4kib() {
        assert_eq!(Config::default().page_size_bytes, 4096);
    }

    #[test]
    fn worker_count_is_clamped() {
        let mut cfg = Config::default();
        cfg.max_df_workers = 4;
        cfg.docs_per_worker = 100;
        assert_eq!(cfg.worker_count_for(50), 1);
        assert!(cfg.worker_count_for(1_000_000) <= 4);
    }
}

//! `Candidate`, spec §4.3: the access-plan artifact every `Table`
//! variant/statement combination produces. Grounded on original_source
//! `Plan::Interface::ICandidate` (`DPlan/Candidate/Impl/TableImpl.h`):
//! `generateSQL`, `delay`, `inquiry` survive as trait methods; `adopt`
//! (emitting an `Execution::Interface::IIterator`) has no counterpart
//! since this crate stops at SQL generation, not execution.

use crate::core::error::Result;
use crate::planner::environment::Environment;
use crate::planner::sql_gen::SqlQuery;

/// Bitmask values for `Candidate::inquiry`'s `Target`, spec §4.3
/// "Inquiry protocol".
pub mod inquiry {
    pub const REFER_TABLE: u8 = 1 << 0;
    pub const DISTINCT: u8 = 1 << 1;
    pub const DEPENDING: u8 = 1 << 2;
    pub const REFERING: u8 = 1 << 3;
    pub const DISTRIBUTED: u8 = 1 << 4;
}

/// `arg.minimum = true` requests maximum delay, spec §4.3 "Delay of
/// retrieval".
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayArgument {
    pub minimum: bool,
}

pub trait Candidate: Send + Sync {
    fn generate_sql(&self, env: &Environment) -> Result<SqlQuery>;

    /// Returns true when `field` can be delayed (fetched lazily rather
    /// than materialized at scan time).
    fn delay(&self, _field: &str, _arg: &DelayArgument) -> bool {
        false
    }

    /// Caller sets the bits of `target` it cares about; the returned
    /// bits are the subset that hold for this candidate.
    fn inquiry(&self, target: u8) -> u8;
}

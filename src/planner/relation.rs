//! `Relation`, spec §4.3: the logical table/statement node that builds
//! a `Candidate` for its access plan. Grounded on original_source
//! `Plan::Interface::IRelation` / `DPlan::Relation::TableImpl::{Retrieve,
//! Insert,Update,Delete}`. Kept thin here — most of the planning logic
//! lives directly in the `retrieve`/`insert`/`update`/`delete` candidate
//! constructors, since this crate stops at SQL generation and has no
//! execution iterator to adopt into.

use crate::core::error::Result;
use crate::planner::candidate::Candidate;
use crate::planner::environment::Environment;

pub trait Relation: Send + Sync {
    fn create_access_plan(&self, env: &mut Environment) -> Result<Box<dyn Candidate>>;

    /// Same bitmask contract as `Candidate::inquiry`, spec §4.3.
    fn inquiry(&self, target: u8) -> u8;
}

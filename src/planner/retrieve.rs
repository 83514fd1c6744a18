//! Retrieve candidates, spec §4.3 "Candidate creation":
//! "`Retrieve` produces a candidate that, at adopt time, emits an
//! iterator issuing a SQL `SELECT` to each child cascade, unions the
//! results (and merges by sort-key if an `ORDER BY` is pushed down)."
//! Grounded on original_source `DPlan::Candidate::TableImpl::{Distribute,
//! Replicate}::Retrieve`.

use crate::core::error::Result;
use crate::planner::candidate::{inquiry, Candidate};
use crate::planner::environment::Environment;
use crate::planner::order::OrderSpecification;
use crate::planner::predicate::IPredicate;
use crate::planner::sql_gen::{to_sql_statement, SqlQuery};
use crate::planner::table::Table;
use crate::planner::union::UnionKind;

pub struct RetrieveCandidate {
    pub table: Table,
    pub columns: Vec<String>,
    pub predicate: Option<Box<dyn IPredicate>>,
    pub order: OrderSpecification,
}

impl RetrieveCandidate {
    /// One `SELECT` per cascade, spec §4.3. The union strategy is
    /// `Sort` when an order is pushed down (so per-cascade streams can
    /// be merged by key), `Cascade` otherwise.
    pub fn per_cascade_statements(&self, env: &Environment) -> Result<Vec<(String, SqlQuery)>> {
        let table_name = "t";
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        self.table
            .cascades()
            .iter()
            .map(|cascade| {
                let query = to_sql_statement(env, table_name, &columns, self.predicate.as_deref(), &self.order)?;
                Ok((cascade.clone(), query))
            })
            .collect()
    }

    pub fn union_kind(&self) -> UnionKind {
        if self.order.is_empty() {
            UnionKind::Cascade { distinct: false }
        } else {
            UnionKind::Sort { order: self.order.clone() }
        }
    }
}

impl Candidate for RetrieveCandidate {
    fn generate_sql(&self, env: &Environment) -> Result<SqlQuery> {
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        to_sql_statement(env, "t", &columns, self.predicate.as_deref(), &self.order)
    }

    fn inquiry(&self, target: u8) -> u8 {
        let mut held = 0u8;
        held |= target & inquiry::REFER_TABLE;
        if matches!(self.table, Table::Distribute { .. }) {
            held |= target & inquiry::DISTRIBUTED;
        }
        held
    }
}

//! Delete candidates, spec §4.3 "Candidate creation": "`Delete`: fans
//! DELETE to all cascades." Grounded on original_source
//! `DPlan::Candidate::TableImpl::Delete`.

use crate::core::error::Result;
use crate::planner::candidate::{inquiry, Candidate};
use crate::planner::environment::Environment;
use crate::planner::predicate::IPredicate;
use crate::planner::sql_gen::{to_sql_delete, SqlQuery};
use crate::planner::table::Table;

pub struct DeleteCandidate {
    pub table: Table,
    pub predicate: Option<Box<dyn IPredicate>>,
}

impl DeleteCandidate {
    pub fn per_cascade_statements(&self, env: &Environment) -> Result<Vec<(String, SqlQuery)>> {
        self.table
            .cascades()
            .iter()
            .map(|cascade| Ok((cascade.clone(), to_sql_delete(env, "t", self.predicate.as_deref())?)))
            .collect()
    }
}

impl Candidate for DeleteCandidate {
    fn generate_sql(&self, env: &Environment) -> Result<SqlQuery> {
        to_sql_delete(env, "t", self.predicate.as_deref())
    }

    fn inquiry(&self, target: u8) -> u8 {
        let mut held = target & inquiry::REFER_TABLE;
        if matches!(self.table, Table::Distribute { .. }) {
            held |= target & inquiry::DISTRIBUTED;
        }
        held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_fans_to_every_cascade_of_a_replicated_table() {
        let env = Environment::new();
        let candidate = DeleteCandidate { table: Table::Replicate { cascades: vec!["c0".into(), "c1".into(), "c2".into()] }, predicate: None };
        let statements = candidate.per_cascade_statements(&env).unwrap();
        assert_eq!(statements.len(), 3);
        assert!(statements.iter().all(|(_, q)| q.text == "DELETE FROM t"));
    }
}

//! Update candidates, spec §4.3 "Candidate creation":
//! "`Update` (both): at present, issues the UPDATE prepared statement
//! to every cascade and lets the WHERE filter out non-matching rows;
//! key-changing updates on distribute are rejected or relocated per
//! flag." Grounded on original_source
//! `DPlan::Candidate::TableImpl::UpdateBase`.

use crate::core::error::{Error, ErrorKind, Result};
use crate::planner::candidate::{inquiry, Candidate};
use crate::planner::environment::Environment;
use crate::planner::predicate::IPredicate;
use crate::planner::scalar::IScalar;
use crate::planner::sql_gen::{to_sql_delete, to_sql_insert, to_sql_update, SqlQuery};
use crate::planner::table::{distribute, Table};

pub struct UpdateCandidate {
    pub table: Table,
    pub assignments: Vec<(String, Box<dyn IScalar>)>,
    pub predicate: Option<Box<dyn IPredicate>>,
    /// True when the UPDATE changes the distribution key.
    pub changes_partition_key: bool,
    pub relocate_update: bool,
}

impl UpdateCandidate {
    fn assignment_refs(&self) -> Vec<(&str, &dyn IScalar)> {
        self.assignments.iter().map(|(c, v)| (c.as_str(), v.as_ref())).collect()
    }

    /// One prepared UPDATE fanned to every cascade — unless the key
    /// changed on a distributed table, in which case spec §4.3 says
    /// relocation (DELETE+INSERT) is required when `relocate_update`
    /// is set, and an error otherwise.
    pub fn per_cascade_statements(&self, env: &Environment) -> Result<Vec<(String, SqlQuery)>> {
        if self.changes_partition_key {
            if let Table::Distribute { .. } = &self.table {
                if !self.relocate_update {
                    return Err(Error::new(
                        ErrorKind::NotSupported,
                        "update changes the distribution key; set relocate_update to relocate the row",
                    ));
                }
                return self.relocated_statements(env);
            }
        }
        let assignments = self.assignment_refs();
        self.table
            .cascades()
            .iter()
            .map(|cascade| {
                let query = to_sql_update(env, "t", &assignments, self.predicate.as_deref())?;
                Ok((cascade.clone(), query))
            })
            .collect()
    }

    fn relocated_statements(&self, env: &Environment) -> Result<Vec<(String, SqlQuery)>> {
        let delete = to_sql_delete(env, "t", self.predicate.as_deref())?;
        let columns: Vec<&str> = self.assignments.iter().map(|(c, _)| c.as_str()).collect();
        let values: Vec<&dyn IScalar> = self.assignments.iter().map(|(_, v)| v.as_ref()).collect();
        let insert = to_sql_insert(env, "t", &columns, &values)?;
        let (delete, insert) = distribute::relocate_update(delete, insert);
        let mut statements = Vec::new();
        for cascade in self.table.cascades() {
            statements.push((cascade.clone(), delete.clone()));
            statements.push((cascade.clone(), insert.clone()));
        }
        Ok(statements)
    }
}

impl Candidate for UpdateCandidate {
    fn generate_sql(&self, env: &Environment) -> Result<SqlQuery> {
        let assignments = self.assignment_refs();
        to_sql_update(env, "t", &assignments, self.predicate.as_deref())
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
    use crate::planner::scalar::Literal;
    use crate::planner::table::PartitionRule;

    fn distributed_table() -> Table {
        Table::Distribute {
            rule: PartitionRule::HashModulo { column: "key".to_string(), cascade_count: 2 },
            cascades: vec!["cascade0".to_string(), "cascade1".to_string()],
        }
    }

    #[test]
    fn non_key_changing_update_fans_to_every_cascade() {
        let env = Environment::new();
        let candidate = UpdateCandidate {
            table: distributed_table(),
            assignments: vec![("val".to_string(), Box::new(Literal { sql_text: "'z'".to_string() }))],
            predicate: None,
            changes_partition_key: false,
            relocate_update: false,
        };
        let statements = candidate.per_cascade_statements(&env).unwrap();
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn key_changing_update_without_relocate_flag_is_rejected() {
        let env = Environment::new();
        let candidate = UpdateCandidate {
            table: distributed_table(),
            assignments: vec![("key".to_string(), Box::new(Literal { sql_text: "2".to_string() }))],
            predicate: None,
            changes_partition_key: true,
            relocate_update: false,
        };
        let err = candidate.per_cascade_statements(&env).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotSupported);
    }

    #[test]
    fn key_changing_update_with_relocate_flag_emits_delete_then_insert_per_cascade() {
        let env = Environment::new();
        let candidate = UpdateCandidate {
            table: distributed_table(),
            assignments: vec![("key".to_string(), Box::new(Literal { sql_text: "2".to_string() }))],
            predicate: None,
            changes_partition_key: true,
            relocate_update: true,
        };
        let statements = candidate.per_cascade_statements(&env).unwrap();
        assert_eq!(statements.len(), 4);
        assert!(statements[0].1.text.starts_with("DELETE"));
        assert!(statements[1].1.text.starts_with("INSERT"));
    }
}

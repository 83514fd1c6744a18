//! Insert candidates, spec §4.3 "Candidate creation":
//! "`Insert` (distribute): resolves the target cascade via a partition
//! rule, materializes a row tuple per operand row, and issues a per-row
//! prepared `INSERT`... `Insert` (replicate): fans the insert to all
//! cascades." Grounded on original_source
//! `DPlan::Candidate::TableImpl::{Distribute,Replicate}::Insert`.

use crate::core::error::Result;
use crate::planner::candidate::{inquiry, Candidate};
use crate::planner::environment::Environment;
use crate::planner::scalar::IScalar;
use crate::planner::sql_gen::{to_sql_insert, SqlQuery};
use crate::planner::table::Table;

pub struct Row {
    pub key: u64,
    pub values: Vec<Box<dyn IScalar>>,
}

pub struct InsertCandidate {
    pub table: Table,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Spec §4.3 "`RelocateUpdate` flag, when set, converts a
    /// key-changing UPDATE into DELETE+INSERT on the correct cascade."
    pub relocate_update: bool,
}

impl InsertCandidate {
    /// One prepared `INSERT` per row, routed to its cascade. Distribute
    /// tables route by `PartitionRule`; replicate tables fan every row
    /// to every cascade (spec §4.3 scenario F).
    pub fn per_row_statements(&self, env: &Environment) -> Result<Vec<(String, SqlQuery)>> {
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let mut statements = Vec::new();
        match &self.table {
            Table::Distribute { rule, cascades } => {
                for row in &self.rows {
                    let cascade_index = rule.cascade_for(row.key);
                    let cascade = cascades
                        .get(cascade_index)
                        .ok_or_else(|| {
                            crate::core::error::Error::new(
                                crate::core::error::ErrorKind::BadArgument,
                                format!("partition rule selected out-of-range cascade {cascade_index}"),
                            )
                        })?
                        .clone();
                    let values: Vec<&dyn IScalar> = row.values.iter().map(|v| v.as_ref()).collect();
                    statements.push((cascade, to_sql_insert(env, "t", &columns, &values)?));
                }
            }
            Table::Replicate { cascades } => {
                for row in &self.rows {
                    let values: Vec<&dyn IScalar> = row.values.iter().map(|v| v.as_ref()).collect();
                    let query = to_sql_insert(env, "t", &columns, &values)?;
                    for cascade in cascades {
                        statements.push((cascade.clone(), query.clone()));
                    }
                }
            }
        }
        Ok(statements)
    }
}

impl Candidate for InsertCandidate {
    fn generate_sql(&self, env: &Environment) -> Result<SqlQuery> {
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let empty: Vec<&dyn IScalar> = Vec::new();
        to_sql_insert(env, "t", &columns, &empty)
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

    fn row(key: u64, literal: &str) -> Row {
        Row { key, values: vec![Box::new(Literal { sql_text: key.to_string() }), Box::new(Literal { sql_text: literal.to_string() })] }
    }

    #[test]
    fn distribute_insert_routes_each_row_to_exactly_one_cascade() {
        let env = Environment::new();
        let candidate = InsertCandidate {
            table: distributed_table(),
            columns: vec!["key".into(), "val".into()],
            rows: vec![row(1, "'a'"), row(2, "'b'"), row(3, "'c'")],
            relocate_update: false,
        };
        let statements = candidate.per_row_statements(&env).unwrap();
        assert_eq!(statements.len(), 3);
        let cascade0: Vec<_> = statements.iter().filter(|(c, _)| c == "cascade0").collect();
        let cascade1: Vec<_> = statements.iter().filter(|(c, _)| c == "cascade1").collect();
        assert_eq!(cascade0.len(), 1);
        assert_eq!(cascade1.len(), 2);
    }

    #[test]
    fn replicate_insert_fans_every_row_to_every_cascade() {
        let env = Environment::new();
        let candidate = InsertCandidate {
            table: Table::Replicate { cascades: vec!["c0".into(), "c1".into(), "c2".into()] },
            columns: vec!["key".into()],
            rows: vec![row(1, "'a'")],
            relocate_update: false,
        };
        let statements = candidate.per_row_statements(&env).unwrap();
        assert_eq!(statements.len(), 3);
    }
}

//! `Table`, spec §4.3 "Model": a relation is either horizontally
//! partitioned (`Distribute`, by a key/rule) or fully copied
//! (`Replicate`) across child cascades.

use crate::planner::sql_gen::SqlQuery;

/// How a `Distribute` table routes a row to one of its cascades.
#[derive(Debug, Clone)]
pub enum PartitionRule {
    HashModulo { column: String, cascade_count: usize },
}

impl PartitionRule {
    pub fn cascade_for(&self, key: u64) -> usize {
        match self {
            PartitionRule::HashModulo { cascade_count, .. } => (key % *cascade_count as u64) as usize,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Table {
    Distribute { rule: PartitionRule, cascades: Vec<String> },
    Replicate { cascades: Vec<String> },
}

impl Table {
    pub fn cascades(&self) -> &[String] {
        match self {
            Table::Distribute { cascades, .. } => cascades,
            Table::Replicate { cascades } => cascades,
        }
    }
}

/// Distribute-specific planning. `relocate_update` is the Open
/// Question resolution (spec §9/§SPEC_FULL §9): a key-changing UPDATE
/// on a distributed table is **not** made atomic. It is split into an
/// independently dispatched DELETE followed by an independently
/// dispatched INSERT; a crash between the two leaves the row only on
/// the delete side. This mirrors the original Sydney DPlan layer,
/// which does not implement two-phase commit across cascades either.
pub mod distribute {
    use super::*;

    pub fn relocate_update(delete: SqlQuery, insert: SqlQuery) -> (SqlQuery, SqlQuery) {
        (delete, insert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_modulo_routes_rows_to_expected_cascades() {
        let rule = PartitionRule::HashModulo { column: "key".to_string(), cascade_count: 2 };
        assert_eq!(rule.cascade_for(0), 0);
        assert_eq!(rule.cascade_for(1), 1);
        assert_eq!(rule.cascade_for(2), 0);
        assert_eq!(rule.cascade_for(3), 1);
    }

    #[test]
    fn relocate_update_returns_delete_then_insert_as_independent_statements() {
        let delete = SqlQuery::new("DELETE FROM t WHERE key = 1");
        let insert = SqlQuery::new("INSERT INTO t (key) VALUES (2)");
        let (d, i) = distribute::relocate_update(delete.clone(), insert.clone());
        assert_eq!(d.text, delete.text);
        assert_eq!(i.text, insert.text);
    }
}

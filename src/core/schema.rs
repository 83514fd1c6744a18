//! External collaborator (spec §1): "a schema of tables/columns/indexes/
//! cascades". The real schema catalog is out of scope; this module is
//! the minimal read-only view the planner needs to make access-plan
//! decisions, plus the pieces VectorFile needs to validate a row schema.

use crate::core::types::DataType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    /// True when this index also provides document ordering usable for
    /// an "order scan" (spec §4.3 `AdoptIndexArgument`).
    pub provides_order: bool,
}

/// One horizontally-partitioned or replicated child database node (spec
/// GLOSSARY: Cascade).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeInfo {
    pub id: u32,
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub indexes: Vec<IndexInfo>,
    pub cascades: Vec<CascadeInfo>,
}

impl TableInfo {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup_by_name() {
        let t = TableInfo {
            name: "orders".into(),
            columns: vec![ColumnInfo { name: "id".into(), data_type: DataType::UInt32, nullable: false }],
            indexes: vec![],
            cascades: vec![],
        };
        assert!(t.column("id").is_some());
        assert!(t.column("missing").is_none());
    }
}

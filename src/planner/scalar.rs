//! Scalar expression nodes, spec §4.3 "SQL generation": every scalar
//! exposes `to_sql(env)` and the planner recurses through it via
//! `sql_gen::to_sql_statement`. Grounded on original_source
//! `Plan::Interface::IScalar` (referenced throughout `DPlan/*/TableImpl.h`).

use crate::core::error::Result;
use crate::planner::environment::Environment;

pub trait IScalar: Send + Sync {
    fn to_sql(&self, env: &Environment) -> Result<String>;
}

/// A bare column reference.
pub struct ColumnRef {
    pub name: String,
}

impl IScalar for ColumnRef {
    fn to_sql(&self, _env: &Environment) -> Result<String> {
        Ok(self.name.clone())
    }
}

/// A literal already rendered to SQL text (caller is responsible for quoting).
pub struct Literal {
    pub sql_text: String,
}

impl IScalar for Literal {
    fn to_sql(&self, _env: &Environment) -> Result<String> {
        Ok(self.sql_text.clone())
    }
}

/// The routing predicate a `Distribute` insert evaluates per row,
/// spec §4.3 "a check expression (from the partition's rule) routes
/// each row": `hash(column) mod cascade_count == cascade_index`.
pub struct PartitionCheck {
    pub column: String,
    pub cascade_index: usize,
    pub cascade_count: usize,
}

impl IScalar for PartitionCheck {
    fn to_sql(&self, _env: &Environment) -> Result<String> {
        Ok(format!("(hash({}) % {} = {})", self.column, self.cascade_count, self.cascade_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_check_renders_modulo_expression() {
        let check = PartitionCheck { column: "key".to_string(), cascade_index: 1, cascade_count: 2 };
        let env = Environment::new();
        assert_eq!(check.to_sql(&env).unwrap(), "(hash(key) % 2 = 1)");
    }
}

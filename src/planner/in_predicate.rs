//! `IN` predicate back-ends, spec §4.3 "In-predicate specializations":
//! subquery, value-list, and variable-array, each planned into a
//! dedicated iterator shape. The value-list form accepts an optional
//! `#Neighbor` hint for approximate match.

use crate::planner::environment::ObjectId;

#[derive(Debug, Clone)]
pub enum InPredicate {
    Subquery { query: ObjectId },
    ValueList { values: Vec<String>, neighbor_hint: Option<f64> },
    VariableArray { variable: String },
}

impl InPredicate {
    pub fn is_approximate(&self) -> bool {
        matches!(self, InPredicate::ValueList { neighbor_hint: Some(_), .. })
    }
}

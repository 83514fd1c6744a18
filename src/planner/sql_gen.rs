//! `Sql::Query` and `toSQLStatement`, spec §4.3 "SQL generation": each
//! candidate exposes `generateSQL(env)`, and the planner emits textual
//! SQL from scalar nodes recursively via `toSQLStatement`.

use crate::core::error::Result;
use crate::planner::environment::Environment;
use crate::planner::order::OrderSpecification;
use crate::planner::predicate::IPredicate;
use crate::planner::scalar::IScalar;

/// One generated statement, ready to dispatch to a cascade.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub text: String,
}

impl SqlQuery {
    pub fn new(text: impl Into<String>) -> Self {
        SqlQuery { text: text.into() }
    }
}

/// Render `SELECT <columns> FROM <table> [WHERE ...] [ORDER BY ...]`.
pub fn to_sql_statement(
    env: &Environment,
    table: &str,
    columns: &[&str],
    predicate: Option<&dyn IPredicate>,
    order: &OrderSpecification,
) -> Result<SqlQuery> {
    let mut text = format!("SELECT {} FROM {}", columns.join(", "), table);
    if let Some(predicate) = predicate {
        text.push_str(" WHERE ");
        text.push_str(&predicate.to_sql(env)?);
    }
    if let Some(clause) = order.to_sql_clause() {
        text.push(' ');
        text.push_str(&clause);
    }
    Ok(SqlQuery::new(text))
}

/// Render a prepared `INSERT INTO <table> (<columns>) VALUES (<args>)`,
/// one per routed row (spec §4.3 "issues a per-row prepared INSERT").
pub fn to_sql_insert(env: &Environment, table: &str, columns: &[&str], values: &[&dyn IScalar]) -> Result<SqlQuery> {
    let rendered: Vec<String> = values.iter().map(|v| v.to_sql(env)).collect::<Result<_>>()?;
    Ok(SqlQuery::new(format!("INSERT INTO {} ({}) VALUES ({})", table, columns.join(", "), rendered.join(", "))))
}

pub fn to_sql_delete(env: &Environment, table: &str, predicate: Option<&dyn IPredicate>) -> Result<SqlQuery> {
    let mut text = format!("DELETE FROM {}", table);
    if let Some(predicate) = predicate {
        text.push_str(" WHERE ");
        text.push_str(&predicate.to_sql(env)?);
    }
    Ok(SqlQuery::new(text))
}

pub fn to_sql_update(env: &Environment, table: &str, assignments: &[(&str, &dyn IScalar)], predicate: Option<&dyn IPredicate>) -> Result<SqlQuery> {
    let rendered: Vec<String> = assignments
        .iter()
        .map(|(col, val)| val.to_sql(env).map(|v| format!("{col} = {v}")))
        .collect::<Result<_>>()?;
    let mut text = format!("UPDATE {} SET {}", table, rendered.join(", "));
    if let Some(predicate) = predicate {
        text.push_str(" WHERE ");
        text.push_str(&predicate.to_sql(env)?);
    }
    Ok(SqlQuery::new(text))
}

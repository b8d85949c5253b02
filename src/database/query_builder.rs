use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::FromRow;

/// A bound statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Str(String),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Str(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Str(v)
    }
}

impl From<&String> for SqlParam {
    fn from(v: &String) -> Self {
        SqlParam::Str(v.clone())
    }
}

/// Rendered statement plus its parameters in placeholder order
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

impl SqlResult {
    pub fn query(&self) -> sqlx::query::Query<'_, MySql, MySqlArguments> {
        let mut q = sqlx::query(&self.query);
        for p in self.params.iter() {
            q = bind_param_query(q, p);
        }
        q
    }

    pub fn query_as<T>(&self) -> sqlx::query::QueryAs<'_, MySql, T, MySqlArguments>
    where
        T: for<'r> FromRow<'r, MySqlRow>,
    {
        let mut q = sqlx::query_as::<_, T>(&self.query);
        for p in self.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q
    }
}

/// Accumulates optional `WHERE` predicates behind a fixed `SELECT ... FROM ...`.
///
/// Column names and clause text are always literals from the caller's code;
/// request values only ever travel as bound parameters.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base: String,
    conditions: Vec<String>,
    params: Vec<SqlParam>,
    group_by: Option<String>,
    order_by: Option<String>,
    limit: Option<i64>,
}

impl QueryBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            conditions: Vec::new(),
            params: Vec::new(),
            group_by: None,
            order_by: None,
            limit: None,
        }
    }

    /// Add `clause` (containing exactly one `?`) bound to `value`
    pub fn filter(mut self, clause: &str, value: impl Into<SqlParam>) -> Self {
        self.conditions.push(clause.to_string());
        self.params.push(value.into());
        self
    }

    /// Same as `filter`, skipped when the value is absent or blank
    pub fn filter_opt(self, clause: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => self.filter(clause, v),
            None => self,
        }
    }

    /// `column LIKE %value%`, skipped when the value is absent or blank
    pub fn contains(self, column: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => {
                let clause = format!("{} LIKE ?", column);
                self.filter(&clause, format!("%{}%", v))
            }
            None => self,
        }
    }

    /// Predicate with no parameter
    pub fn where_raw(mut self, clause: &str) -> Self {
        self.conditions.push(clause.to_string());
        self
    }

    /// `column IN (?, ?, ...)`; an empty slice matches nothing
    pub fn filter_in(mut self, column: &str, values: &[i64]) -> Self {
        let (clause, params) = in_clause(column, values);
        self.conditions.push(clause);
        self.params.extend(params);
        self
    }

    pub fn group_by(mut self, clause: &str) -> Self {
        self.group_by = Some(clause.to_string());
        self
    }

    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_by = Some(clause.to_string());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }

    pub fn build(self) -> SqlResult {
        let mut query = self.base;
        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }
        if let Some(group_by) = self.group_by {
            query.push_str(" GROUP BY ");
            query.push_str(&group_by);
        }
        if let Some(order_by) = self.order_by {
            query.push_str(" ORDER BY ");
            query.push_str(&order_by);
        }
        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {}", limit));
        }
        SqlResult {
            query,
            params: self.params,
        }
    }
}

/// Accumulates `SET` assignments for `UPDATE table`; parameters for SET come
/// before those of WHERE, matching placeholder order.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    assignments: Vec<String>,
    set_params: Vec<SqlParam>,
    conditions: Vec<String>,
    where_params: Vec<SqlParam>,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            assignments: Vec::new(),
            set_params: Vec::new(),
            conditions: Vec::new(),
            where_params: Vec::new(),
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<SqlParam>) -> Self {
        self.assignments.push(format!("{} = ?", column));
        self.set_params.push(value.into());
        self
    }

    pub fn set_opt(self, column: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    pub fn set_raw(mut self, assignment: &str) -> Self {
        self.assignments.push(assignment.to_string());
        self
    }

    pub fn filter(mut self, clause: &str, value: impl Into<SqlParam>) -> Self {
        self.conditions.push(clause.to_string());
        self.where_params.push(value.into());
        self
    }

    pub fn filter_in(mut self, column: &str, values: &[i64]) -> Self {
        let (clause, params) = in_clause(column, values);
        self.conditions.push(clause);
        self.where_params.extend(params);
        self
    }

    pub fn build(self) -> SqlResult {
        let mut query = format!("UPDATE {} SET {}", self.table, self.assignments.join(", "));
        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }
        let mut params = self.set_params;
        params.extend(self.where_params);
        SqlResult { query, params }
    }
}

fn in_clause(column: &str, values: &[i64]) -> (String, Vec<SqlParam>) {
    if values.is_empty() {
        return ("1=0".to_string(), Vec::new());
    }
    let placeholders = vec!["?"; values.len()].join(", ");
    (
        format!("{} IN ({})", column, placeholders),
        values.iter().copied().map(SqlParam::Int).collect(),
    )
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, MySql, MySqlArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Str(s) => q.bind(s.as_str()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, MySql, O, MySqlArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, MySql, O, MySqlArguments>
where
    O: for<'r> FromRow<'r, MySqlRow>,
{
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Str(s) => q.bind(s.as_str()),
    }
}

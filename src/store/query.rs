//! SQL rendering for array-overlap statement stores
//!
//! Statements are expected in a `statements` table whose `actions`,
//! `resources` and `principals` columns are text arrays (ideally GIN indexed)
//! and whose `type` column holds the effect. Pattern sets are bound as
//! parameters and compared with the PostgreSQL overlap operator `&&`.

use crate::store::{EvaluationRequest, QueryKind};
use serde::Serialize;
use std::fmt::Display;

/// A bound query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryParam {
    Text(String),
    TextArray(Vec<String>),
}

/// Query text with positional (`$1`, `$2`, ...) parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlQuery {
    pub text: String,
    pub params: Vec<QueryParam>,
}

/// Builder for statement queries
///
/// Provides a fluent API for appending `AND` conditions; values are always
/// bound as parameters and never spliced into the query text.
///
/// # Example
/// ```
/// use iam_krn::store::QueryBuilder;
///
/// let query = QueryBuilder::new("select s.id from statements s")
///     .optional("type", Some("allow"))
///     .overlaps("actions", &["iam:*".to_string()])
///     .overlaps("principals", &[])
///     .build();
/// assert_eq!(
///     query.text,
///     "select s.id from statements s where 1 = 1\nAND \"type\" = $1\nAND \"actions\" && $2"
/// );
/// ```
#[derive(Debug)]
pub struct QueryBuilder {
    text: String,
    params: Vec<QueryParam>,
}

impl QueryBuilder {
    /// Start a query from a `select ... from ...` clause
    pub fn new(select: &str) -> Self {
        Self {
            text: format!("{select} where 1 = 1"),
            params: Vec::new(),
        }
    }

    fn bind(&mut self, param: QueryParam) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Add an equality condition (always included)
    pub fn equals(mut self, column: &str, value: impl Display) -> Self {
        let n = self.bind(QueryParam::Text(value.to_string()));
        self.text.push_str(&format!("\nAND \"{column}\" = ${n}"));
        self
    }

    /// Add an equality condition (only included if Some)
    pub fn optional<T: Display>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.equals(column, v),
            None => self,
        }
    }

    /// Add an array-overlap condition (skipped for an empty set)
    pub fn overlaps(mut self, column: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        let n = self.bind(QueryParam::TextArray(values.to_vec()));
        self.text.push_str(&format!("\nAND \"{column}\" && ${n}"));
        self
    }

    pub fn build(self) -> SqlQuery {
        SqlQuery {
            text: self.text,
            params: self.params,
        }
    }
}

/// Render the query answering `kind` for `request`
pub fn render_query(kind: QueryKind, request: &EvaluationRequest) -> SqlQuery {
    let select = match kind {
        QueryKind::Exists | QueryKind::StatementIds => "select s.id from statements s",
        QueryKind::Resources => "select distinct unnest(s.resources) from statements s",
        QueryKind::Principals => "select distinct unnest(s.principals) from statements s",
    };

    let mut query = QueryBuilder::new(select)
        .optional("type", request.effect)
        .overlaps("actions", &request.actions)
        .overlaps("resources", &request.resources)
        .overlaps("principals", &request.principals)
        .build();

    if kind == QueryKind::Exists {
        query.text = format!("select exists({})", query.text);
    }

    query
}

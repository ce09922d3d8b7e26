//! Policy statement store interface
//!
//! A store answers questions about statements whose action, resource and
//! principal sets intersect the pattern sets of an [`EvaluationRequest`].
//! The identifiers supply those pattern sets through their ancestor patterns;
//! the store performs the intersection (e.g. with array-overlap indexes).
//!
//! ## Store questions
//!
//! - does any statement match? ([`StatementStore::exists`])
//! - which statements match? ([`StatementStore::statement_ids`])
//! - which distinct resources/principals do the matches name?
//!
//! Combining allow and deny matches into a final decision is left to callers.

pub mod fixtures;
pub mod memory;
pub mod query;
pub mod statement;

pub use fixtures::StatementGenerator;
pub use memory::MemoryStore;
pub use query::{QueryBuilder, QueryParam, SqlQuery, render_query};
pub use statement::{Effect, EvaluationRequest, Statement};

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Question asked of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Whether any statement matches
    #[default]
    Exists,
    /// IDs of matching statements
    StatementIds,
    /// Distinct resources named by matching statements
    Resources,
    /// Distinct principals named by matching statements
    Principals,
}

impl QueryKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Exists => "exists",
            QueryKind::StatementIds => "statement_ids",
            QueryKind::Resources => "resources",
            QueryKind::Principals => "principals",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exists" => Ok(QueryKind::Exists),
            "statement_ids" | "ids" => Ok(QueryKind::StatementIds),
            "resources" => Ok(QueryKind::Resources),
            "principals" => Ok(QueryKind::Principals),
            _ => Err(StoreError::InvalidArgument(format!(
                "unknown query kind '{s}'"
            ))),
        }
    }
}

/// Matching resources split by statement effect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectGroups {
    pub allowed: Vec<String>,
    pub denied: Vec<String>,
}

/// Store of policy statements
///
/// Implementations treat a statement as matching when, for every non-empty
/// pattern set of the request, the statement's corresponding set shares at
/// least one value with it, and the effect equals the request's effect filter
/// when one is set.
#[async_trait]
pub trait StatementStore: Send + Sync {
    async fn exists(&self, request: &EvaluationRequest) -> StoreResult<bool>;

    async fn statement_ids(&self, request: &EvaluationRequest) -> StoreResult<Vec<u64>>;

    async fn matching_resources(&self, request: &EvaluationRequest) -> StoreResult<Vec<String>>;

    async fn matching_principals(&self, request: &EvaluationRequest)
    -> StoreResult<Vec<String>>;

    /// Matching resources grouped by effect; the request's own effect is ignored
    async fn resources_by_effect(&self, request: &EvaluationRequest) -> StoreResult<EffectGroups> {
        let allowed = self
            .matching_resources(&request.clone().with_effect(Effect::Allow))
            .await?;
        let denied = self
            .matching_resources(&request.clone().with_effect(Effect::Deny))
            .await?;
        Ok(EffectGroups { allowed, denied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_kind_roundtrip() {
        for kind in [
            QueryKind::Exists,
            QueryKind::StatementIds,
            QueryKind::Resources,
            QueryKind::Principals,
        ] {
            assert_eq!(kind.as_str().parse::<QueryKind>().unwrap(), kind);
        }
        assert_eq!("ids".parse::<QueryKind>().unwrap(), QueryKind::StatementIds);
        assert!(matches!(
            "count".parse::<QueryKind>(),
            Err(StoreError::InvalidArgument(_))
        ));
    }
}

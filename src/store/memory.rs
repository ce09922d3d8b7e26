//! In-memory statement store
//!
//! Evaluates requests by plain set intersection over a fixed list of
//! statements. Useful for tests and for the command-line demo.

use crate::error::{StoreError, StoreResult};
use crate::store::{EvaluationRequest, Statement, StatementStore};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, trace};

/// Immutable in-memory statement store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    statements: Vec<Statement>,
}

/// Request pattern sets prepared for lookups
struct Filter<'a> {
    request: &'a EvaluationRequest,
    actions: HashSet<&'a str>,
    resources: HashSet<&'a str>,
    principals: HashSet<&'a str>,
}

impl<'a> Filter<'a> {
    fn new(request: &'a EvaluationRequest) -> Self {
        let set = |values: &'a [String]| -> HashSet<&'a str> {
            values.iter().map(String::as_str).collect()
        };
        Self {
            request,
            actions: set(&request.actions),
            resources: set(&request.resources),
            principals: set(&request.principals),
        }
    }

    fn accepts(&self, statement: &Statement) -> bool {
        self.request.effect.is_none_or(|e| e == statement.effect)
            && overlaps(&self.actions, &statement.actions)
            && overlaps(&self.resources, &statement.resources)
            && overlaps(&self.principals, &statement.principals)
    }
}

/// An empty pattern set constrains nothing
fn overlaps<T: AsRef<str>>(patterns: &HashSet<&str>, values: &[T]) -> bool {
    patterns.is_empty() || values.iter().any(|v| patterns.contains(v.as_ref()))
}

impl MemoryStore {
    /// Create a store, validating statements and numbering those without an ID
    ///
    /// Explicit IDs must be unique. Unnumbered statements get IDs above the
    /// highest explicit one, in list order.
    pub fn new(statements: Vec<Statement>) -> StoreResult<Self> {
        let mut statements = statements;
        let mut ids = HashSet::new();
        for statement in &statements {
            statement.validate()?;
            if statement.id != 0 && !ids.insert(statement.id) {
                return Err(StoreError::InvalidStatement(format!(
                    "duplicate statement id {}",
                    statement.id
                )));
            }
        }

        let mut next_id = ids.into_iter().max().unwrap_or(0);
        for statement in statements.iter_mut().filter(|s| s.id == 0) {
            next_id += 1;
            statement.id = next_id;
        }

        debug!(statements = statements.len(), "Created memory store");
        Ok(Self { statements })
    }

    /// Load statements from a JSON array
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let statements: Vec<Statement> = serde_json::from_str(json)?;
        Self::new(statements)
    }

    /// Load statements from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading statements");
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    fn matching<'a>(
        &'a self,
        request: &'a EvaluationRequest,
    ) -> impl Iterator<Item = &'a Statement> + 'a {
        let filter = Filter::new(request);
        self.statements.iter().filter(move |s| {
            let accepted = filter.accepts(s);
            trace!(statement = s.id, accepted, "Evaluated statement");
            accepted
        })
    }
}

#[async_trait]
impl StatementStore for MemoryStore {
    async fn exists(&self, request: &EvaluationRequest) -> StoreResult<bool> {
        Ok(self.matching(request).next().is_some())
    }

    async fn statement_ids(&self, request: &EvaluationRequest) -> StoreResult<Vec<u64>> {
        Ok(self.matching(request).map(|s| s.id).collect())
    }

    async fn matching_resources(&self, request: &EvaluationRequest) -> StoreResult<Vec<String>> {
        let distinct: BTreeSet<&str> = self
            .matching(request)
            .flat_map(|s| s.resources.iter().map(|r| r.as_str()))
            .collect();
        Ok(distinct.into_iter().map(String::from).collect())
    }

    async fn matching_principals(
        &self,
        request: &EvaluationRequest,
    ) -> StoreResult<Vec<String>> {
        let distinct: BTreeSet<&str> = self
            .matching(request)
            .flat_map(|s| s.principals.iter().map(|p| p.as_str()))
            .collect();
        Ok(distinct.into_iter().map(String::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Effect;

    fn store() -> MemoryStore {
        MemoryStore::from_json(
            r#"[
                {"type": "allow", "actions": ["iam:endpoint:*"],
                 "resources": ["krn:iam:kaa::endpoint/*"], "principals": ["krn:iam:kaa::user/1"]},
                {"type": "deny", "actions": ["iam:endpoint:delete"],
                 "resources": ["krn:iam:kaa::endpoint/7"], "principals": []}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ids_are_assigned() {
        let store = store();
        let ids: Vec<u64> = store.statements().iter().map(|s| s.id).collect();
        assert_eq!(ids, [1, 2]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_request_matches_everything() {
        let store = store();
        let ids = store
            .statement_ids(&EvaluationRequest::default())
            .await
            .unwrap();
        assert_eq!(ids, [1, 2]);
    }

    #[tokio::test]
    async fn test_empty_principals_never_overlap() {
        let store = store();
        let request = EvaluationRequest::default()
            .with_principals(["*"])
            .with_effect(Effect::Deny);
        assert!(!store.exists(&request).await.unwrap());
    }

    #[test]
    fn test_unnumbered_ids_follow_explicit_ones() {
        let store = MemoryStore::from_json(
            r#"[
                {"type": "allow", "actions": ["*"], "resources": ["*"]},
                {"id": 2, "type": "allow", "actions": ["*"], "resources": ["*"]},
                {"type": "deny", "actions": ["*"], "resources": ["*"]}
            ]"#,
        )
        .unwrap();
        let ids: Vec<u64> = store.statements().iter().map(|s| s.id).collect();
        assert_eq!(ids, [3, 2, 4]);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = MemoryStore::from_json(
            r#"[
                {"id": 5, "type": "allow", "actions": ["*"], "resources": ["*"]},
                {"id": 5, "type": "deny", "actions": ["*"], "resources": ["*"]}
            ]"#,
        );
        assert!(matches!(result, Err(StoreError::InvalidStatement(_))));
    }

    #[test]
    fn test_rejects_invalid_statement() {
        let result = MemoryStore::from_json(r#"[{"type": "allow", "actions": [], "resources": ["*"]}]"#);
        assert!(result.is_err());
    }
}

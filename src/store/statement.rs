//! Policy statements and evaluation requests

use crate::error::{StoreError, StoreResult};
use crate::identifier::{Action, Krn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[serde(alias = "Allow")]
    Allow,
    #[serde(alias = "Deny")]
    Deny,
}

impl Effect {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "allow",
            Effect::Deny => "deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(Effect::Allow),
            "deny" => Ok(Effect::Deny),
            _ => Err(StoreError::InvalidArgument(format!(
                "unknown effect '{s}', expected allow or deny"
            ))),
        }
    }
}

/// A stored policy statement
///
/// The effect is encoded under the `type` key; `effect` is accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Surrogate ID; `0` means unassigned
    #[serde(default)]
    pub id: u64,

    #[serde(rename = "type", alias = "effect")]
    pub effect: Effect,

    pub actions: Vec<Action>,

    pub resources: Vec<Krn>,

    #[serde(default)]
    pub principals: Vec<Krn>,
}

impl Statement {
    /// Create a validated statement without an ID
    pub fn new(
        effect: Effect,
        actions: Vec<Action>,
        resources: Vec<Krn>,
        principals: Vec<Krn>,
    ) -> StoreResult<Self> {
        let statement = Self {
            id: 0,
            effect,
            actions,
            resources,
            principals,
        };
        statement.validate()?;
        Ok(statement)
    }

    /// Actions and resources are required; principals may be empty
    pub fn validate(&self) -> StoreResult<()> {
        if self.actions.is_empty() {
            return Err(StoreError::InvalidStatement(format!(
                "statement {} has no actions",
                self.id
            )));
        }
        if self.resources.is_empty() {
            return Err(StoreError::InvalidStatement(format!(
                "statement {} has no resources",
                self.id
            )));
        }
        Ok(())
    }
}

/// Pattern sets describing one authorization question
///
/// An empty set places no constraint on its column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    #[serde(default)]
    pub actions: Vec<String>,

    #[serde(default)]
    pub resources: Vec<String>,

    #[serde(default)]
    pub principals: Vec<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

impl EvaluationRequest {
    /// Request covering every statement that could apply to the identifiers
    pub fn for_identifiers(action: &Action, resource: &Krn, principal: &Krn) -> Self {
        Self {
            actions: action.ancestor_patterns(),
            resources: resource.ancestor_patterns(),
            principals: principal.ancestor_patterns(),
            effect: None,
        }
    }

    /// Parse a request from identifier text
    ///
    /// A single resource contributes its ancestor patterns; several resources
    /// are matched as an explicit list of KRNs.
    pub fn parse<I, S>(action: &str, resources: I, principal: &str) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let action = Action::parse(action)?;
        let principal = Krn::parse(principal)?;
        let resources = Krn::parse_all(resources)?;

        let Some((first, rest)) = resources.split_first() else {
            return Err(StoreError::InvalidArgument(
                "at least one resource is required".to_string(),
            )
            .into());
        };

        let request = Self::for_identifiers(&action, first, &principal);
        if rest.is_empty() {
            return Ok(request);
        }
        Ok(request.with_resources(resources.iter().map(Krn::to_string)))
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Replace the resource set, e.g. with an explicit list of concrete KRNs
    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the principal set
    pub fn with_principals<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.principals = principals.into_iter().map(Into::into).collect();
        self
    }
}

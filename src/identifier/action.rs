//! Actions: resource operations within a service
//!
//! A principal must be allowed an action to perform the associated operation.
//! The format is
//!
//! ```text
//! <service>:<resource type>[:<target resource type>]:<operation>
//! ```
//!
//! e.g. `iam:user:read` or `iam:group:user:add`. The optional target resource
//! type names the resource impacted when it differs from the one the action is
//! granted against: `iam:group:user:add` is granted against a group but adds
//! users.
//!
//! A wildcard action ends with an asterisk that immediately follows a `:`
//! (`iam:*`, `iam:group:*`), except for the blanket wildcard `*`. Wildcards
//! match every action sharing their text up to the asterisk.

use crate::error::ActionError;
use crate::identifier::ancestors::ancestor_patterns;
use crate::identifier::token::{Charset, WILDCARD, WILDCARD_CHAR};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

const DELIMITER: char = ':';

/// Delimiters required in a concrete action
const MIN_DELIMITERS: usize = 2;

/// Delimiters allowed in any action
const MAX_DELIMITERS: usize = 3;

/// A valid, immutable action or action wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Action(Cow<'static, str>);

/// Validator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the start or right after a delimiter
    ExpectToken,
    /// Inside a token
    InToken,
    /// Consumed the terminal asterisk; nothing may follow
    Wildcard,
}

/// Run the action grammar over `text`
fn validate(text: &str) -> Result<(), ActionError> {
    if text.is_empty() {
        return Err(ActionError::malformed(text, "empty action"));
    }

    let mut state = State::ExpectToken;
    let mut delimiters = 0;

    for (i, c) in text.char_indices() {
        state = match (state, c) {
            (State::Wildcard, _) => {
                return Err(ActionError::wildcard(
                    text,
                    "asterisk must be the last character",
                ));
            }
            (State::ExpectToken | State::InToken, c) if Charset::Action.allows(c) => {
                State::InToken
            }
            (State::InToken, DELIMITER) => {
                delimiters += 1;
                if delimiters > MAX_DELIMITERS {
                    return Err(ActionError::malformed(
                        text,
                        format!("more than {MAX_DELIMITERS} delimiters"),
                    ));
                }
                State::ExpectToken
            }
            (State::ExpectToken, DELIMITER) => {
                return Err(ActionError::malformed(
                    text,
                    format!("empty token before delimiter at index {i}"),
                ));
            }
            (State::ExpectToken, WILDCARD_CHAR) => State::Wildcard,
            (State::InToken, WILDCARD_CHAR) => {
                return Err(ActionError::wildcard(
                    text,
                    format!("asterisk at index {i} does not follow a delimiter"),
                ));
            }
            (_, c) => {
                return Err(ActionError::malformed(
                    text,
                    format!("invalid character '{c}' at index {i}"),
                ));
            }
        };
    }

    match state {
        State::Wildcard => Ok(()),
        State::ExpectToken => Err(ActionError::malformed(text, "ends with a delimiter")),
        State::InToken if delimiters < MIN_DELIMITERS => Err(ActionError::malformed(
            text,
            format!("fewer than {MIN_DELIMITERS} delimiters"),
        )),
        State::InToken => Ok(()),
    }
}

impl Action {
    /// Blanket wildcard matching any valid action
    pub const ANY: Action = Action(Cow::Borrowed(WILDCARD));

    /// Parse and validate an action
    pub fn parse(text: &str) -> Result<Self, ActionError> {
        validate(text)?;
        Ok(Self(Cow::Owned(text.to_string())))
    }

    /// Whether `text` is a well-formed action or action wildcard
    pub fn is_valid(text: &str) -> bool {
        validate(text).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Colon-delimited segments; a wildcard's last segment is `*`
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(DELIMITER)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.ends_with(WILDCARD_CHAR)
    }

    pub fn is_blanket(&self) -> bool {
        self.0 == WILDCARD
    }

    /// Whether `self` falls within `pattern`
    pub fn matches(&self, pattern: &Action) -> bool {
        match pattern.0.strip_suffix(WILDCARD_CHAR) {
            Some(prefix) => self.0.starts_with(prefix),
            None => self.0 == pattern.0,
        }
    }

    /// Every action pattern that matches this action, most specific first
    ///
    /// `iam:user:read` yields `iam:user:read`, `iam:user:*`, `iam:*`, `*`.
    pub fn ancestor_patterns(&self) -> Vec<String> {
        ancestor_patterns(&self.0, !self.is_wildcard(), &[DELIMITER], 0)
    }

    /// Same as [`Action::ancestor_patterns`], as actions
    pub fn ancestor_actions(&self) -> Vec<Action> {
        self.ancestor_patterns()
            .into_iter()
            .map(|p| Action(Cow::Owned(p)))
            .collect()
    }

    /// Standard base64 encoding of the action text
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0.as_bytes())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Action {
    type Error = ActionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate(&value)?;
        Ok(Self(Cow::Owned(value)))
    }
}

impl TryFrom<&str> for Action {
    type Error = ActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.0.into_owned()
    }
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

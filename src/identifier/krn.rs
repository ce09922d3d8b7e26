//! KRN: hierarchical resource and principal names
//!
//! The canonical text form is
//!
//! ```text
//! krn:<service>:<tenant ID>:[<pool>]:<resource type>[/<resource path>]/<resource ID>
//! ```
//!
//! Tokens are separated by `:`, subtokens of the pool, resource type, path and
//! ID by `/`. A single trailing `*` may replace everything from any hierarchy
//! boundary onwards, and the literal `*` is the blanket wildcard matching
//! every KRN.

use crate::error::KrnError;
use crate::identifier::ancestors::ancestor_patterns;
use crate::identifier::token::{Charset, WILDCARD, WILDCARD_CHAR, is_wildcard};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard KRN prefix token
pub const KRN_PREFIX: &str = "krn";

const TOKEN_SEPARATOR: char = ':';
const SUBTOKEN_SEPARATOR: char = '/';
const MAX_TOKENS: usize = 5;

/// A level of the KRN hierarchy, in hierarchy order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Service,
    TenantId,
    Pool,
    ResourceType,
    ResourcePath,
    ResourceId,
}

impl Level {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Service => "service",
            Level::TenantId => "tenant ID",
            Level::Pool => "pool",
            Level::ResourceType => "resource type",
            Level::ResourcePath => "resource path",
            Level::ResourceId => "resource ID",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constituent tokens of a KRN, as handed to [`Krn::new`]
///
/// A wildcard level is expressed by setting its token to `"*"` and leaving
/// every later level empty. A non-empty pool starts with `""` (the root pool)
/// or `"*"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KrnParts {
    pub prefix_token: String,
    pub service: String,
    pub tenant_id: String,
    pub pool: Vec<String>,
    pub resource_type: String,
    pub resource_path: Vec<String>,
    pub resource_id: String,
}

impl KrnParts {
    /// Parts with the standard `krn` prefix, a service and a tenant ID
    pub fn new(service: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            prefix_token: KRN_PREFIX.to_string(),
            service: service.into(),
            tenant_id: tenant_id.into(),
            ..Default::default()
        }
    }

    pub fn with_pool<I, S>(mut self, subtokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pool = subtokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = resource_type.into();
        self.resource_id = resource_id.into();
        self
    }

    pub fn with_resource_path<I, S>(mut self, subtokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_path = subtokens.into_iter().map(Into::into).collect();
        self
    }

    /// Fail unless every level after `level` is empty
    fn ensure_empty_after(&self, level: Level) -> Result<(), KrnError> {
        let trailing = [
            (Level::TenantId, self.tenant_id.is_empty()),
            (Level::Pool, self.pool.is_empty()),
            (Level::ResourceType, self.resource_type.is_empty()),
            (Level::ResourcePath, self.resource_path.is_empty()),
            (Level::ResourceId, self.resource_id.is_empty()),
        ];

        match trailing.iter().find(|(l, empty)| *l > level && !empty) {
            Some((l, _)) => Err(KrnError::wildcard(format!("{l} is not empty"))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Kind {
    /// `*`
    Blanket,
    /// Every level down to the resource ID is set
    Concrete(KrnParts),
    /// Levels before `level` are set, `level` is the wildcard, the rest is empty
    Wildcard { level: Level, parts: KrnParts },
}

/// Kaa Resource Name: a concrete or wildcard resource/principal identifier
///
/// Instances are immutable and always valid. The canonical text is rendered
/// once on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Krn {
    kind: Kind,
    text: String,
}

impl Krn {
    /// Construct a KRN from its constituent tokens, validating every level
    pub fn new(parts: KrnParts) -> Result<Self, KrnError> {
        validate(parts).map(Self::from_kind)
    }

    /// The blanket wildcard `*`
    pub fn blanket() -> Self {
        Self::from_kind(Kind::Blanket)
    }

    /// Parse a KRN from its canonical text
    pub fn parse(text: &str) -> Result<Self, KrnError> {
        if is_wildcard(text) {
            return Ok(Self::blanket());
        }

        let mut asterisks = text.match_indices(WILDCARD_CHAR).map(|(i, _)| i);
        let wildcard = match (asterisks.next(), asterisks.next()) {
            (None, _) => false,
            (Some(i), None) if i == text.len() - 1 => true,
            (Some(i), None) => {
                return Err(KrnError::wildcard(format!(
                    "misplaced asterisk at index {i}"
                )));
            }
            (Some(_), Some(_)) => return Err(KrnError::wildcard("only one asterisk allowed")),
        };

        let tokens: Vec<&str> = text.split(TOKEN_SEPARATOR).collect();

        if tokens[0].is_empty() {
            return Err(KrnError::malformed("empty prefix token"));
        }
        if tokens[tokens.len() - 1].is_empty() {
            return Err(KrnError::malformed("last token is empty"));
        }
        if tokens.len() < MAX_TOKENS && !wildcard {
            return Err(KrnError::malformed("too few tokens in a non-wildcard KRN"));
        }
        match tokens.len() {
            1 => return Err(KrnError::malformed("too few tokens")),
            n if n > MAX_TOKENS => return Err(KrnError::malformed("too many tokens")),
            _ => {}
        }

        let mut parts = KrnParts {
            prefix_token: tokens[0].to_string(),
            service: tokens[1].to_string(),
            ..Default::default()
        };

        if let Some(tenant_id) = tokens.get(2) {
            parts.tenant_id = tenant_id.to_string();
        }

        if let Some(pool) = tokens.get(3).filter(|pool| !pool.is_empty()) {
            parts.pool = pool.split(SUBTOKEN_SEPARATOR).map(String::from).collect();
        }

        if let Some(resource) = tokens.get(4) {
            let mut subtokens = resource.split(SUBTOKEN_SEPARATOR).map(String::from);
            parts.resource_type = subtokens.next().unwrap_or_default();

            let mut rest: Vec<String> = subtokens.collect();
            if let Some(resource_id) = rest.pop() {
                parts.resource_id = resource_id;
            }
            parts.resource_path = rest;
        }

        Self::new(parts)
    }

    /// Parse a batch of KRNs, failing on the first malformed one
    pub fn parse_all<I, S>(texts: I) -> Result<Vec<Self>, KrnError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts.into_iter().map(|t| Self::parse(t.as_ref())).collect()
    }

    fn from_kind(kind: Kind) -> Self {
        let text = render(&kind);
        Self { kind, text }
    }

    fn parts(&self) -> Option<&KrnParts> {
        match &self.kind {
            Kind::Blanket => None,
            Kind::Concrete(parts) | Kind::Wildcard { parts, .. } => Some(parts),
        }
    }

    /// Canonical text representation
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Standard base64 encoding of the canonical text
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.text.as_bytes())
    }

    pub fn prefix_token(&self) -> Option<&str> {
        self.parts().map(|p| p.prefix_token.as_str())
    }

    pub fn service(&self) -> Option<&str> {
        self.parts().map(|p| p.service.as_str())
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.parts()
            .map(|p| p.tenant_id.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Concrete pool subtokens, starting with the root `""` when present
    pub fn pool(&self) -> &[String] {
        self.parts().map(|p| p.pool.as_slice()).unwrap_or_default()
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.parts()
            .map(|p| p.resource_type.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn resource_path(&self) -> &[String] {
        self.parts()
            .map(|p| p.resource_path.as_slice())
            .unwrap_or_default()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.parts()
            .map(|p| p.resource_id.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Level holding the wildcard, `Service` for the blanket wildcard
    pub fn wildcard_level(&self) -> Option<Level> {
        match &self.kind {
            Kind::Blanket => Some(Level::Service),
            Kind::Concrete(_) => None,
            Kind::Wildcard { level, .. } => Some(*level),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        !matches!(self.kind, Kind::Concrete(_))
    }

    pub fn is_blanket(&self) -> bool {
        matches!(self.kind, Kind::Blanket)
    }

    /// Whether the KRN belongs to the given tenant
    pub fn is_tenant(&self, tenant_id: &str) -> bool {
        self.tenant_id() == Some(tenant_id)
    }

    /// Whether `self` falls within `pattern`
    ///
    /// A wildcard pattern matches every KRN sharing its text up to the
    /// asterisk; a concrete pattern only matches an identical KRN. The relation
    /// is directional: a concrete KRN never matches a wildcard receiver's text.
    pub fn matches(&self, pattern: &Krn) -> bool {
        if pattern.is_wildcard() {
            let prefix = pattern
                .text
                .strip_suffix(WILDCARD_CHAR)
                .unwrap_or(&pattern.text);
            self.text.starts_with(prefix)
        } else {
            self.text == pattern.text
        }
    }

    /// Every KRN pattern that matches this KRN, most specific first
    ///
    /// Concrete KRNs lead with their own text. The list always ends with `*`.
    pub fn ancestor_patterns(&self) -> Vec<String> {
        let prefix_len = self.prefix_token().map_or(0, str::len);
        ancestor_patterns(
            &self.text,
            !self.is_wildcard(),
            &[TOKEN_SEPARATOR, SUBTOKEN_SEPARATOR],
            prefix_len + 1,
        )
    }
}

fn invalid_token(level: Level) -> KrnError {
    KrnError::malformed(format!("invalid {level} token"))
}

/// Walk the hierarchy top-down, stopping at the first wildcard
fn validate(mut parts: KrnParts) -> Result<Kind, KrnError> {
    let valid = |token: &str| Charset::Krn.is_valid_token(token);

    if !valid(&parts.prefix_token) {
        return Err(KrnError::malformed("invalid prefix token"));
    }

    if is_wildcard(&parts.service) {
        parts.ensure_empty_after(Level::Service)?;
        return Ok(Kind::Blanket);
    }
    if !valid(&parts.service) {
        return Err(invalid_token(Level::Service));
    }

    if is_wildcard(&parts.tenant_id) {
        parts.ensure_empty_after(Level::TenantId)?;
        parts.tenant_id.clear();
        return Ok(Kind::Wildcard {
            level: Level::TenantId,
            parts,
        });
    }
    if !valid(&parts.tenant_id) {
        return Err(invalid_token(Level::TenantId));
    }

    let pool_wildcard = parts.pool.iter().position(|s| is_wildcard(s));
    let concrete_pool = &parts.pool[..pool_wildcard.unwrap_or(parts.pool.len())];
    for (i, subtoken) in concrete_pool.iter().enumerate() {
        if (i == 0 && !subtoken.is_empty()) || (i > 0 && !valid(subtoken)) {
            return Err(KrnError::malformed(format!("invalid pool token {i}")));
        }
    }
    if let Some(i) = pool_wildcard {
        if i + 1 < parts.pool.len() {
            return Err(KrnError::wildcard(format!(
                "{} is not empty after the wildcard",
                Level::Pool
            )));
        }
        parts.ensure_empty_after(Level::Pool)?;
        parts.pool.truncate(i);
        return Ok(Kind::Wildcard {
            level: Level::Pool,
            parts,
        });
    }
    if parts.pool.len() == 1 {
        // A lone root subtoken renders exactly like no pool at all
        parts.pool.clear();
    }

    if is_wildcard(&parts.resource_type) {
        parts.ensure_empty_after(Level::ResourceType)?;
        parts.resource_type.clear();
        return Ok(Kind::Wildcard {
            level: Level::ResourceType,
            parts,
        });
    }
    if !valid(&parts.resource_type) {
        return Err(invalid_token(Level::ResourceType));
    }

    for (i, subtoken) in parts.resource_path.iter().enumerate() {
        if is_wildcard(subtoken) {
            return Err(KrnError::wildcard(
                "wildcards not permitted in the resource path",
            ));
        }
        if !valid(subtoken) {
            return Err(KrnError::malformed(format!(
                "invalid resource path token {i}"
            )));
        }
    }

    if is_wildcard(&parts.resource_id) {
        parts.resource_id.clear();
        return Ok(Kind::Wildcard {
            level: Level::ResourceId,
            parts,
        });
    }
    if !valid(&parts.resource_id) {
        return Err(invalid_token(Level::ResourceId));
    }

    Ok(Kind::Concrete(parts))
}

/// Render the canonical text, stopping right after the wildcard
fn render(kind: &Kind) -> String {
    let (parts, wildcard) = match kind {
        Kind::Blanket => return WILDCARD.to_string(),
        Kind::Concrete(parts) => (parts, None),
        Kind::Wildcard { level, parts } => (parts, Some(*level)),
    };

    let mut out = String::with_capacity(64);
    out.push_str(&parts.prefix_token);
    out.push(TOKEN_SEPARATOR);
    out.push_str(&parts.service);
    out.push(TOKEN_SEPARATOR);

    if wildcard == Some(Level::TenantId) {
        out.push_str(WILDCARD);
        return out;
    }
    out.push_str(&parts.tenant_id);
    out.push(TOKEN_SEPARATOR);

    out.push_str(&parts.pool.join("/"));
    if wildcard == Some(Level::Pool) {
        if !parts.pool.is_empty() {
            out.push(SUBTOKEN_SEPARATOR);
        }
        out.push_str(WILDCARD);
        return out;
    }
    out.push(TOKEN_SEPARATOR);

    if wildcard == Some(Level::ResourceType) {
        out.push_str(WILDCARD);
        return out;
    }
    out.push_str(&parts.resource_type);

    for subtoken in &parts.resource_path {
        out.push(SUBTOKEN_SEPARATOR);
        out.push_str(subtoken);
    }

    out.push(SUBTOKEN_SEPARATOR);
    match wildcard {
        Some(_) => out.push_str(WILDCARD),
        None => out.push_str(&parts.resource_id),
    }
    out
}

impl fmt::Display for Krn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Krn {
    type Err = KrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Krn {
    type Error = KrnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Krn {
    type Error = KrnError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Krn> for String {
    fn from(krn: Krn) -> Self {
        krn.text
    }
}

impl AsRef<str> for Krn {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

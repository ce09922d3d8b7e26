//! Hierarchical identifiers
//!
//! Two families share one shape: a fixed-order hierarchy of typed segments,
//! optionally ended by a wildcard.
//!
//! - [`Krn`] names resources and principals:
//!   `krn:<service>:<tenant ID>:[<pool>]:<resource type>[/<path>]/<resource ID>`
//! - [`Action`] names operations: `<service>:<resource type>[:<target>]:<operation>`
//!
//! Both parse from and render to a canonical text, match against wildcard
//! patterns, and list the ancestor patterns that a stored policy statement
//! could use to cover them:
//!
//! ```
//! use iam_krn::identifier::Action;
//!
//! let action = Action::parse("iam:user:read").unwrap();
//! assert_eq!(
//!     action.ancestor_patterns(),
//!     ["iam:user:read", "iam:user:*", "iam:*", "*"]
//! );
//! ```

pub mod action;
mod ancestors;
pub mod krn;
pub mod token;

pub use action::Action;
pub use krn::{KRN_PREFIX, Krn, KrnParts, Level};
pub use token::{Charset, WILDCARD, is_wildcard};

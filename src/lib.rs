//! IAM resource names and actions
//!
//! Hierarchical, wildcard-capable identifiers for deciding which stored policy
//! statements could apply to a request.
//!
//! ## Features
//!
//! - **KRNs** (`krn:<service>:<tenant>:[<pool>]:<type>[/<path>]/<id>`) naming
//!   resources and principals
//! - **Actions** (`<service>:<type>[:<target>]:<operation>`) naming operations
//! - **Wildcards** terminating either hierarchy at any level, plus the blanket `*`
//! - **Ancestor patterns**: every pattern a statement could use to cover an
//!   identifier, ready to intersect with a statement store
//!
//! ## Matching Model
//!
//! ```text
//! request identifiers → ancestor patterns → store intersection → matching statements
//! ```
//!
//! ```
//! use iam_krn::identifier::{Action, Krn};
//! use iam_krn::store::EvaluationRequest;
//!
//! let action = Action::parse("iam:endpoint:read").unwrap();
//! let resource = Krn::parse("krn:iam:kaa::endpoint/42").unwrap();
//! let principal = Krn::parse("krn:iam:kaa::user/7").unwrap();
//!
//! assert!(resource.matches(&Krn::parse("krn:iam:kaa::endpoint/*").unwrap()));
//!
//! let request = EvaluationRequest::for_identifiers(&action, &resource, &principal);
//! assert_eq!(request.resources.last().map(String::as_str), Some("*"));
//! ```

pub mod config;
pub mod error;
pub mod identifier;
pub mod store;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{ActionError, AppError, KrnError, Result};
pub use identifier::{Action, Krn, KrnParts};
pub use store::{EvaluationRequest, MemoryStore, Statement, StatementStore};

pub mod model;
pub mod repo;
pub mod validate;

pub use model::*;
pub use repo::*;
pub use validate::{validate_full, validate_partial, Issue, IssueCode, PathSegment, ValidationError};

//! # Blog Core
//!
//! The domain layer of the blog backend.
//! Entities, write-payload validation and the repository ports live here;
//! this crate has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod validation;

pub use error::{DomainError, RepoError};
pub use validation::{FieldErrors, WriteMode};

//! # Blog Shared
//!
//! Wire types shared between the backend and its front-ends.
//! Nothing in here depends on the server; the crate also builds for WASM.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;

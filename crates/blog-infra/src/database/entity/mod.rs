//! SeaORM entities, one module per table.

pub mod comment;
pub mod item;
pub mod like;
pub mod post;

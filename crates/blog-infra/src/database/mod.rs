//! Persistence: SQL repositories, connection management and the in-memory store.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod sql_base;
#[cfg(feature = "postgres")]
pub mod sql_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use sea_orm::DbConn;
#[cfg(feature = "postgres")]
pub use sql_base::SqlBaseRepository;
#[cfg(feature = "postgres")]
pub use sql_repo::{SqlCommentRepository, SqlItemRepository, SqlLikeRepository, SqlPostRepository};

//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{CommentRepository, ItemRepository, LikeRepository, PostRepository};
use blog_infra::InMemoryStore;

#[cfg(feature = "postgres")]
use blog_infra::{
    DbConn, SqlCommentRepository, SqlItemRepository, SqlLikeRepository, SqlPostRepository,
    connect,
};

use crate::admin::{AdminSite, build_admin_site};
use crate::config::{AppConfig, HostConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<dyn ItemRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub admin: Arc<AdminSite>,
    /// First label of the site domain.
    pub site_name: String,
    pub site_domain: String,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Falls back to the in-memory store when no database is configured or
    /// the connection fails.
    pub async fn new(config: &AppConfig) -> Self {
        let state = match &config.database {
            #[cfg(feature = "postgres")]
            Some(db_config) => match connect(db_config).await {
                Ok(conn) => Some(Self::sql(conn, &config.hosts)),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    None
                }
            },
            #[cfg(not(feature = "postgres"))]
            Some(_) => {
                tracing::info!("Running without postgres feature - using in-memory store");
                None
            }
            None => {
                tracing::warn!("No database configured. Running with the in-memory store.");
                None
            }
        };

        let state = state.unwrap_or_else(|| Self::in_memory(&config.hosts));
        tracing::info!("Application state initialized");
        state
    }

    /// State backed by SeaORM repositories sharing one pool.
    #[cfg(feature = "postgres")]
    fn sql(conn: DbConn, hosts: &HostConfig) -> Self {
        Self::from_parts(
            Arc::new(SqlItemRepository::new(conn.clone())),
            Arc::new(SqlPostRepository::new(conn.clone())),
            Arc::new(SqlCommentRepository::new(conn.clone())),
            Arc::new(SqlLikeRepository::new(conn)),
            hosts,
        )
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(hosts: &HostConfig) -> Self {
        let store = InMemoryStore::new();
        Self::from_parts(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            hosts,
        )
    }

    fn from_parts(
        items: Arc<dyn ItemRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn LikeRepository>,
        hosts: &HostConfig,
    ) -> Self {
        let site_name = hosts.site_name().to_string();
        Self {
            items,
            posts,
            comments,
            likes,
            admin: Arc::new(build_admin_site(&site_name)),
            site_name,
            site_domain: hosts.domain.clone(),
        }
    }
}

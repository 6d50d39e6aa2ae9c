//! HTTP handlers and route configuration.

mod comments;
mod health;
mod items;
mod likes;
mod posts;
mod www;

#[cfg(test)]
mod tests;

use actix_web::web;
use blog_core::error::{DomainError, RepoError};

use crate::admin;
use crate::middleware::error::{AppError, AppResult};
use crate::routing::{ResourceRouter, Site, SiteGuard, method_not_allowed, resources};
use crate::state::AppState;

use comments::CommentHandler;
use items::ItemHandler;
use likes::LikeHandler;
use posts::PostHandler;

/// Resource handlers served under `/api`.
pub fn api_router() -> ResourceRouter {
    ResourceRouter::new()
        .register::<ItemHandler>()
        .register::<PostHandler>()
        .register::<CommentHandler>()
        .register::<LikeHandler>()
}

/// Configure all application routes.
///
/// Paths are registered with a trailing slash; requests are normalized to
/// that form before routing.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let router = api_router();

    // Api host
    cfg.service(
        web::scope("/api")
            .guard(SiteGuard(Site::Api))
            .service(
                web::resource("/health/")
                    .route(web::get().to(health::health_check))
                    .default_service(web::to(method_not_allowed)),
            )
            .configure(|cfg| router.configure(cfg)),
    );
    for resource in resources::<ItemHandler>("") {
        cfg.service(resource.guard(SiteGuard(Site::Api)));
    }

    // Admin host
    cfg.service(
        web::scope("/admin")
            .guard(SiteGuard(Site::Admin))
            .configure(admin::views::configure),
    );

    // Www host
    cfg.service(
        web::resource("/")
            .guard(SiteGuard(Site::Www))
            .route(web::get().to(www::landing))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/health/")
            .guard(SiteGuard(Site::Www))
            .route(web::get().to(health::health_check))
            .default_service(web::to(method_not_allowed)),
    );
}

/// Maps a missing row to a 404 naming the entity.
fn or_not_found(entity: &'static str, id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound => DomainError::not_found(entity, id).into(),
        other => other.into(),
    }
}

/// Whether the post a payload refers to exists.
async fn post_exists(state: &AppState, post_id: Option<i64>) -> AppResult<bool> {
    match post_id {
        Some(id) => Ok(state.posts.find_by_id(id).await?.is_some()),
        None => Ok(false),
    }
}

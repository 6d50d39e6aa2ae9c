//! Application assembly shared by the server and the HTTP tests.

use actix_web::{
    App, Error, HttpRequest, HttpResponse,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{NormalizePath, TrailingSlash},
    web,
};
use tracing_actix_web::TracingLogger;

use crate::handlers;
use crate::middleware::error::{AppError, AppResult};
use crate::routing::{HostRouting, HostTable};
use crate::state::AppState;
use crate::telemetry::SiteRootSpan;

/// Build the application: routes, extractor configuration and middleware.
pub fn build_app(
    state: AppState,
    hosts: HostTable,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(path_config())
        .configure(handlers::configure_routes)
        .default_service(web::to(not_found))
        .wrap(NormalizePath::new(TrailingSlash::Always))
        .wrap(HostRouting::new(hosts))
        .wrap(TracingLogger::<SiteRootSpan>::new())
}

/// Malformed JSON bodies become RFC 7807 400 responses.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("JSON parse error - {err}")).into()
    })
}

/// Non-numeric ids never match a record.
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::NotFound("Not found.".into()).into())
}

async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!(
        "The requested resource was not found on this server: {}",
        req.path()
    )))
}

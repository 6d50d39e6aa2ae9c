//! Resource routing.
//!
//! A [`ResourceHandler`] declares which of the six CRUD operations it
//! supports; [`ResourceRouter`] derives the collection and detail routes from
//! that capability set and serves the API root listing every collection.

use actix_web::{HttpRequest, HttpResponse, Resource, web};
use async_trait::async_trait;
use blog_core::WriteMode;
use serde::Serialize;
use serde_json::Value;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Operations a resource handler supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub list: bool,
    pub create: bool,
    pub retrieve: bool,
    pub update: bool,
    pub partial_update: bool,
    pub destroy: bool,
}

impl Capabilities {
    pub const FULL: Capabilities = Capabilities {
        list: true,
        create: true,
        retrieve: true,
        update: true,
        partial_update: true,
        destroy: true,
    };

    pub const LIST_CREATE: Capabilities = Capabilities {
        list: true,
        create: true,
        retrieve: false,
        update: false,
        partial_update: false,
        destroy: false,
    };

    fn has_collection(&self) -> bool {
        self.list || self.create
    }

    fn has_detail(&self) -> bool {
        self.retrieve || self.update || self.partial_update || self.destroy
    }
}

fn not_allowed<T>(method: &str) -> AppResult<T> {
    Err(AppError::MethodNotAllowed(method.to_string()))
}

/// CRUD operations for one entity type.
///
/// Every operation defaults to 405; handlers override the ones listed in
/// their capability set.
#[async_trait]
pub trait ResourceHandler: Default + Send + Sync + 'static {
    /// Path segment of the collection (`/api/<basename>/`).
    const BASENAME: &'static str;
    const CAPABILITIES: Capabilities;

    /// Serialized representation of one record.
    type Record: Serialize + Send;

    async fn list(&self, _state: &AppState) -> AppResult<Vec<Self::Record>> {
        not_allowed("GET")
    }

    async fn create(&self, _state: &AppState, _payload: Value) -> AppResult<Self::Record> {
        not_allowed("POST")
    }

    async fn retrieve(&self, _state: &AppState, _id: i64) -> AppResult<Self::Record> {
        not_allowed("GET")
    }

    /// Full (`Replace`) or partial update.
    async fn update(
        &self,
        _state: &AppState,
        _id: i64,
        _payload: Value,
        mode: WriteMode,
    ) -> AppResult<Self::Record> {
        not_allowed(if mode == WriteMode::Partial { "PATCH" } else { "PUT" })
    }

    async fn destroy(&self, _state: &AppState, _id: i64) -> AppResult<()> {
        not_allowed("DELETE")
    }
}

async fn list<H: ResourceHandler>(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let records = H::default().list(&state).await?;
    Ok(HttpResponse::Ok().json(records))
}

async fn create<H: ResourceHandler>(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let record = H::default().create(&state, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

async fn retrieve<H: ResourceHandler>(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let record = H::default().retrieve(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

async fn update<H: ResourceHandler>(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let record = H::default()
        .update(&state, path.into_inner(), body.into_inner(), WriteMode::Replace)
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

async fn partial_update<H: ResourceHandler>(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let record = H::default()
        .update(&state, path.into_inner(), body.into_inner(), WriteMode::Partial)
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

async fn destroy<H: ResourceHandler>(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    H::default().destroy(&state, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fallback for methods a resource does not route.
pub async fn method_not_allowed(req: HttpRequest) -> AppResult<HttpResponse> {
    not_allowed(req.method().as_str())
}

/// Collection and detail resources for `H`, mounted under `prefix`.
pub fn resources<H: ResourceHandler>(prefix: &str) -> Vec<Resource> {
    let caps = H::CAPABILITIES;
    let mut resources = Vec::new();

    if caps.has_collection() {
        let mut collection = web::resource(format!("{prefix}/{}/", H::BASENAME))
            .default_service(web::to(method_not_allowed));
        if caps.list {
            collection = collection.route(web::get().to(list::<H>));
        }
        if caps.create {
            collection = collection.route(web::post().to(create::<H>));
        }
        resources.push(collection);
    }

    if caps.has_detail() {
        let mut detail = web::resource(format!("{prefix}/{}/{{id}}/", H::BASENAME))
            .default_service(web::to(method_not_allowed));
        if caps.retrieve {
            detail = detail.route(web::get().to(retrieve::<H>));
        }
        if caps.update {
            detail = detail.route(web::put().to(update::<H>));
        }
        if caps.partial_update {
            detail = detail.route(web::patch().to(partial_update::<H>));
        }
        if caps.destroy {
            detail = detail.route(web::delete().to(destroy::<H>));
        }
        resources.push(detail);
    }

    resources
}

struct Registration {
    basename: &'static str,
    resources: fn(&str) -> Vec<Resource>,
}

/// Registry of resource handlers for one URL namespace.
#[derive(Default)]
pub struct ResourceRouter {
    registrations: Vec<Registration>,
}

/// Collection basenames served by the API root view.
#[derive(Debug, Clone)]
struct Basenames(Vec<&'static str>);

impl ResourceRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: ResourceHandler>(mut self) -> Self {
        self.registrations.push(Registration {
            basename: H::BASENAME,
            resources: resources::<H>,
        });
        self
    }

    pub fn basenames(&self) -> Vec<&'static str> {
        self.registrations.iter().map(|r| r.basename).collect()
    }

    /// Mount the root view and every registered handler.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::resource("/")
                .app_data(web::Data::new(Basenames(self.basenames())))
                .route(web::get().to(api_root))
                .default_service(web::to(method_not_allowed)),
        );

        for registration in &self.registrations {
            for resource in (registration.resources)("") {
                cfg.service(resource);
            }
        }
    }
}

/// GET /api/ - collection URLs keyed by basename.
async fn api_root(req: HttpRequest, basenames: web::Data<Basenames>) -> HttpResponse {
    let info = req.connection_info();
    let root = req.path().trim_end_matches('/');
    let body: blog_shared::dto::ApiRootResponse = basenames
        .0
        .iter()
        .map(|name| {
            let url = format!("{}://{}{}/{}/", info.scheme(), info.host(), root, name);
            (name.to_string(), url)
        })
        .collect();

    HttpResponse::Ok().json(body)
}

//! Admin endpoints (JSON), mounted under `/admin` on the admin host.

use actix_web::{HttpResponse, web};
use blog_core::domain::ModelMeta;
use blog_shared::dto::{AdminChangeListResponse, AdminIndexResponse, AdminModelEntry};
use serde::Serialize;
use serde_json::{Map, Value};

use super::site::ModelAdmin;
use crate::middleware::error::{AppError, AppResult};
use crate::routing::method_not_allowed;
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(index))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/{model}/")
            .route(web::get().to(changelist))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/{model}/{id}/")
            .route(web::get().to(detail))
            .route(web::delete().to(delete))
            .default_service(web::to(method_not_allowed)),
    );
}

/// GET /admin/
async fn index(state: web::Data<AppState>) -> HttpResponse {
    let models = state
        .admin
        .models()
        .map(|admin| AdminModelEntry {
            model: admin.model.name.to_string(),
            verbose_name: admin.model.verbose_name.to_string(),
            verbose_name_plural: admin.model.verbose_name_plural.to_string(),
            list_display: admin.list_display.iter().map(|c| c.to_string()).collect(),
            url: format!("/admin/{}/", admin.model.name),
        })
        .collect();

    HttpResponse::Ok().json(AdminIndexResponse {
        site_name: state.admin.site_name.clone(),
        models,
    })
}

/// GET /admin/{model}/
async fn changelist(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let admin = model_admin(&state, &path)?;
    let rows: Vec<Map<String, Value>> = all_records(&state, &admin.model)
        .await?
        .into_iter()
        .map(|record| project(record, &admin.list_display))
        .collect();

    tracing::debug!(model = admin.model.name, count = rows.len(), "Admin changelist");

    Ok(HttpResponse::Ok().json(AdminChangeListResponse {
        model: admin.model.name.to_string(),
        columns: admin.list_display.iter().map(|c| c.to_string()).collect(),
        count: rows.len(),
        rows,
    }))
}

/// GET /admin/{model}/{id}/
async fn detail(
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
) -> AppResult<HttpResponse> {
    let (model, id) = path.into_inner();
    let admin = model_admin(&state, &model)?;
    let record = find_record(&state, &admin.model, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} with id {} does not exist.", model, id)))?;

    Ok(HttpResponse::Ok().json(record))
}

/// DELETE /admin/{model}/{id}/
async fn delete(
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
) -> AppResult<HttpResponse> {
    let (model, id) = path.into_inner();
    let admin = model_admin(&state, &model)?;

    let deleted = match admin.model.name {
        "item" => state.items.delete(id).await,
        "post" => state.posts.delete(id).await,
        "comment" => state.comments.delete(id).await,
        "like" => state.likes.delete(id).await,
        _ => return Err(unknown_model(&model)),
    };
    deleted?;

    tracing::info!(model = admin.model.name, id, "Deleted via admin");
    Ok(HttpResponse::NoContent().finish())
}

fn unknown_model(model: &str) -> AppError {
    AppError::NotFound(format!("Unknown model: {model}"))
}

fn model_admin<'a>(state: &'a AppState, model: &str) -> AppResult<&'a ModelAdmin> {
    state.admin.get(model).ok_or_else(|| unknown_model(model))
}

fn to_value<T: Serialize>(record: T) -> AppResult<Value> {
    serde_json::to_value(record).map_err(|e| AppError::Internal(e.to_string()))
}

fn to_values<T: Serialize>(records: Vec<T>) -> AppResult<Vec<Value>> {
    records.into_iter().map(to_value).collect()
}

async fn all_records(state: &AppState, model: &ModelMeta) -> AppResult<Vec<Value>> {
    match model.name {
        "item" => to_values(state.items.list().await?),
        "post" => to_values(state.posts.list().await?),
        "comment" => to_values(state.comments.list().await?),
        "like" => to_values(state.likes.list().await?),
        other => Err(unknown_model(other)),
    }
}

async fn find_record(state: &AppState, model: &ModelMeta, id: i64) -> AppResult<Option<Value>> {
    let record = match model.name {
        "item" => state.items.find_by_id(id).await?.map(to_value),
        "post" => state.posts.find_by_id(id).await?.map(to_value),
        "comment" => state.comments.find_by_id(id).await?.map(to_value),
        "like" => state.likes.find_by_id(id).await?.map(to_value),
        other => return Err(unknown_model(other)),
    };
    record.transpose()
}

/// Keeps exactly the given columns of a serialized record.
fn project(record: Value, columns: &[&'static str]) -> Map<String, Value> {
    let Value::Object(mut fields) = record else {
        return Map::new();
    };
    columns
        .iter()
        .map(|column| {
            let value = fields.remove(*column).unwrap_or(Value::Null);
            (column.to_string(), value)
        })
        .collect()
}

//! Catalog page endpoints
//!
//! One set of generic handlers serves every [`Resource`]; `resource_routes`
//! mounts them under the resource's path segments.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use axum_extra::extract::{Form, FormRejection};

use crate::{
    error::AppResult,
    services::Resource,
    views::{Page, View},
    AppState,
};

/// Home page with catalog counts
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Home page view", body = View),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn index(State(state): State<AppState>) -> AppResult<View> {
    state.services.catalog.index().await
}

pub async fn list<R: Resource>(State(state): State<AppState>) -> AppResult<View> {
    state.services.catalog.list::<R>().await
}

pub async fn detail<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<View> {
    state.services.catalog.detail::<R>(&id).await
}

pub async fn create_form<R: Resource>(State(state): State<AppState>) -> AppResult<View> {
    state.services.catalog.create_form::<R>().await
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    form: Result<Form<R::Form>, FormRejection>,
) -> AppResult<Page> {
    let Form(form) = form?;
    state.services.catalog.create::<R>(form).await
}

pub async fn update_form<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<View> {
    state.services.catalog.update_form::<R>(&id).await
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<R::Form>, FormRejection>,
) -> AppResult<Page> {
    let Form(form) = form?;
    state.services.catalog.update::<R>(&id, form).await
}

pub async fn delete_form<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    state.services.catalog.delete_form::<R>(&id).await
}

/// The form body is ignored; the record to delete is named by the path
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    state.services.catalog.delete::<R>(&id).await
}

/// List, detail, create, update and delete routes of one resource
pub fn resource_routes<R: Resource>() -> Router<AppState> {
    let record = |suffix: &str| format!("/{}{}", R::SEGMENT, suffix);

    Router::new()
        .route(&format!("/{}", R::PLURAL), get(list::<R>))
        .route(
            &record("/create"),
            get(create_form::<R>).post(create::<R>),
        )
        .route(&record("/:id"), get(detail::<R>))
        .route(
            &record("/:id/update"),
            get(update_form::<R>).post(update::<R>),
        )
        .route(
            &record("/:id/delete"),
            get(delete_form::<R>).post(delete::<R>),
        )
}

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::project::{MessageResponse, NewProject, ProjectFilter, ProjectListResponse, ProjectUpdate},
    errors::AppError,
    use_cases::extractors::AdminClaims,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<usize>,
}

#[instrument(skip(state))]
pub async fn list_projects(
    state: web::Data<AppState>,
    filter: web::Query<ProjectFilter>,
) -> Result<impl Responder, AppError> {
    let projects = state.project_handler.list_projects(&filter).await?;
    Ok(HttpResponse::Ok().json(ProjectListResponse::new(projects)))
}

#[instrument(skip(state))]
pub async fn featured_projects(
    state: web::Data<AppState>,
    query: web::Query<FeaturedQuery>,
) -> Result<impl Responder, AppError> {
    let projects = state.project_handler.featured_projects(query.limit).await?;
    Ok(HttpResponse::Ok().json(ProjectListResponse::new(projects)))
}

#[instrument(skip(state))]
pub async fn get_project(
    project_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.get_project(project_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_project(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<NewProject>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.create_project(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(project))
}

#[instrument(skip(_claims, state, data))]
pub async fn update_project(
    _claims: AdminClaims,
    project_id: web::Path<i64>,
    state: web::Data<AppState>,
    data: web::Json<ProjectUpdate>,
) -> Result<impl Responder, AppError> {
    state
        .project_handler
        .update_project(project_id.into_inner(), data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Project updated successfully")))
}

#[instrument(skip(_claims, state))]
pub async fn delete_project(
    _claims: AdminClaims,
    project_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete_project(project_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Project deleted successfully")))
}

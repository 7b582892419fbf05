use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::entities::project::{
    featured_first, NewProject, ProjectDetailResponse, ProjectFilter, ProjectRecord, ProjectUpdate,
};
use crate::errors::AppError;
use crate::repositories::project::ProjectRepository;

const DEFAULT_FEATURED_LIMIT: usize = 3;
const MAX_FEATURED_LIMIT: usize = 50;

pub struct ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub project_repo: R,
}

impl<R> ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub fn new(project_repo: R) -> Self {
        ProjectHandler { project_repo }
    }

    /// Lists projects in catalog order, narrowed by `filter`
    pub async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectRecord>, AppError> {
        let projects = self.project_repo.list_projects().await?;
        Ok(filter.apply(projects))
    }

    /// Featured projects first, padded with the rest of the catalog
    pub async fn featured_projects(&self, limit: Option<usize>) -> Result<Vec<ProjectRecord>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, MAX_FEATURED_LIMIT);
        let projects = self.project_repo.list_projects().await?;
        Ok(featured_first(&projects, limit))
    }

    pub async fn get_project(&self, id: i64) -> Result<ProjectDetailResponse, AppError> {
        self.find(id).await.map(ProjectDetailResponse::from)
    }

    pub async fn create_project(&self, request: NewProject) -> Result<ProjectRecord, AppError> {
        request.validate()?;

        let insert = request.prepare_for_insert(Utc::now());
        let project = self.project_repo.create_project(&insert).await?;

        info!(project_id = project.id, "Project created");
        Ok(project)
    }

    /// Applies a partial update; `id` and `created_at` are never touched
    pub async fn update_project(&self, id: i64, request: ProjectUpdate) -> Result<ProjectRecord, AppError> {
        request.validate()?;

        let mut project = self.find(id).await?;
        request.apply_to(&mut project, Utc::now());
        self.project_repo.update_project(&project).await?;

        info!(project_id = id, "Project updated");
        Ok(project)
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        if !self.project_repo.delete_project(id).await? {
            return Err(AppError::NotFound("Project not found".into()));
        }

        info!(project_id = id, "Project deleted");
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<ProjectRecord, AppError> {
        self.project_repo
            .get_project_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }
}

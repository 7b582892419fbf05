use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::project::{ProjectInsert, ProjectRecord},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = "id, name, short_description, long_description, readme_content, \
    technologies, github_url, live_url, video_url, thumbnail_url, category, is_featured, \
    created_at, updated_at";

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create_project(&self, project: &ProjectInsert) -> Result<ProjectRecord, AppError>;
    async fn get_project_by_id(&self, id: i64) -> Result<Option<ProjectRecord>, AppError>;
    /// All projects in insertion order.
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError>;
    /// Writes every column except `id` and `created_at`.
    async fn update_project(&self, project: &ProjectRecord) -> Result<(), AppError>;
    /// Returns whether a row was removed.
    async fn delete_project(&self, id: i64) -> Result<bool, AppError>;
    async fn check_connection(&self) -> Result<(), AppError>;
}

#[async_trait]
impl<T: ProjectRepository + ?Sized> ProjectRepository for Arc<T> {
    async fn create_project(&self, project: &ProjectInsert) -> Result<ProjectRecord, AppError> {
        (**self).create_project(project).await
    }

    async fn get_project_by_id(&self, id: i64) -> Result<Option<ProjectRecord>, AppError> {
        (**self).get_project_by_id(id).await
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
        (**self).list_projects().await
    }

    async fn update_project(&self, project: &ProjectRecord) -> Result<(), AppError> {
        (**self).update_project(project).await
    }

    async fn delete_project(&self, id: i64) -> Result<bool, AppError> {
        (**self).delete_project(id).await
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn create_project(&self, project: &ProjectInsert) -> Result<ProjectRecord, AppError> {
        let query = format!(
            r#"
            INSERT INTO projects (
                name, short_description, long_description, readme_content, technologies,
                github_url, live_url, video_url, thumbnail_url, category, is_featured,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, ProjectRecord>(&query)
            .bind(&project.name)
            .bind(&project.short_description)
            .bind(&project.long_description)
            .bind(&project.readme_content)
            .bind(&project.technologies)
            .bind(&project.github_url)
            .bind(&project.live_url)
            .bind(&project.video_url)
            .bind(&project.thumbnail_url)
            .bind(&project.category)
            .bind(project.is_featured)
            .bind(project.created_at)
            .bind(project.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn get_project_by_id(&self, id: i64) -> Result<Option<ProjectRecord>, AppError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        let project = sqlx::query_as::<_, ProjectRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at ASC, id ASC");

        let projects = sqlx::query_as::<_, ProjectRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn update_project(&self, project: &ProjectRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                name = $1,
                short_description = $2,
                long_description = $3,
                readme_content = $4,
                technologies = $5,
                github_url = $6,
                live_url = $7,
                video_url = $8,
                thumbnail_url = $9,
                category = $10,
                is_featured = $11,
                updated_at = $12
            WHERE id = $13
            "#
        )
        .bind(&project.name)
        .bind(&project.short_description)
        .bind(&project.long_description)
        .bind(&project.readme_content)
        .bind(&project.technologies)
        .bind(&project.github_url)
        .bind(&project.live_url)
        .bind(&project.video_url)
        .bind(&project.thumbnail_url)
        .bind(&project.category)
        .bind(project.is_featured)
        .bind(project.updated_at)
        .bind(project.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".into()));
        }

        Ok(())
    }

    async fn delete_project(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

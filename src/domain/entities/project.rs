use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    entities::option_fields::{validate_patch_url, validate_url, PatchString},
    utils::markdown::safe_markdown_to_html,
};

// ───── Constants ──────────────────────────────────────────────────────
const MAX_NAME_LENGTH: u64 = 100;
const MAX_SHORT_DESCRIPTION_LENGTH: u64 = 300;
const MAX_LONG_DESCRIPTION_LENGTH: u64 = 5000;
const MAX_TECHNOLOGIES: usize = 30;
const MAX_TECHNOLOGY_LENGTH: usize = 50;

// ───── Records ───────────────────────────────────────────────────────

/// One portfolio project entry, as stored locally, served by the
/// remote catalog and persisted in the `projects` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub readme_content: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub github_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub live_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub video_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row values for an insert; the id is assigned by the database.
#[derive(Debug, Clone)]
pub struct ProjectInsert {
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub readme_content: String,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectInsert {
    pub fn into_record(self, id: i64) -> ProjectRecord {
        ProjectRecord {
            id,
            name: self.name,
            short_description: self.short_description,
            long_description: self.long_description,
            readme_content: self.readme_content,
            technologies: self.technologies,
            github_url: self.github_url,
            live_url: self.live_url,
            video_url: self.video_url,
            thumbnail_url: self.thumbnail_url,
            category: self.category,
            is_featured: self.is_featured,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ───── Input & Validation ───────────────────────────────────────────

/// Create payload. Carries no id: the catalog assigns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewProject {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "Project name must be 1-100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = MAX_SHORT_DESCRIPTION_LENGTH, message = "Short description must be less than 300 characters"))]
    pub short_description: String,

    #[serde(default)]
    #[validate(length(max = MAX_LONG_DESCRIPTION_LENGTH, message = "Long description must be less than 5000 characters"))]
    pub long_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_content: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_technologies"))]
    pub technologies: Vec<String>,

    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_url"))]
    pub github_url: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_url"))]
    pub live_url: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_url"))]
    pub video_url: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_url"))]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub is_featured: bool,
}

impl NewProject {
    pub fn has_blank_name(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// The provided readme, or one synthesized from name and long description.
    pub fn readme_or_default(&self) -> String {
        match self.readme_content.as_deref() {
            Some(readme) if !readme.trim().is_empty() => readme.to_string(),
            _ => default_readme(&self.name, &self.long_description),
        }
    }

    pub fn prepare_for_insert(&self, now: DateTime<Utc>) -> ProjectInsert {
        ProjectInsert {
            name: self.name.trim().to_string(),
            short_description: self.short_description.clone(),
            long_description: self.long_description.clone(),
            readme_content: self.readme_or_default(),
            technologies: clean_technologies(&self.technologies),
            github_url: self.github_url.clone(),
            live_url: self.live_url.clone(),
            video_url: self.video_url.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            category: self.category.trim().to_string(),
            is_featured: self.is_featured,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_record(self, id: i64, now: DateTime<Utc>) -> ProjectRecord {
        self.prepare_for_insert(now).into_record(id)
    }
}

/// Partial update. Absent fields are left untouched; `id` and
/// `created_at` are never part of an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "Project name must be 1-100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = MAX_SHORT_DESCRIPTION_LENGTH, message = "Short description must be less than 300 characters"))]
    pub short_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = MAX_LONG_DESCRIPTION_LENGTH, message = "Long description must be less than 5000 characters"))]
    pub long_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_technologies"))]
    pub technologies: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "PatchString::is_unchanged")]
    #[validate(custom(function = "validate_patch_url"))]
    pub github_url: PatchString,

    #[serde(default, skip_serializing_if = "PatchString::is_unchanged")]
    #[validate(custom(function = "validate_patch_url"))]
    pub live_url: PatchString,

    #[serde(default, skip_serializing_if = "PatchString::is_unchanged")]
    #[validate(custom(function = "validate_patch_url"))]
    pub video_url: PatchString,

    #[serde(default, skip_serializing_if = "PatchString::is_unchanged")]
    #[validate(custom(function = "validate_patch_url"))]
    pub thumbnail_url: PatchString,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProjectUpdate::default()
    }

    /// Merges the provided fields into `record`.
    ///
    /// `updated_at` never moves backwards, so it stays `>= created_at`
    /// even when the local clock is behind the record's origin.
    pub fn apply_to(&self, record: &mut ProjectRecord, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            record.name = name.trim().to_string();
        }
        if let Some(short) = &self.short_description {
            record.short_description = short.clone();
        }
        if let Some(long) = &self.long_description {
            record.long_description = long.clone();
        }
        if let Some(technologies) = &self.technologies {
            record.technologies = clean_technologies(technologies);
        }
        if let Some(readme) = &self.readme_content {
            record.readme_content = if readme.trim().is_empty() {
                default_readme(&record.name, &record.long_description)
            } else {
                readme.clone()
            };
        }
        self.github_url.apply_to(&mut record.github_url);
        self.live_url.apply_to(&mut record.live_url);
        self.video_url.apply_to(&mut record.video_url);
        self.thumbnail_url.apply_to(&mut record.thumbnail_url);
        if let Some(category) = &self.category {
            record.category = category.trim().to_string();
        }
        if let Some(featured) = self.is_featured {
            record.is_featured = featured;
        }

        record.updated_at = now.max(record.updated_at).max(record.created_at);
    }
}

/// Where an uploaded media URL is stored on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    Thumbnail,
    Video,
}

impl MediaSlot {
    pub fn as_update(self, url: String) -> ProjectUpdate {
        let value = PatchString::SetToValue(url);
        match self {
            MediaSlot::Thumbnail => ProjectUpdate { thumbnail_url: value, ..Default::default() },
            MediaSlot::Video => ProjectUpdate { video_url: value, ..Default::default() },
        }
    }
}

// ───── Filtering ────────────────────────────────────────────────────

/// Listing filters of the public projects page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFilter {
    pub category: Option<String>,
    pub technology: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &ProjectRecord) -> bool {
        if let Some(category) = non_blank(&self.category) {
            if !project.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if let Some(technology) = non_blank(&self.technology) {
            if !project.technologies.iter().any(|t| t.eq_ignore_ascii_case(technology)) {
                return false;
            }
        }

        if let Some(featured) = self.featured {
            if project.is_featured != featured {
                return false;
            }
        }

        if let Some(search) = non_blank(&self.search) {
            let needle = search.to_lowercase();
            let hit = project.name.to_lowercase().contains(&needle)
                || project.short_description.to_lowercase().contains(&needle)
                || project.long_description.to_lowercase().contains(&needle)
                || project.technologies.iter().any(|t| t.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, projects: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
        projects.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Featured projects first, otherwise in catalog order, capped at `limit`.
pub fn featured_first(projects: &[ProjectRecord], limit: usize) -> Vec<ProjectRecord> {
    let (featured, rest): (Vec<&ProjectRecord>, Vec<&ProjectRecord>) =
        projects.iter().partition(|p| p.is_featured);

    featured
        .into_iter()
        .chain(rest)
        .take(limit)
        .cloned()
        .collect()
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ProjectRecord>,
    #[serde(default)]
    pub count: usize,
}

impl ProjectListResponse {
    pub fn new(data: Vec<ProjectRecord>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub readme_html: String,
}

impl From<ProjectRecord> for ProjectDetailResponse {
    fn from(project: ProjectRecord) -> Self {
        let readme_html = safe_markdown_to_html(&project.readme_content);
        Self { project, readme_html }
    }
}

// ───── Helpers ──────────────────────────────────────────────────────

pub fn default_readme(name: &str, long_description: &str) -> String {
    format!("# {}\n\n{}", name.trim(), long_description)
}

/// Trims entries and drops blanks. Order and duplicates are kept.
fn clean_technologies(technologies: &[String]) -> Vec<String> {
    technologies
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Project name is required".into());
        return Err(error);
    }
    Ok(())
}

fn validate_technologies(technologies: &[String]) -> Result<(), ValidationError> {
    if technologies.len() > MAX_TECHNOLOGIES {
        let mut error = ValidationError::new("technologies_count");
        error.message = Some(format!("At most {} technologies allowed", MAX_TECHNOLOGIES).into());
        return Err(error);
    }
    if technologies.iter().any(|t| t.trim().chars().count() > MAX_TECHNOLOGY_LENGTH) {
        let mut error = ValidationError::new("technology_length");
        error.message = Some(format!("Technologies must be at most {} characters", MAX_TECHNOLOGY_LENGTH).into());
        return Err(error);
    }
    Ok(())
}

pub mod mail;
pub mod media;
pub mod project;
pub mod sqlx_repo;
pub mod token;

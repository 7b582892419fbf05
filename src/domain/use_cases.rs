pub mod auth;
pub mod contact;
pub mod extractors;
pub mod media;
pub mod projects;

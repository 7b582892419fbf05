pub mod auth;
pub mod contact;
pub mod home;
pub mod json_error;
pub mod media;
pub mod projects;
pub mod system;

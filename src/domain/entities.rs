pub mod admin;
pub mod contact_me;
pub mod media;
pub mod option_fields;
pub mod project;
pub mod token;

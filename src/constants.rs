use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Key of the persisted project list in the local record store.
pub const LOCAL_CACHE_KEY: &str = "portfolio_projects";

pub const CONTACT_SUBJECT_PREFIX: &str = "Portfolio Contact";

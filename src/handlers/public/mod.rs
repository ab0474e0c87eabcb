// handlers/public/mod.rs - endpoints that need no session
pub mod auth;
pub mod catalog;
pub mod inquiry;

pub use auth::{login as auth_login, refresh as auth_refresh, session as auth_session};
pub use catalog::{companies as catalog_companies, courses as catalog_courses, projects as catalog_projects};
pub use inquiry::post as inquiry_post;

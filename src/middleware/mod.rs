pub mod auth;
pub mod response;

pub use auth::{admin_gate, bearer_token, AdminSession};
pub use response::{ApiResponse, ApiResult};

// handlers/admin/mod.rs - back-office endpoints behind the admin gate
//
// Every route here is wrapped by `middleware::admin_gate`, so handlers may
// rely on an `AdminSession` extension being present.
pub mod resource;
pub mod setup;
pub mod users;

pub use resource::{delete as resource_delete, get as resource_get, list as resource_list};
pub use resource::{post as resource_post, put as resource_put};
pub use setup::get as setup_get;
pub use users::{create as users_create, update_me as users_update_me};

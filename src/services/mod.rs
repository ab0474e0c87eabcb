pub mod catalog;
pub mod classify;
pub mod error;
pub mod writer;

pub use catalog::{fetch_list, fetch_one, Listing};
pub use error::{WriteError, SETUP_HINT};
pub use writer::{create_or_update, delete};

pub mod check;
pub mod fallback;
pub mod setup;
pub mod user;
pub mod whoami;

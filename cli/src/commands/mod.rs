//! Subcommand implementations.

pub mod auth;
pub mod users;

pub use auth::{run_login, run_logout, run_register, run_whoami};
pub use users::run_users;

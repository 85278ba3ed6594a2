//! Students and admin accounts.

mod admins;
mod students;

pub use admins::{hash_password, verify_password, AdminStore};
pub use students::StudentRegistry;

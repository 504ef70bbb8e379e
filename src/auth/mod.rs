//! Authentication and authorization module

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::{extract_token, require_auth, Principal};
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};

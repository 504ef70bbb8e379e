//! Domain models and request/response DTOs

pub mod auth;
pub mod comment;
pub mod post;
pub mod user;

//! HTTP handlers

pub mod auth;
pub mod comment;
pub mod health;
pub mod post;
pub mod user;

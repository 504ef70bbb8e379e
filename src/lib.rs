//! Blog backend service
//! Users, posts, and threaded comments behind bearer-token auth and
//! per-IP rate limiting.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;

//! Employee directory service: a validated CRUD API over SQLite, plus a
//! typed HTTP client for building roster views on top of it.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod docs;
pub mod model;
pub mod routes;
pub mod store;
pub mod validation;

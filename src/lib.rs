//! Catalog service for a classical CD/LP collection.
//!
//! Plain record CRUD and search over a document store, plus a recommendation
//! engine that suggests related recordings by composer, by period and
//! duration, and by shared disc.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

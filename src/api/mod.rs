//! API Module
//!
//! HTTP handlers and routing for the cache demo server.
//!
//! # Endpoints
//! - `GET /` - Endpoint index
//! - `GET|POST|DELETE /user` - Cache-aside user lookups
//! - `PUT /set`, `GET /get/:key`, `DELETE /del/:key` - Raw key operations
//! - `GET /stats` - Cache statistics
//! - `POST /clear` - Reset entries and statistics
//! - `GET /export` - Diagnostic dump
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

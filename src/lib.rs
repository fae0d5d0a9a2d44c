//! Form Builder Service
//!
//! This library provides a web service for building forms and collecting
//! responses against them. Users register and log in, create forms made of
//! ordered typed fields, share them by username, gather submissions, and
//! export the collected responses as CSV.
//!
//! # Modules
//!
//! - `services`: transactional form aggregate, response and user stores
//! - `handlers`: axum request handlers and shared application state
//! - `auth`: session token issuance and password hashing
//!
//! # Storage
//!
//! All state lives in a SQLite database behind a `sqlx` connection pool.
//! A form and its fields are one consistency unit: creates, updates and
//! deletes of the aggregate run inside a single transaction.

pub mod auth;
pub mod error;

pub mod models {
    pub mod common;
    pub mod form;
    pub mod response;
    pub mod user;
}

pub mod services {
    pub mod database;
    pub mod export;
    pub mod forms;
    pub mod responses;
    pub mod users;
}

pub mod handlers {
    pub mod api;
    pub mod health;
}

pub mod routes;


// Re-export the main types for ease of use
pub use auth::TokenAuth;
pub use error::ServiceError;
pub use handlers::api::AppState;
pub use routes::create_router;

//! HTTP handlers, one module per resource.

pub mod auth;
pub mod books;
pub mod health;
pub mod library;
pub mod requests;

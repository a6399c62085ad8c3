//! HTTP layer: request/response handling for the two public operations.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Tracing and CORS middleware

pub mod dto;
pub mod handlers;
pub mod middleware;

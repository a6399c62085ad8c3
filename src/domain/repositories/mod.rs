//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the durable store. Implementations live in
//! `crate::infrastructure::persistence`; mock implementations are generated
//! with `mockall` for service tests.
//!
//! # Available Repositories
//!
//! - [`UrlRepository`] - Id allocation, code assignment, lookup and click counting
//!
//! # Testing
//!
//! See integration tests in `tests/repository_url.rs` for usage examples.

pub mod url_repository;

pub use url_repository::UrlRepository;

#[cfg(test)]
pub use url_repository::MockUrlRepository;

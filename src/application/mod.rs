//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, the resolution cache and the click
//! queue, and expose the two operations the HTTP layer needs.
//!
//! # Available Services
//!
//! - [`services::registrar::Registrar`] - Long URL registration and short code assignment
//! - [`services::resolver::Resolver`] - Cache-aside short code resolution and click dispatch

pub mod services;

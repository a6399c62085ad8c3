//! Utility functions for code generation and URL processing.
//!
//! This module provides helper functions used across the application:
//!
//! - [`base62`] - Short code encoding from store ids
//! - [`scheme`] - Redirect target scheme normalization
//! - [`url_validator`] - Validation of submitted long URLs

pub mod base62;
pub mod scheme;
pub mod url_validator;

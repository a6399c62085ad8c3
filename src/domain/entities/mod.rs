//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! - [`UrlRecord`] - A long URL, its derived short code and click counter

pub mod url_record;

pub use url_record::UrlRecord;

//! Domain layer containing business entities and repository contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click counting event model
//! - [`click_worker`] - Asynchronous click counter worker
//!
//! # Click Processing Flow
//!
//! 1. [`crate::application::services::Resolver`] resolves a code
//! 2. [`click_event::ClickEvent`] is sent to a bounded channel (dropped if full)
//! 3. [`click_worker::run_click_worker`] applies the increment with retry
//! 4. The counter is persisted via [`repositories::UrlRepository::increment_clicks`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;

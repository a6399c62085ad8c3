//! Click event model for asynchronous click counting.

/// A successful resolution waiting to be counted.
///
/// Created by [`crate::application::services::Resolver`] after a code
/// resolves and sent to [`crate::domain::click_worker::run_click_worker`]
/// through a bounded channel, so the redirect never waits on the counter
/// update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
}

impl ClickEvent {
    /// Creates a new click event for `code`.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

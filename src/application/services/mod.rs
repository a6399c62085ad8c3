//! Business logic services for the application layer.

pub mod registrar;
pub mod resolver;
pub mod settings;

pub use registrar::{Registrar, Registration};
pub use resolver::{ClickDispatch, Resolution, ResolutionSource, Resolver};
pub use settings::ServiceSettings;

//! Auth token entities.

pub mod details;
pub mod model;

pub use details::SessionDetails;
pub use model::{AuthToken, CreateAuthToken};

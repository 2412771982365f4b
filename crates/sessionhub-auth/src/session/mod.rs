//! Session token lifecycle.

pub mod memory;
pub mod reclaimer;
pub mod renewal;
pub mod service;
pub mod store;

pub use memory::MemoryTokenStore;
pub use reclaimer::TokenReclaimer;
pub use renewal::RenewalOutcome;
pub use service::SessionService;
pub use store::TokenStore;

#[cfg(test)]
pub(crate) mod testing;

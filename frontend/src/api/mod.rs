mod auth;
pub mod client;
mod sessions;
pub mod types;

pub use client::{ApiClient, SESSION_EXPIRED_EVENT};
pub use types::*;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod test_support;
#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests;

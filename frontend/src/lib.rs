pub mod api;
pub mod components;
pub mod config;
pub mod pages;
pub mod router;
pub mod session;
pub mod state;
pub mod utils;

#[cfg(test)]
pub mod test_support;

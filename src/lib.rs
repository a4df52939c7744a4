pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod poller;
pub mod price;
pub mod store;
#[cfg(test)]
pub mod test_helpers;
pub mod tracker;

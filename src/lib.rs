pub mod config;
pub mod contract;
pub mod error;
pub mod history;
pub mod record;
pub mod store;
pub mod utils;

pub mod config;
pub mod constants;
pub mod core;
mod error;
pub mod projection;
pub mod store;

pub use error::Error;

pub mod results;
pub mod types;

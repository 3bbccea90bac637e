pub mod config;
pub mod errors;
pub mod generation;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

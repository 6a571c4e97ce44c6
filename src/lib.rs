pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

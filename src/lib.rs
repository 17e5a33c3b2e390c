pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod types;

// Layered boundaries: ports describe capabilities, infra implements them
pub mod app;
pub mod infra;

pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod model;
pub mod output;
pub mod parser;
pub mod store;

pub mod app;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod storage;
pub mod types;

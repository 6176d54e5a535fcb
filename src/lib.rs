pub mod analysis;
pub mod config;
pub mod feeds;
pub mod models;
pub mod session;
pub mod signals;
pub mod telemetry;

pub mod config;
pub mod encode;
pub mod error;
pub mod models;
pub mod report;
pub mod server;

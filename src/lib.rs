pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod limiter;
pub mod mcp;
pub mod normalize;
pub mod server;
pub mod stores;
pub mod tools;
pub mod types;

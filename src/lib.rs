pub mod agent;
pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod location;
pub mod mcp;
pub mod models;
pub mod prompt;
pub mod routes;
pub mod service;
pub mod state;

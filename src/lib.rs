// src/lib.rs

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod geocoding;
pub mod import;
pub mod notify;
pub mod server;
pub mod state;
pub mod things;
pub mod users;

pub use state::AppState;

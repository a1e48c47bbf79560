// src/api/http/mod.rs

pub mod handlers;
pub mod router;
pub mod things;

pub use router::http_router;

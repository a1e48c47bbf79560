// src/api/mod.rs

pub mod auth;
pub mod error;
pub mod http;

pub use error::{ApiError, ApiResult};

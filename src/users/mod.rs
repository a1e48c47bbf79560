// src/users/mod.rs

pub mod store;
pub mod types;

pub use store::{MemoryUserStore, SqliteUserStore, UserRepository};
pub use types::{NewUser, User};

// src/error.rs
// Domain error types shared by the stores, the locator and the update flow

use std::collections::BTreeMap;

/// Field-keyed validation messages, rendered as `{"errors": {field: [msg, ...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field} {}", messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    pub fn thing_not_found(id: i64) -> Self {
        Self::NotFound { entity: "thing", id }
    }

    pub fn user_not_found(id: i64) -> Self {
        Self::NotFound { entity: "user", id }
    }
}

/// Raised by the locator when nothing lies within the search radius.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct NotFoundError {
    pub field: &'static str,
    pub message: &'static str,
}

impl NotFoundError {
    pub const DRAIN: NotFoundError = NotFoundError {
        field: "address",
        message: "Could not find drain.",
    };

    pub const ADDRESS: NotFoundError = NotFoundError {
        field: "address",
        message: "Could not find address.",
    };
}

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

// src/things/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub user_id: Option<i64>,
    pub adopted_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Thing {
    /// The adopted name when one is set, otherwise the catalog name.
    pub fn display_name(&self) -> &str {
        match self.adopted_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.name,
        }
    }

    pub fn adopted(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate { lat: self.lat, lng: self.lng }
    }

    pub fn snapshot(&self) -> ThingSnapshot {
        ThingSnapshot {
            user_id: self.user_id,
            adopted_name: self.adopted_name.clone(),
        }
    }

    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: &ThingPatch) {
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(adopted_name) = &patch.adopted_name {
            self.adopted_name = adopted_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
        }
    }
}

/// Row shape as stored in SQLite (timestamps are Unix seconds).
#[derive(Debug, sqlx::FromRow)]
pub struct ThingRow {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub user_id: Option<i64>,
    pub adopted_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ThingRow> for Thing {
    fn from(r: ThingRow) -> Self {
        let ts = |secs: i64| DateTime::from_timestamp(secs, 0).unwrap_or_default();
        Thing {
            id: r.id,
            name: r.name,
            lat: r.lat,
            lng: r.lng,
            user_id: r.user_id,
            adopted_name: r.adopted_name,
            created_at: ts(r.created_at),
            updated_at: ts(r.updated_at),
        }
    }
}

/// Ownership and naming state captured around an update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThingSnapshot {
    pub user_id: Option<i64>,
    pub adopted_name: Option<String>,
}

/// Fields needed to import a drain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewThing {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Partial update. The outer `Option` tells "absent" apart from an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThingPatch {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub adopted_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub user_id: Option<Option<i64>>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Request body for `PUT /things/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateThingRequest {
    pub thing: ThingPatch,
}

/// JSON representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingResponse {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub lat: f64,
    pub lng: f64,
    pub user_id: Option<i64>,
    pub adopted_name: Option<String>,
    pub adopted: bool,
    pub owned_by_current_user: bool,
    pub updated_at: DateTime<Utc>,
}

impl ThingResponse {
    pub fn new(thing: &Thing, current_user_id: Option<i64>) -> Self {
        Self {
            id: thing.id,
            name: thing.name.clone(),
            display_name: thing.display_name().to_string(),
            lat: thing.lat,
            lng: thing.lng,
            user_id: thing.user_id,
            adopted_name: thing.adopted_name.clone(),
            adopted: thing.adopted(),
            owned_by_current_user: current_user_id.is_some() && thing.user_id == current_user_id,
            updated_at: thing.updated_at,
        }
    }
}

// src/things/store.rs
// Persistence for drains: SQLite for the service, in-memory for tests

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tokio::sync::{Mutex, RwLock};

use super::types::{NewThing, Thing, ThingRow};
use crate::error::{FieldErrors, RepoError};
use crate::geo::BoundingBox;

#[async_trait]
pub trait ThingRepository: Send + Sync {
    async fn get(&self, id: i64) -> Result<Thing, RepoError>;

    /// Persist ownership and naming fields; returns the stored record.
    async fn save(&self, thing: &Thing) -> Result<Thing, RepoError>;

    /// Candidates inside `bbox`, unordered.
    async fn within(&self, bbox: &BoundingBox) -> Result<Vec<Thing>, RepoError>;

    async fn count_owned_by(&self, user_id: i64) -> Result<i64, RepoError>;

    async fn insert(&self, thing: NewThing) -> Result<Thing, RepoError>;
}

const THING_COLUMNS: &str = "id, name, lat, lng, user_id, adopted_name, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteThingStore {
    pool: SqlitePool,
}

impl SqliteThingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThingRepository for SqliteThingStore {
    async fn get(&self, id: i64) -> Result<Thing, RepoError> {
        let row = sqlx::query_as::<_, ThingRow>(&format!(
            "SELECT {THING_COLUMNS} FROM things WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Thing::from).ok_or(RepoError::thing_not_found(id))
    }

    async fn save(&self, thing: &Thing) -> Result<Thing, RepoError> {
        let result = sqlx::query(
            "UPDATE things SET user_id = ?, adopted_name = ?, updated_at = ? WHERE id = ?",
        )
        .bind(thing.user_id)
        .bind(&thing.adopted_name)
        .bind(Utc::now().timestamp())
        .bind(thing.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::thing_not_found(thing.id));
        }
        self.get(thing.id).await
    }

    async fn within(&self, bbox: &BoundingBox) -> Result<Vec<Thing>, RepoError> {
        let lng_clause = if bbox.crosses_antimeridian() {
            "(lng >= ? OR lng <= ?)"
        } else {
            "lng BETWEEN ? AND ?"
        };
        let rows = sqlx::query_as::<_, ThingRow>(&format!(
            "SELECT {THING_COLUMNS} FROM things WHERE lat BETWEEN ? AND ? AND {lng_clause}"
        ))
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(bbox.min_lng)
        .bind(bbox.max_lng)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Thing::from).collect())
    }

    async fn count_owned_by(&self, user_id: i64) -> Result<i64, RepoError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM things WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, thing: NewThing) -> Result<Thing, RepoError> {
        let now = Utc::now().timestamp();
        let id = sqlx::query(
            "INSERT INTO things (name, lat, lng, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&thing.name)
        .bind(thing.lat)
        .bind(thing.lng)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get(id).await
    }
}

/// In-memory drain store.
///
/// `reject_saves` makes every later `save` fail with the given field errors,
/// which is how tests exercise the rejected-update path.
#[derive(Default)]
pub struct MemoryThingStore {
    things: RwLock<BTreeMap<i64, Thing>>,
    save_failure: Mutex<Option<FieldErrors>>,
}

impl MemoryThingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reject_saves(&self, errors: FieldErrors) {
        *self.save_failure.lock().await = Some(errors);
    }

    /// Set the owner directly, bypassing the update flow.
    pub async fn assign_owner(&self, id: i64, user_id: Option<i64>) -> Result<(), RepoError> {
        let mut things = self.things.write().await;
        let thing = things.get_mut(&id).ok_or(RepoError::thing_not_found(id))?;
        thing.user_id = user_id;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.things.read().await.len()
    }
}

#[async_trait]
impl ThingRepository for MemoryThingStore {
    async fn get(&self, id: i64) -> Result<Thing, RepoError> {
        self.things
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepoError::thing_not_found(id))
    }

    async fn save(&self, thing: &Thing) -> Result<Thing, RepoError> {
        if let Some(errors) = self.save_failure.lock().await.clone() {
            return Err(RepoError::Validation(errors));
        }

        let mut things = self.things.write().await;
        let stored = things
            .get_mut(&thing.id)
            .ok_or(RepoError::thing_not_found(thing.id))?;
        stored.user_id = thing.user_id;
        stored.adopted_name = thing.adopted_name.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn within(&self, bbox: &BoundingBox) -> Result<Vec<Thing>, RepoError> {
        Ok(self
            .things
            .read()
            .await
            .values()
            .filter(|t| bbox.contains(&t.coordinate()))
            .cloned()
            .collect())
    }

    async fn count_owned_by(&self, user_id: i64) -> Result<i64, RepoError> {
        let count = self
            .things
            .read()
            .await
            .values()
            .filter(|t| t.user_id == Some(user_id))
            .count();
        Ok(count as i64)
    }

    async fn insert(&self, thing: NewThing) -> Result<Thing, RepoError> {
        let mut things = self.things.write().await;
        let id = things.keys().next_back().copied().unwrap_or(0) + 1;
        let now = Utc::now();
        let thing = Thing {
            id,
            name: thing.name,
            lat: thing.lat,
            lng: thing.lng,
            user_id: None,
            adopted_name: None,
            created_at: now,
            updated_at: now,
        };
        things.insert(id, thing.clone());
        Ok(thing)
    }
}

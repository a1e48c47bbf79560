// src/things/mod.rs

pub mod locator;
pub mod service;
pub mod store;
pub mod types;

pub use locator::Locator;
pub use service::{ThingService, UpdateOutcome};
pub use store::{MemoryThingStore, SqliteThingStore, ThingRepository};
pub use types::{NewThing, Thing, ThingPatch, ThingResponse, ThingSnapshot, UpdateThingRequest};

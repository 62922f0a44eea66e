//! Event-driven write-through cache for the catalog hierarchy.
//!
//! - **Layer**: typed JSON cache over a pluggable byte store
//! - **Events**: write operations publish invalidation events
//! - **Consumer**: merges events into a plan, sweeps, drops and warms
//!
//! Runtime behavior (master switch, TTL, consumer cadence) comes from
//! the `[cache]` table of the configuration; see [`CacheConfig`].

mod config;
mod consumer;
mod events;
mod keys;
mod layer;
mod lock;
mod planner;
mod store;
mod trigger;

pub use config::CacheConfig;
pub use consumer::{CacheConsumer, WarmSources};
pub use events::{CacheEvent, Epoch, EventKind, EventQueue};
pub use keys::CacheKey;
pub use layer::CacheLayer;
pub use planner::ConsumptionPlan;
pub use store::{CacheStore, CacheStoreError, MemoryStore};
pub use trigger::CacheTrigger;

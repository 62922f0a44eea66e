//! Write-path entry points for cache invalidation.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::config::CacheConfig;
use super::consumer::CacheConsumer;
use super::events::{EventKind, EventQueue};

/// Publishes invalidation events on behalf of the write paths.
///
/// Handlers call the per-entity methods after a successful mutation.
/// Each publishes one event and consumes the queue before the response
/// leaves the handler, so a read that follows a write sees fresh data.
pub struct CacheTrigger {
    config: CacheConfig,
    queue: Arc<EventQueue>,
    consumer: Arc<CacheConsumer>,
}

impl CacheTrigger {
    pub fn new(config: CacheConfig, queue: Arc<EventQueue>, consumer: Arc<CacheConsumer>) -> Self {
        Self {
            config,
            queue,
            consumer,
        }
    }

    /// Publishes `kind` and, with `consume_now`, drains the queue before
    /// returning. Without it the event waits for the background pass.
    pub async fn trigger(&self, kind: EventKind, consume_now: bool) {
        if !self.config.is_enabled() {
            debug!(event_kind = ?kind, "Cache disabled, event dropped");
            return;
        }
        self.queue.publish(kind);
        if consume_now {
            self.consumer.consume().await;
        }
    }

    /// Publish a duplicate refresh event on a detached task.
    ///
    /// The write path has already invalidated and warmed synchronously;
    /// this second pass catches entries written by readers that raced the
    /// synchronous consumption. The caller does not await the task.
    pub fn spawn_refresh(&self, kind: EventKind) -> tokio::task::JoinHandle<()> {
        let detached = Self::new(
            self.config.clone(),
            Arc::clone(&self.queue),
            Arc::clone(&self.consumer),
        );
        tokio::spawn(async move {
            detached.trigger(kind, true).await;
        })
    }

    /// Menu created or updated.
    pub async fn menu_upserted(&self, menu_id: Uuid) {
        self.trigger(EventKind::MenuUpserted { menu_id }, true).await;
    }

    /// Menu deleted, along with its subtree.
    pub async fn menu_deleted(&self, menu_id: Uuid) {
        self.trigger(EventKind::MenuDeleted { menu_id }, true).await;
    }

    /// Submenu created or updated.
    pub async fn submenu_upserted(&self, menu_id: Uuid, submenu_id: Uuid) {
        self.trigger(
            EventKind::SubMenuUpserted {
                menu_id,
                submenu_id,
            },
            true,
        )
        .await;
    }

    /// Submenu deleted.
    pub async fn submenu_deleted(&self, menu_id: Uuid, submenu_id: Uuid) {
        self.trigger(
            EventKind::SubMenuDeleted {
                menu_id,
                submenu_id,
            },
            true,
        )
        .await;
    }

    /// Dish created or updated.
    pub async fn dish_upserted(&self, menu_id: Uuid, submenu_id: Uuid, dish_id: Uuid) {
        self.trigger(
            EventKind::DishUpserted {
                menu_id,
                submenu_id,
                dish_id,
            },
            true,
        )
        .await;
    }

    /// Dish deleted.
    pub async fn dish_deleted(&self, menu_id: Uuid, submenu_id: Uuid, dish_id: Uuid) {
        self.trigger(
            EventKind::DishDeleted {
                menu_id,
                submenu_id,
                dish_id,
            },
            true,
        )
        .await;
    }

    /// Rebuilds every cached list once at startup.
    pub async fn warmup_on_startup(&self) {
        self.trigger(EventKind::WarmupOnStartup, true).await;
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn consumer(&self) -> &Arc<CacheConsumer> {
        &self.consumer
    }
}

//! Invalidation event queue.
//!
//! Write paths append events here; the consumer drains them in batches
//! and folds them into a consumption plan.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::lock::mutex_lock;

const METRIC_CACHE_EVENTS_PUBLISHED: &str = "carta_cache_events_published_total";

/// Process-local ordering ticket. Later events carry larger epochs, so a
/// consumer merging a batch can tell which write is most recent for an
/// entity.
pub type Epoch = u64;

/// One queued invalidation.
///
/// `id` makes redelivery idempotent, `epoch` orders events within this
/// process, `timestamp` records when the write happened.
#[derive(Debug, Clone)]
pub struct CacheEvent {
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: EventKind,
    pub timestamp: OffsetDateTime,
}

impl CacheEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// The catalog mutations the cache reacts to.
///
/// Each mutation event carries the full ancestor path of the touched
/// entity, because the invalidation rules reach upward through every
/// level of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A menu was created or updated.
    MenuUpserted { menu_id: Uuid },
    /// A menu was deleted (its subtree went with it).
    MenuDeleted { menu_id: Uuid },
    /// A submenu was created or updated.
    SubMenuUpserted { menu_id: Uuid, submenu_id: Uuid },
    /// A submenu was deleted.
    SubMenuDeleted { menu_id: Uuid, submenu_id: Uuid },
    /// A dish was created or updated.
    DishUpserted {
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    },
    /// A dish was deleted.
    DishDeleted {
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    },
    /// One-time rebuild of the list and snapshot keys at boot.
    WarmupOnStartup,
}

/// FIFO queue of pending invalidations, shared between the write paths
/// and the consumer.
pub struct EventQueue {
    pending: Mutex<VecDeque<CacheEvent>>,
    epochs: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            epochs: AtomicU64::new(0),
        }
    }

    fn allocate_epoch(&self) -> Epoch {
        self.epochs.fetch_add(1, Ordering::SeqCst)
    }

    /// Appends an event stamped with a fresh epoch.
    pub fn publish(&self, kind: EventKind) {
        let event = CacheEvent::new(kind, self.allocate_epoch());

        counter!(METRIC_CACHE_EVENTS_PUBLISHED).increment(1);
        info!(
            id = %event.id,
            epoch = event.epoch,
            kind = ?event.kind,
            "Queued cache event"
        );

        mutex_lock(&self.pending, "publish").push_back(event);
    }

    /// Removes and returns up to `limit` events, oldest first.
    pub fn drain(&self, limit: usize) -> Vec<CacheEvent> {
        let mut pending = mutex_lock(&self.pending, "drain");
        let take = limit.min(pending.len());
        pending.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.pending, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        mutex_lock(&self.pending, "clear").clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn events_carry_unique_ids_and_the_given_epoch() {
        let kind = EventKind::MenuUpserted {
            menu_id: Uuid::nil(),
        };
        let first = CacheEvent::new(kind, 7);
        let second = CacheEvent::new(kind, 8);

        assert_eq!(first.epoch, 7);
        assert_eq!(first.kind, kind);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn published_events_drain_in_publish_order() {
        let queue = EventQueue::new();
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();

        queue.publish(EventKind::MenuUpserted { menu_id });
        queue.publish(EventKind::SubMenuUpserted {
            menu_id,
            submenu_id,
        });
        queue.publish(EventKind::WarmupOnStartup);
        assert_eq!(queue.len(), 3);

        let batch = queue.drain(2);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].kind, EventKind::MenuUpserted { menu_id });
        assert_eq!(
            batch[1].kind,
            EventKind::SubMenuUpserted {
                menu_id,
                submenu_id
            }
        );
        assert!(batch[0].epoch < batch[1].epoch);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn drain_caps_at_the_queue_length() {
        let queue = EventQueue::new();
        queue.publish(EventKind::WarmupOnStartup);

        assert_eq!(queue.drain(100).len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_drops_everything_pending() {
        let queue = EventQueue::new();
        queue.publish(EventKind::WarmupOnStartup);
        queue.publish(EventKind::MenuDeleted {
            menu_id: Uuid::nil(),
        });

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn publishing_survives_a_poisoned_lock() {
        let queue = EventQueue::new();

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = queue.pending.lock().expect("fresh lock");
            panic!("poison the queue lock");
        }));

        queue.publish(EventKind::WarmupOnStartup);
        assert_eq!(queue.len(), 1);
    }
}

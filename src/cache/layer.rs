//! Typed cache facade over the byte store.
//!
//! Serializes read models to JSON under hierarchy-shaped keys and swallows
//! every backend failure: a cache problem surfaces as a miss plus a warn
//! log, never as a request error.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::{DishRecord, MenuTree, MenuView, SubMenuView};

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::store::{CacheStore, CacheStoreError};

const METRIC_CACHE_HIT: &str = "carta_cache_hit_total";
const METRIC_CACHE_MISS: &str = "carta_cache_miss_total";

/// Typed catalog cache.
///
/// Holds the backend as an injected capability so services and tests can
/// swap it without touching call sites.
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    enabled: bool,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            ttl: config.ttl(),
            enabled: config.is_enabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let rendered = key.render();
        let bytes = match self.store.get(&rendered).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                counter!(METRIC_CACHE_MISS).increment(1);
                return None;
            }
            Err(CacheStoreError::Unavailable(reason)) => {
                warn!(key = %rendered, reason, "Cache read failed; treating as miss");
                counter!(METRIC_CACHE_MISS).increment(1);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                counter!(METRIC_CACHE_HIT).increment(1);
                Some(value)
            }
            Err(err) => {
                warn!(key = %rendered, error = %err, "Cache entry corrupt; treating as miss");
                counter!(METRIC_CACHE_MISS).increment(1);
                None
            }
        }
    }

    async fn put_json<T: Serialize>(&self, key: &CacheKey, value: &T) {
        if !self.enabled {
            return;
        }
        let rendered = key.render();
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                warn!(key = %rendered, error = %err, "Cache entry could not be serialized");
                return;
            }
        };
        if let Err(CacheStoreError::Unavailable(reason)) =
            self.store.set(&rendered, bytes, self.ttl).await
        {
            warn!(key = %rendered, reason, "Cache write failed; entry not stored");
        }
    }

    pub async fn menu(&self, menu_id: Uuid) -> Option<MenuView> {
        self.get_json(&CacheKey::Menu(menu_id)).await
    }

    pub async fn set_menu(&self, view: &MenuView) {
        self.put_json(&CacheKey::Menu(view.id), view).await;
    }

    pub async fn menu_list(&self) -> Option<Vec<MenuView>> {
        self.get_json(&CacheKey::MenuList).await
    }

    pub async fn set_menu_list(&self, views: &[MenuView]) {
        self.put_json(&CacheKey::MenuList, &views).await;
    }

    pub async fn submenu(&self, menu_id: Uuid, submenu_id: Uuid) -> Option<SubMenuView> {
        self.get_json(&CacheKey::SubMenu {
            menu_id,
            submenu_id,
        })
        .await
    }

    pub async fn set_submenu(&self, view: &SubMenuView) {
        self.put_json(
            &CacheKey::SubMenu {
                menu_id: view.menu_id,
                submenu_id: view.id,
            },
            view,
        )
        .await;
    }

    pub async fn submenu_list(&self, menu_id: Uuid) -> Option<Vec<SubMenuView>> {
        self.get_json(&CacheKey::SubMenuList(menu_id)).await
    }

    pub async fn set_submenu_list(&self, menu_id: Uuid, views: &[SubMenuView]) {
        self.put_json(&CacheKey::SubMenuList(menu_id), &views).await;
    }

    pub async fn dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Option<DishRecord> {
        self.get_json(&CacheKey::Dish {
            menu_id,
            submenu_id,
            dish_id,
        })
        .await
    }

    pub async fn set_dish(&self, menu_id: Uuid, record: &DishRecord) {
        self.put_json(
            &CacheKey::Dish {
                menu_id,
                submenu_id: record.submenu_id,
                dish_id: record.id,
            },
            record,
        )
        .await;
    }

    pub async fn dish_list(&self, menu_id: Uuid, submenu_id: Uuid) -> Option<Vec<DishRecord>> {
        self.get_json(&CacheKey::DishList {
            menu_id,
            submenu_id,
        })
        .await
    }

    pub async fn set_dish_list(&self, menu_id: Uuid, submenu_id: Uuid, records: &[DishRecord]) {
        self.put_json(
            &CacheKey::DishList {
                menu_id,
                submenu_id,
            },
            &records,
        )
        .await;
    }

    pub async fn tree(&self) -> Option<Vec<MenuTree>> {
        self.get_json(&CacheKey::Tree).await
    }

    pub async fn set_tree(&self, tree: &[MenuTree]) {
        self.put_json(&CacheKey::Tree, &tree).await;
    }

    /// Drop a set of exact keys.
    pub async fn drop_keys(&self, keys: &[CacheKey]) {
        if !self.enabled || keys.is_empty() {
            return;
        }
        let rendered: Vec<String> = keys.iter().map(CacheKey::render).collect();
        if let Err(CacheStoreError::Unavailable(reason)) = self.store.delete(&rendered).await {
            warn!(keys = ?rendered, reason, "Cache delete failed; entries may linger until TTL");
        }
    }

    /// Sweep everything under an item-level key, the key itself included.
    pub async fn sweep(&self, key: &CacheKey) {
        if !self.enabled {
            return;
        }
        let prefix = key.render();
        if let Err(CacheStoreError::Unavailable(reason)) = self.store.delete_prefix(&prefix).await {
            warn!(prefix = %prefix, reason, "Cache sweep failed; entries may linger until TTL");
        }
    }

    pub async fn clear(&self) {
        if !self.enabled {
            return;
        }
        if let Err(CacheStoreError::Unavailable(reason)) = self.store.clear().await {
            warn!(reason, "Cache clear failed");
        }
    }
}

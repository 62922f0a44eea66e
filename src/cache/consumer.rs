//! Applies drained invalidation events to the cache.
//!
//! Each pass drains a batch, folds it into a plan, sweeps and drops the
//! affected keys, then rewarms item entries from the repositories.

use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use metrics::histogram;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::repos::{AggregateCountsRepo, DishesRepo, MenusRepo, SubMenusRepo};
use crate::application::views::{
    load_menu_tree, load_menu_view, load_menu_views, load_submenu_view,
};

use super::config::CacheConfig;
use super::events::EventQueue;
use super::keys::CacheKey;
use super::layer::CacheLayer;
use super::planner::ConsumptionPlan;

const METRIC_CACHE_CONSUME_MS: &str = "carta_cache_consume_ms";
const METRIC_CACHE_WARM_MS: &str = "carta_cache_warm_ms";

/// Store access used by the warm phase.
pub struct WarmSources {
    pub menus: Arc<dyn MenusRepo>,
    pub submenus: Arc<dyn SubMenusRepo>,
    pub dishes: Arc<dyn DishesRepo>,
    pub counts: Arc<dyn AggregateCountsRepo>,
}

/// Executes consumption plans against the cache layer.
///
/// A pass runs three steps: sweep the item prefixes the plan names, drop
/// the exact aggregate keys, then rewarm the marked entries.
pub struct CacheConsumer {
    config: CacheConfig,
    layer: Arc<CacheLayer>,
    queue: Arc<EventQueue>,
    sources: Option<WarmSources>,
    #[cfg(test)]
    warm_invocations: Arc<AtomicUsize>,
}

impl CacheConsumer {
    pub fn new(
        config: CacheConfig,
        layer: Arc<CacheLayer>,
        queue: Arc<EventQueue>,
        sources: WarmSources,
    ) -> Self {
        Self {
            config,
            layer,
            queue,
            sources: Some(sources),
            #[cfg(test)]
            warm_invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Consumer with no repositories wired; the warm phase becomes a no-op.
    #[cfg(test)]
    pub fn new_without_sources(
        config: CacheConfig,
        layer: Arc<CacheLayer>,
        queue: Arc<EventQueue>,
    ) -> Self {
        Self {
            config,
            layer,
            queue,
            sources: None,
            warm_invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Drains and applies pending events, warming included. Returns false
    /// when the queue was empty.
    #[instrument(skip(self))]
    pub async fn consume(&self) -> bool {
        self.consume_with_mode(true).await
    }

    /// Applies only the invalidation half of the plan, for callers that
    /// defer rewarming.
    #[instrument(skip(self))]
    pub async fn consume_invalidate_only(&self) -> bool {
        self.consume_with_mode(false).await
    }

    /// Applies invalidation and warming both.
    #[instrument(skip(self))]
    pub async fn consume_full(&self) -> bool {
        self.consume_with_mode(true).await
    }

    async fn consume_with_mode(&self, include_warm: bool) -> bool {
        let started = Instant::now();
        let events = self.queue.drain(self.config.consume_batch_limit);
        if events.is_empty() {
            return false;
        }

        let event_ids: Vec<Uuid> = events.iter().map(|event| event.id).collect();
        let plan = ConsumptionPlan::from_events(events);
        info!(
            event_count = event_ids.len(),
            event_ids = ?event_ids,
            plan = %plan,
            include_warm,
            "Consuming cache events"
        );

        if self.config.is_enabled() {
            // Invalidation must land before the warm phase writes back.
            for prefix in &plan.sweep_prefixes {
                self.layer.sweep(prefix).await;
            }
            if !plan.drop_keys.is_empty() {
                let keys: Vec<CacheKey> = plan.drop_keys.iter().cloned().collect();
                self.layer.drop_keys(&keys).await;
            }
            if include_warm && plan.has_warm_actions() {
                self.warm(&plan).await;
            }
        }

        info!(
            event_count = event_ids.len(),
            swept = plan.sweep_prefixes.len(),
            dropped = plan.drop_keys.len(),
            "Cache consumption finished"
        );
        histogram!(
            METRIC_CACHE_CONSUME_MS,
            "mode" => if include_warm { "full" } else { "invalidate_only" }
        )
        .record(started.elapsed().as_secs_f64() * 1000.0);

        true
    }

    /// Recomputes and writes back the item keys the plan marks. Does
    /// nothing without repository access.
    async fn warm(&self, plan: &ConsumptionPlan) {
        let started = Instant::now();
        #[cfg(test)]
        self.warm_invocations.fetch_add(1, Ordering::Relaxed);

        match &self.sources {
            Some(sources) => self.warm_from(sources, plan).await,
            None => tracing::debug!("Warming skipped: no store access"),
        }

        histogram!(METRIC_CACHE_WARM_MS).record(started.elapsed().as_secs_f64() * 1000.0);
    }

    async fn warm_from(&self, sources: &WarmSources, plan: &ConsumptionPlan) {
        for menu_id in &plan.warm_menus {
            if let Ok(Some(view)) =
                load_menu_view(sources.menus.as_ref(), sources.counts.as_ref(), *menu_id).await
            {
                self.layer.set_menu(&view).await;
            }
        }
        if !plan.warm_menus.is_empty() {
            tracing::debug!(count = plan.warm_menus.len(), "Warmed menus");
        }

        for (menu_id, submenu_id) in &plan.warm_submenus {
            if let Ok(Some(view)) = load_submenu_view(
                sources.submenus.as_ref(),
                sources.counts.as_ref(),
                *menu_id,
                *submenu_id,
            )
            .await
            {
                self.layer.set_submenu(&view).await;
            }
        }
        if !plan.warm_submenus.is_empty() {
            tracing::debug!(count = plan.warm_submenus.len(), "Warmed submenus");
        }

        // A dish event may race a move; write back only while the parent
        // still matches.
        for (menu_id, submenu_id, dish_id) in &plan.warm_dishes {
            if let Ok(Some(record)) = sources.dishes.find_dish(*dish_id).await
                && record.submenu_id == *submenu_id
            {
                self.layer.set_dish(*menu_id, &record).await;
            }
        }
        if !plan.warm_dishes.is_empty() {
            tracing::debug!(count = plan.warm_dishes.len(), "Warmed dishes");
        }

        // The collection and the snapshot are rebuilt only by the startup
        // event; after ordinary writes the next read repopulates them.
        if plan.warm_menu_list
            && let Ok(views) =
                load_menu_views(sources.menus.as_ref(), sources.counts.as_ref()).await
        {
            self.layer.set_menu_list(&views).await;
            tracing::debug!(count = views.len(), "Warmed menu list");
        }
        if plan.warm_tree
            && let Ok(tree) = load_menu_tree(
                sources.menus.as_ref(),
                sources.submenus.as_ref(),
                sources.dishes.as_ref(),
            )
            .await
        {
            self.layer.set_tree(&tree).await;
            tracing::debug!(count = tree.len(), "Warmed catalog snapshot");
        }
    }

    #[cfg(test)]
    fn warm_invocation_count(&self) -> usize {
        self.warm_invocations.load(Ordering::Relaxed)
    }
}

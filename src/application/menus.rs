//! Menu orchestration.
//!
//! Runs the read and write state machines for the top catalog level:
//! reads go cache-first with store fallback, writes mutate the store and
//! then drive the invalidation protocol before responding.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::CatalogError;
use crate::application::repos::{
    AggregateCountsRepo, CreateMenuParams, DishesRepo, MenusRepo, SubMenusRepo, UpdateMenuParams,
};
use crate::application::views::{
    load_menu_tree, load_menu_view, load_menu_views, menu_view_fresh,
};
use crate::cache::{CacheLayer, CacheTrigger, EventKind};
use crate::domain::entities::{EntityKind, MenuTree, MenuView};

pub struct MenuService {
    menus: Arc<dyn MenusRepo>,
    submenus: Arc<dyn SubMenusRepo>,
    dishes: Arc<dyn DishesRepo>,
    counts: Arc<dyn AggregateCountsRepo>,
    cache: Arc<CacheLayer>,
    trigger: Arc<CacheTrigger>,
}

impl MenuService {
    pub fn new(
        menus: Arc<dyn MenusRepo>,
        submenus: Arc<dyn SubMenusRepo>,
        dishes: Arc<dyn DishesRepo>,
        counts: Arc<dyn AggregateCountsRepo>,
        cache: Arc<CacheLayer>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            menus,
            submenus,
            dishes,
            counts,
            cache,
            trigger,
        }
    }

    pub async fn list(&self) -> Result<Vec<MenuView>, CatalogError> {
        if let Some(views) = self.cache.menu_list().await {
            return Ok(views);
        }

        let views = load_menu_views(self.menus.as_ref(), self.counts.as_ref()).await?;
        self.cache.set_menu_list(&views).await;
        Ok(views)
    }

    pub async fn get(&self, menu_id: Uuid) -> Result<MenuView, CatalogError> {
        if let Some(view) = self.cache.menu(menu_id).await {
            return Ok(view);
        }

        let Some(view) =
            load_menu_view(self.menus.as_ref(), self.counts.as_ref(), menu_id).await?
        else {
            return Err(CatalogError::not_found(EntityKind::Menu));
        };
        self.cache.set_menu(&view).await;
        Ok(view)
    }

    pub async fn create(&self, params: CreateMenuParams) -> Result<MenuView, CatalogError> {
        let record = self
            .menus
            .create_menu(params)
            .await
            .map_err(|err| CatalogError::from_repo_for(EntityKind::Menu, err))?;

        self.trigger.menu_upserted(record.id).await;
        let view = menu_view_fresh(record);
        self.trigger
            .spawn_refresh(EventKind::MenuUpserted { menu_id: view.id });
        Ok(view)
    }

    pub async fn update(&self, params: UpdateMenuParams) -> Result<MenuView, CatalogError> {
        let menu_id = params.id;
        let updated = self
            .menus
            .update_menu(params)
            .await
            .map_err(|err| CatalogError::from_repo_for(EntityKind::Menu, err))?;
        if updated.is_none() {
            return Err(CatalogError::not_found(EntityKind::Menu));
        }

        self.trigger.menu_upserted(menu_id).await;

        let Some(view) =
            load_menu_view(self.menus.as_ref(), self.counts.as_ref(), menu_id).await?
        else {
            return Err(CatalogError::not_found(EntityKind::Menu));
        };
        self.trigger
            .spawn_refresh(EventKind::MenuUpserted { menu_id });
        Ok(view)
    }

    pub async fn delete(&self, menu_id: Uuid) -> Result<(), CatalogError> {
        if self.menus.find_menu(menu_id).await?.is_none() {
            return Err(CatalogError::not_found(EntityKind::Menu));
        }

        self.menus.delete_menu(menu_id).await?;
        self.trigger.menu_deleted(menu_id).await;
        self.trigger
            .spawn_refresh(EventKind::MenuDeleted { menu_id });
        Ok(())
    }

    /// Full nested snapshot of the catalog.
    pub async fn full_tree(&self) -> Result<Vec<MenuTree>, CatalogError> {
        if let Some(tree) = self.cache.tree().await {
            return Ok(tree);
        }

        let tree = load_menu_tree(
            self.menus.as_ref(),
            self.submenus.as_ref(),
            self.dishes.as_ref(),
        )
        .await?;
        self.cache.set_tree(&tree).await;
        Ok(tree)
    }
}

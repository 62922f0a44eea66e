//! Submenu orchestration.
//!
//! Every operation is scoped to a parent menu taken from the request
//! path. Items that exist under a different parent are treated as
//! absent rather than leaked across the hierarchy.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::CatalogError;
use crate::application::repos::{
    AggregateCountsRepo, CreateSubMenuParams, MenusRepo, SubMenusRepo, UpdateSubMenuParams,
};
use crate::application::views::{load_submenu_view, load_submenu_views, submenu_view_fresh};
use crate::cache::{CacheLayer, CacheTrigger, EventKind};
use crate::domain::entities::{EntityKind, SubMenuView};

pub struct SubMenuService {
    menus: Arc<dyn MenusRepo>,
    submenus: Arc<dyn SubMenusRepo>,
    counts: Arc<dyn AggregateCountsRepo>,
    cache: Arc<CacheLayer>,
    trigger: Arc<CacheTrigger>,
}

impl SubMenuService {
    pub fn new(
        menus: Arc<dyn MenusRepo>,
        submenus: Arc<dyn SubMenusRepo>,
        counts: Arc<dyn AggregateCountsRepo>,
        cache: Arc<CacheLayer>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            menus,
            submenus,
            counts,
            cache,
            trigger,
        }
    }

    /// Lists submenus of one menu. A missing parent yields an empty
    /// list, and that empty list is never cached so a later create
    /// cannot be shadowed by it.
    pub async fn list(&self, menu_id: Uuid) -> Result<Vec<SubMenuView>, CatalogError> {
        if let Some(views) = self.cache.submenu_list(menu_id).await {
            return Ok(views);
        }

        if self.menus.find_menu(menu_id).await?.is_none() {
            return Ok(Vec::new());
        }

        let views =
            load_submenu_views(self.submenus.as_ref(), self.counts.as_ref(), menu_id).await?;
        self.cache.set_submenu_list(menu_id, &views).await;
        Ok(views)
    }

    pub async fn get(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<SubMenuView, CatalogError> {
        if let Some(view) = self.cache.submenu(menu_id, submenu_id).await {
            return Ok(view);
        }

        let Some(view) = load_submenu_view(
            self.submenus.as_ref(),
            self.counts.as_ref(),
            menu_id,
            submenu_id,
        )
        .await?
        else {
            return Err(CatalogError::not_found(EntityKind::SubMenu));
        };
        self.cache.set_submenu(&view).await;
        Ok(view)
    }

    pub async fn create(
        &self,
        params: CreateSubMenuParams,
    ) -> Result<SubMenuView, CatalogError> {
        if self.menus.find_menu(params.menu_id).await?.is_none() {
            return Err(CatalogError::not_found(EntityKind::Menu));
        }

        let record = self
            .submenus
            .create_submenu(params)
            .await
            .map_err(|err| CatalogError::from_repo_for(EntityKind::SubMenu, err))?;

        self.trigger
            .submenu_upserted(record.menu_id, record.id)
            .await;
        let view = submenu_view_fresh(record);
        self.trigger.spawn_refresh(EventKind::SubMenuUpserted {
            menu_id: view.menu_id,
            submenu_id: view.id,
        });
        Ok(view)
    }

    pub async fn update(
        &self,
        menu_id: Uuid,
        params: UpdateSubMenuParams,
    ) -> Result<SubMenuView, CatalogError> {
        let submenu_id = params.id;
        self.ensure_chained(menu_id, submenu_id).await?;

        let updated = self
            .submenus
            .update_submenu(params)
            .await
            .map_err(|err| CatalogError::from_repo_for(EntityKind::SubMenu, err))?;
        if updated.is_none() {
            return Err(CatalogError::not_found(EntityKind::SubMenu));
        }

        self.trigger.submenu_upserted(menu_id, submenu_id).await;

        let Some(view) = load_submenu_view(
            self.submenus.as_ref(),
            self.counts.as_ref(),
            menu_id,
            submenu_id,
        )
        .await?
        else {
            return Err(CatalogError::not_found(EntityKind::SubMenu));
        };
        self.trigger.spawn_refresh(EventKind::SubMenuUpserted {
            menu_id,
            submenu_id,
        });
        Ok(view)
    }

    pub async fn delete(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<(), CatalogError> {
        self.ensure_chained(menu_id, submenu_id).await?;

        self.submenus.delete_submenu(submenu_id).await?;
        self.trigger.submenu_deleted(menu_id, submenu_id).await;
        self.trigger.spawn_refresh(EventKind::SubMenuDeleted {
            menu_id,
            submenu_id,
        });
        Ok(())
    }

    async fn ensure_chained(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<(), CatalogError> {
        match self.submenus.find_submenu(submenu_id).await? {
            Some(record) if record.menu_id == menu_id => Ok(()),
            _ => Err(CatalogError::not_found(EntityKind::SubMenu)),
        }
    }
}

//! Dish orchestration.
//!
//! Dishes are leaves, so responses are plain records with no derived
//! counters. Reads and writes still validate the full menu to submenu
//! chain from the request path before touching anything.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::CatalogError;
use crate::application::repos::{
    CreateDishParams, DishesRepo, MenusRepo, SubMenusRepo, UpdateDishParams,
};
use crate::cache::{CacheLayer, CacheTrigger, EventKind};
use crate::domain::entities::{DishRecord, EntityKind};

pub struct DishService {
    menus: Arc<dyn MenusRepo>,
    submenus: Arc<dyn SubMenusRepo>,
    dishes: Arc<dyn DishesRepo>,
    cache: Arc<CacheLayer>,
    trigger: Arc<CacheTrigger>,
}

impl DishService {
    pub fn new(
        menus: Arc<dyn MenusRepo>,
        submenus: Arc<dyn SubMenusRepo>,
        dishes: Arc<dyn DishesRepo>,
        cache: Arc<CacheLayer>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            menus,
            submenus,
            dishes,
            cache,
            trigger,
        }
    }

    /// Lists dishes of one submenu. A missing or mischained parent
    /// yields an empty list that is never cached.
    pub async fn list(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Vec<DishRecord>, CatalogError> {
        if let Some(records) = self.cache.dish_list(menu_id, submenu_id).await {
            return Ok(records);
        }

        match self.submenus.find_submenu(submenu_id).await? {
            Some(parent) if parent.menu_id == menu_id => {}
            _ => return Ok(Vec::new()),
        }

        let records = self.dishes.list_dishes(submenu_id).await?;
        self.cache
            .set_dish_list(menu_id, submenu_id, &records)
            .await;
        Ok(records)
    }

    pub async fn get(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<DishRecord, CatalogError> {
        if let Some(record) = self.cache.dish(menu_id, submenu_id, dish_id).await {
            return Ok(record);
        }

        let record = self.find_chained(menu_id, submenu_id, dish_id).await?;
        self.cache.set_dish(menu_id, &record).await;
        Ok(record)
    }

    pub async fn create(
        &self,
        menu_id: Uuid,
        params: CreateDishParams,
    ) -> Result<DishRecord, CatalogError> {
        if self.menus.find_menu(menu_id).await?.is_none() {
            return Err(CatalogError::not_found(EntityKind::Menu));
        }
        match self.submenus.find_submenu(params.submenu_id).await? {
            Some(parent) if parent.menu_id == menu_id => {}
            _ => return Err(CatalogError::not_found(EntityKind::SubMenu)),
        }

        let record = self
            .dishes
            .create_dish(params)
            .await
            .map_err(|err| CatalogError::from_repo_for(EntityKind::Dish, err))?;

        self.trigger
            .dish_upserted(menu_id, record.submenu_id, record.id)
            .await;
        self.trigger.spawn_refresh(EventKind::DishUpserted {
            menu_id,
            submenu_id: record.submenu_id,
            dish_id: record.id,
        });
        Ok(record)
    }

    pub async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        params: UpdateDishParams,
    ) -> Result<DishRecord, CatalogError> {
        let dish_id = params.id;
        self.find_chained(menu_id, submenu_id, dish_id).await?;

        let Some(record) = self
            .dishes
            .update_dish(params)
            .await
            .map_err(|err| CatalogError::from_repo_for(EntityKind::Dish, err))?
        else {
            return Err(CatalogError::not_found(EntityKind::Dish));
        };

        self.trigger
            .dish_upserted(menu_id, submenu_id, dish_id)
            .await;
        self.trigger.spawn_refresh(EventKind::DishUpserted {
            menu_id,
            submenu_id,
            dish_id,
        });
        Ok(record)
    }

    pub async fn delete(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<(), CatalogError> {
        self.find_chained(menu_id, submenu_id, dish_id).await?;

        self.dishes.delete_dish(dish_id).await?;
        self.trigger
            .dish_deleted(menu_id, submenu_id, dish_id)
            .await;
        self.trigger.spawn_refresh(EventKind::DishDeleted {
            menu_id,
            submenu_id,
            dish_id,
        });
        Ok(())
    }

    /// Loads a dish and verifies it hangs off the addressed submenu,
    /// which in turn must hang off the addressed menu.
    async fn find_chained(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<DishRecord, CatalogError> {
        let Some(record) = self.dishes.find_dish(dish_id).await? else {
            return Err(CatalogError::not_found(EntityKind::Dish));
        };
        if record.submenu_id != submenu_id {
            return Err(CatalogError::not_found(EntityKind::Dish));
        }
        match self.submenus.find_submenu(submenu_id).await? {
            Some(parent) if parent.menu_id == menu_id => Ok(record),
            _ => Err(CatalogError::not_found(EntityKind::Dish)),
        }
    }
}

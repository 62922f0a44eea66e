//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{DishRecord, MenuRecord, SubMenuRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateMenuParams {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateMenuParams {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateSubMenuParams {
    pub title: String,
    pub description: Option<String>,
    pub menu_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct UpdateSubMenuParams {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateDishParams {
    pub title: String,
    pub description: Option<String>,
    pub price: String,
    pub discount: Option<i32>,
    pub submenu_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct UpdateDishParams {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub discount: Option<i32>,
}

#[async_trait]
pub trait MenusRepo: Send + Sync {
    async fn create_menu(&self, params: CreateMenuParams) -> Result<MenuRecord, RepoError>;

    async fn find_menu(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError>;

    /// All menus ordered by id.
    async fn list_menus(&self) -> Result<Vec<MenuRecord>, RepoError>;

    /// Applies only the fields present in `params`; `None` on a missing id.
    async fn update_menu(&self, params: UpdateMenuParams)
    -> Result<Option<MenuRecord>, RepoError>;

    /// Removes the menu and, through the schema cascade, its whole subtree.
    async fn delete_menu(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait SubMenusRepo: Send + Sync {
    async fn create_submenu(&self, params: CreateSubMenuParams)
    -> Result<SubMenuRecord, RepoError>;

    async fn find_submenu(&self, id: Uuid) -> Result<Option<SubMenuRecord>, RepoError>;

    /// Submenus belonging to one menu, ordered by id.
    async fn list_submenus(&self, menu_id: Uuid) -> Result<Vec<SubMenuRecord>, RepoError>;

    /// Every submenu in the store, ordered by id. Used for snapshot assembly.
    async fn list_all_submenus(&self) -> Result<Vec<SubMenuRecord>, RepoError>;

    async fn update_submenu(
        &self,
        params: UpdateSubMenuParams,
    ) -> Result<Option<SubMenuRecord>, RepoError>;

    async fn delete_submenu(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait DishesRepo: Send + Sync {
    async fn create_dish(&self, params: CreateDishParams) -> Result<DishRecord, RepoError>;

    async fn find_dish(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError>;

    /// Dishes belonging to one submenu, ordered by id.
    async fn list_dishes(&self, submenu_id: Uuid) -> Result<Vec<DishRecord>, RepoError>;

    /// Every dish in the store, ordered by id. Used for snapshot assembly.
    async fn list_all_dishes(&self) -> Result<Vec<DishRecord>, RepoError>;

    async fn update_dish(&self, params: UpdateDishParams)
    -> Result<Option<DishRecord>, RepoError>;

    async fn delete_dish(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Per-menu counter row produced by the grouped list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCountsRow {
    pub menu_id: Uuid,
    pub submenus_count: i64,
    pub dishes_count: i64,
}

/// Per-submenu counter row produced by the grouped list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubMenuCountsRow {
    pub submenu_id: Uuid,
    pub dishes_count: i64,
}

/// Live aggregate counters over the catalog hierarchy.
///
/// Counters are always computed against current rows; they are never read
/// back from a stored column. An unknown id yields zero, not an error.
#[async_trait]
pub trait AggregateCountsRepo: Send + Sync {
    /// Number of submenus directly under a menu.
    async fn count_submenus(&self, menu_id: Uuid) -> Result<i64, RepoError>;

    /// Number of dishes directly under a submenu.
    async fn count_dishes_in_submenu(&self, submenu_id: Uuid) -> Result<i64, RepoError>;

    /// Number of dishes in a menu's whole subtree.
    async fn count_dishes_in_menu(&self, menu_id: Uuid) -> Result<i64, RepoError>;

    /// Both counters for every menu, one grouped query.
    async fn menu_count_rows(&self) -> Result<Vec<MenuCountsRow>, RepoError>;

    /// Dish counters for every submenu of one menu, one grouped query.
    async fn submenu_count_rows(&self, menu_id: Uuid) -> Result<Vec<SubMenuCountsRow>, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn health_check(&self) -> Result<(), RepoError>;
}

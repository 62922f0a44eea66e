//! Read-model assembly for the catalog.
//!
//! Composes store rows with live aggregate counters into the views the
//! HTTP surface returns and the cache stores. Counters are resolved here
//! on every assembly; nothing ever reads a persisted count.

use std::collections::HashMap;

use uuid::Uuid;

use crate::application::repos::{
    AggregateCountsRepo, DishesRepo, MenusRepo, RepoError, SubMenusRepo,
};
use crate::domain::entities::{
    DishRecord, MenuRecord, MenuTree, MenuView, SubMenuRecord, SubMenuTree, SubMenuView,
};

/// A just-created menu has no children yet; skip the counter queries.
pub fn menu_view_fresh(record: MenuRecord) -> MenuView {
    MenuView {
        id: record.id,
        title: record.title,
        description: record.description,
        submenus_count: 0,
        dishes_count: 0,
    }
}

/// A just-created submenu has no dishes yet.
pub fn submenu_view_fresh(record: SubMenuRecord) -> SubMenuView {
    SubMenuView {
        id: record.id,
        title: record.title,
        description: record.description,
        menu_id: record.menu_id,
        dishes_count: 0,
    }
}

/// Load one menu with both counters. `None` when the id is unknown.
pub async fn load_menu_view(
    menus: &dyn MenusRepo,
    counts: &dyn AggregateCountsRepo,
    id: Uuid,
) -> Result<Option<MenuView>, RepoError> {
    let Some(record) = menus.find_menu(id).await? else {
        return Ok(None);
    };
    let submenus_count = counts.count_submenus(id).await?;
    let dishes_count = counts.count_dishes_in_menu(id).await?;
    Ok(Some(MenuView {
        id: record.id,
        title: record.title,
        description: record.description,
        submenus_count,
        dishes_count,
    }))
}

/// Load every menu with counters resolved through one grouped query.
pub async fn load_menu_views(
    menus: &dyn MenusRepo,
    counts: &dyn AggregateCountsRepo,
) -> Result<Vec<MenuView>, RepoError> {
    let records = menus.list_menus().await?;
    let mut counters: HashMap<Uuid, (i64, i64)> = counts
        .menu_count_rows()
        .await?
        .into_iter()
        .map(|row| (row.menu_id, (row.submenus_count, row.dishes_count)))
        .collect();

    Ok(records
        .into_iter()
        .map(|record| {
            let (submenus_count, dishes_count) =
                counters.remove(&record.id).unwrap_or_default();
            MenuView {
                id: record.id,
                title: record.title,
                description: record.description,
                submenus_count,
                dishes_count,
            }
        })
        .collect())
}

/// Load one submenu with its dish counter.
///
/// The submenu must actually hang under `menu_id`; a mismatched chain
/// reads as absent so it is never cached under a non-canonical key.
pub async fn load_submenu_view(
    submenus: &dyn SubMenusRepo,
    counts: &dyn AggregateCountsRepo,
    menu_id: Uuid,
    submenu_id: Uuid,
) -> Result<Option<SubMenuView>, RepoError> {
    let Some(record) = submenus.find_submenu(submenu_id).await? else {
        return Ok(None);
    };
    if record.menu_id != menu_id {
        return Ok(None);
    }
    let dishes_count = counts.count_dishes_in_submenu(submenu_id).await?;
    Ok(Some(SubMenuView {
        id: record.id,
        title: record.title,
        description: record.description,
        menu_id: record.menu_id,
        dishes_count,
    }))
}

/// Load one menu's submenus with dish counters from one grouped query.
pub async fn load_submenu_views(
    submenus: &dyn SubMenusRepo,
    counts: &dyn AggregateCountsRepo,
    menu_id: Uuid,
) -> Result<Vec<SubMenuView>, RepoError> {
    let records = submenus.list_submenus(menu_id).await?;
    let mut counters: HashMap<Uuid, i64> = counts
        .submenu_count_rows(menu_id)
        .await?
        .into_iter()
        .map(|row| (row.submenu_id, row.dishes_count))
        .collect();

    Ok(records
        .into_iter()
        .map(|record| {
            let dishes_count = counters.remove(&record.id).unwrap_or_default();
            SubMenuView {
                id: record.id,
                title: record.title,
                description: record.description,
                menu_id: record.menu_id,
                dishes_count,
            }
        })
        .collect())
}

/// Assemble the full nested snapshot from three ordered list queries.
///
/// Grouping happens here rather than in SQL; each level keeps the store's
/// id ordering and the counters are the grouped children's lengths.
pub async fn load_menu_tree(
    menus: &dyn MenusRepo,
    submenus: &dyn SubMenusRepo,
    dishes: &dyn DishesRepo,
) -> Result<Vec<MenuTree>, RepoError> {
    let menu_records = menus.list_menus().await?;
    let submenu_records = submenus.list_all_submenus().await?;
    let dish_records = dishes.list_all_dishes().await?;

    let mut dishes_by_submenu: HashMap<Uuid, Vec<DishRecord>> = HashMap::new();
    for dish in dish_records {
        dishes_by_submenu.entry(dish.submenu_id).or_default().push(dish);
    }

    let mut submenus_by_menu: HashMap<Uuid, Vec<SubMenuRecord>> = HashMap::new();
    for submenu in submenu_records {
        submenus_by_menu
            .entry(submenu.menu_id)
            .or_default()
            .push(submenu);
    }

    Ok(menu_records
        .into_iter()
        .map(|menu| {
            let submenus: Vec<SubMenuTree> = submenus_by_menu
                .remove(&menu.id)
                .unwrap_or_default()
                .into_iter()
                .map(|submenu| {
                    let dishes = dishes_by_submenu.remove(&submenu.id).unwrap_or_default();
                    SubMenuTree {
                        id: submenu.id,
                        title: submenu.title,
                        description: submenu.description,
                        menu_id: submenu.menu_id,
                        dishes_count: dishes.len() as i64,
                        dishes,
                    }
                })
                .collect();
            let dishes_count = submenus.iter().map(|s| s.dishes_count).sum();
            MenuTree {
                id: menu.id,
                title: menu.title,
                description: menu.description,
                submenus_count: submenus.len() as i64,
                dishes_count,
                submenus,
            }
        })
        .collect())
}

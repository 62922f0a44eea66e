//! Domain entities mirrored from persistent storage.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entity kinds, ordered parent to child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Menu,
    SubMenu,
    Dish,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Menu => f.write_str("menu"),
            Self::SubMenu => f.write_str("submenu"),
            Self::Dish => f.write_str("dish"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMenuRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub menu_id: Uuid,
}

/// Price stays textual so values round-trip exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: String,
    pub discount: i32,
    pub submenu_id: Uuid,
}

/// Menu read model with live aggregate counters.
///
/// The counters are never persisted; they are resolved against the store
/// at assembly time and frozen into whatever cache entry holds this view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub submenus_count: i64,
    pub dishes_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMenuView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub menu_id: Uuid,
    pub dishes_count: i64,
}

/// Full catalog snapshot: every menu with its submenus and their dishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTree {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub submenus_count: i64,
    pub dishes_count: i64,
    pub submenus: Vec<SubMenuTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMenuTree {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub menu_id: Uuid,
    pub dishes_count: i64,
    pub dishes: Vec<DishRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_renders_lowercase() {
        assert_eq!(EntityKind::Menu.to_string(), "menu");
        assert_eq!(EntityKind::SubMenu.to_string(), "submenu");
        assert_eq!(EntityKind::Dish.to_string(), "dish");
    }

    #[test]
    fn menu_view_round_trips_through_json() {
        let view = MenuView {
            id: Uuid::new_v4(),
            title: "Seasonal".to_string(),
            description: None,
            submenus_count: 2,
            dishes_count: 5,
        };
        let encoded = serde_json::to_vec(&view).unwrap();
        let decoded: MenuView = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, view);
    }
}

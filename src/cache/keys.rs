//! Cache key definitions.
//!
//! Keys render as URL-shaped strings mirroring the catalog hierarchy, so a
//! prefix sweep over one entity's key removes its whole cached subtree.

use std::fmt;

use uuid::Uuid;

/// Typed cache key for catalog entries.
///
/// Uuids render in their canonical 36-character form, so no rendered id is
/// ever a prefix of another and item-level sweeps cannot bleed into
/// sibling entries. The bare `menus` collection key is never used as a
/// sweep prefix; sweeps always carry at least one id segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Menu collection listing.
    MenuList,
    /// A single menu with its counters.
    Menu(Uuid),
    /// Submenu collection under a menu.
    SubMenuList(Uuid),
    /// A single submenu with its dish counter.
    SubMenu { menu_id: Uuid, submenu_id: Uuid },
    /// Dish collection under a submenu.
    DishList { menu_id: Uuid, submenu_id: Uuid },
    /// A single dish.
    Dish {
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    },
    /// Full nested catalog snapshot.
    Tree,
}

impl CacheKey {
    /// Render the key into its canonical storage form.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MenuList => f.write_str("menus"),
            Self::Menu(menu_id) => write!(f, "menus/{menu_id}"),
            Self::SubMenuList(menu_id) => write!(f, "menus/{menu_id}/submenus"),
            Self::SubMenu {
                menu_id,
                submenu_id,
            } => write!(f, "menus/{menu_id}/submenus/{submenu_id}"),
            Self::DishList {
                menu_id,
                submenu_id,
            } => write!(f, "menus/{menu_id}/submenus/{submenu_id}/dishes"),
            Self::Dish {
                menu_id,
                submenu_id,
                dish_id,
            } => write!(f, "menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"),
            Self::Tree => f.write_str("tree"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(byte: u8) -> Uuid {
        Uuid::from_bytes([byte; 16])
    }

    #[test]
    fn keys_render_url_shaped() {
        let m = uuid(1);
        let s = uuid(2);
        let d = uuid(3);

        assert_eq!(CacheKey::MenuList.render(), "menus");
        assert_eq!(CacheKey::Menu(m).render(), format!("menus/{m}"));
        assert_eq!(
            CacheKey::SubMenuList(m).render(),
            format!("menus/{m}/submenus")
        );
        assert_eq!(
            CacheKey::SubMenu {
                menu_id: m,
                submenu_id: s
            }
            .render(),
            format!("menus/{m}/submenus/{s}")
        );
        assert_eq!(
            CacheKey::DishList {
                menu_id: m,
                submenu_id: s
            }
            .render(),
            format!("menus/{m}/submenus/{s}/dishes")
        );
        assert_eq!(
            CacheKey::Dish {
                menu_id: m,
                submenu_id: s,
                dish_id: d
            }
            .render(),
            format!("menus/{m}/submenus/{s}/dishes/{d}")
        );
        assert_eq!(CacheKey::Tree.render(), "tree");
    }

    #[test]
    fn distinct_entities_render_distinct_keys() {
        let keys = [
            CacheKey::MenuList.render(),
            CacheKey::Menu(uuid(1)).render(),
            CacheKey::Menu(uuid(2)).render(),
            CacheKey::SubMenuList(uuid(1)).render(),
            CacheKey::SubMenu {
                menu_id: uuid(1),
                submenu_id: uuid(2),
            }
            .render(),
            CacheKey::Tree.render(),
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn menu_item_sweep_covers_its_subtree_only() {
        let m1 = uuid(1);
        let m2 = uuid(2);
        let prefix = CacheKey::Menu(m1).render();

        assert!(CacheKey::SubMenuList(m1).render().starts_with(&prefix));
        assert!(
            CacheKey::Dish {
                menu_id: m1,
                submenu_id: uuid(3),
                dish_id: uuid(4),
            }
            .render()
            .starts_with(&prefix)
        );

        assert!(!CacheKey::Menu(m2).render().starts_with(&prefix));
        assert!(!CacheKey::MenuList.render().starts_with(&prefix));
        assert!(!CacheKey::Tree.render().starts_with(&prefix));
    }

    #[test]
    fn submenu_sweep_does_not_touch_siblings() {
        let m = uuid(1);
        let prefix = CacheKey::SubMenu {
            menu_id: m,
            submenu_id: uuid(2),
        }
        .render();

        let sibling = CacheKey::SubMenu {
            menu_id: m,
            submenu_id: uuid(3),
        }
        .render();
        let parent_list = CacheKey::SubMenuList(m).render();

        assert!(!sibling.starts_with(&prefix));
        assert!(!parent_list.starts_with(&prefix));
    }

    #[test]
    fn fixed_width_ids_prevent_prefix_collisions() {
        // Every rendered UUID is exactly 36 characters, so one id can never
        // be a textual prefix of a different id.
        let rendered = uuid(7).to_string();
        assert_eq!(rendered.len(), 36);
    }
}

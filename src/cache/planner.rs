//! Folds drained invalidation events into a single consumption plan.

use std::collections::{HashMap, HashSet};
use std::fmt;

use uuid::Uuid;

use super::events::{CacheEvent, EventKind};
use super::keys::CacheKey;

/// What the consumer must do to bring the cache back in line.
///
/// Invalidation is conservative: a mutation anywhere in the hierarchy drops
/// every cached aggregate that embeds the affected counters. Warming is
/// narrow: only the mutated entity's own item key is repopulated; collections
/// and the snapshot refill lazily on the next read.
#[derive(Debug, Default)]
pub struct ConsumptionPlan {
    /// Item-level prefixes to sweep (the key itself plus its subtree).
    pub sweep_prefixes: HashSet<CacheKey>,
    /// Exact keys to drop.
    pub drop_keys: HashSet<CacheKey>,

    /// Menus to warm by id.
    pub warm_menus: HashSet<Uuid>,
    /// Submenus to warm as (menu_id, submenu_id).
    pub warm_submenus: HashSet<(Uuid, Uuid)>,
    /// Dishes to warm as (menu_id, submenu_id, dish_id).
    pub warm_dishes: HashSet<(Uuid, Uuid, Uuid)>,
    /// Whether to warm the menu collection. Startup only.
    pub warm_menu_list: bool,
    /// Whether to warm the full catalog snapshot. Startup only.
    pub warm_tree: bool,
}

impl fmt::Display for ConsumptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConsumptionPlan {{ sweep: {}, drop: {}, warm_menus: {}, warm_submenus: {}, \
             warm_dishes: {}, warm_menu_list: {}, warm_tree: {} }}",
            self.sweep_prefixes.len(),
            self.drop_keys.len(),
            self.warm_menus.len(),
            self.warm_submenus.len(),
            self.warm_dishes.len(),
            self.warm_menu_list,
            self.warm_tree,
        )
    }
}

impl ConsumptionPlan {
    /// Folds a drained batch into one plan.
    ///
    /// Duplicate event ids collapse into a single occurrence, and when one
    /// entity appears several times only its highest epoch decides whether
    /// the entity gets warmed again or stays gone.
    pub fn from_events(events: Vec<CacheEvent>) -> Self {
        let mut plan = Self::default();
        let mut seen = HashSet::new();

        // Last writer per entity decides the warm action.
        let mut menu_epochs: HashMap<Uuid, (u64, EventKind)> = HashMap::new();
        let mut submenu_epochs: HashMap<Uuid, (u64, EventKind)> = HashMap::new();
        let mut dish_epochs: HashMap<Uuid, (u64, EventKind)> = HashMap::new();

        for event in events {
            if !seen.insert(event.id) {
                continue;
            }
            match &event.kind {
                EventKind::MenuUpserted { menu_id } | EventKind::MenuDeleted { menu_id } => {
                    keep_latest(&mut menu_epochs, *menu_id, event.epoch, event.kind);
                }
                EventKind::SubMenuUpserted { submenu_id, .. }
                | EventKind::SubMenuDeleted { submenu_id, .. } => {
                    keep_latest(&mut submenu_epochs, *submenu_id, event.epoch, event.kind);
                }
                EventKind::DishUpserted { dish_id, .. }
                | EventKind::DishDeleted { dish_id, .. } => {
                    keep_latest(&mut dish_epochs, *dish_id, event.epoch, event.kind);
                }
                EventKind::WarmupOnStartup => {
                    plan.warm_menu_list = true;
                    plan.warm_tree = true;
                }
            }
        }

        for (menu_id, (_, kind)) in menu_epochs {
            plan.sweep_prefixes.insert(CacheKey::Menu(menu_id));
            plan.drop_keys.insert(CacheKey::MenuList);
            plan.drop_keys.insert(CacheKey::Tree);
            if matches!(kind, EventKind::MenuUpserted { .. }) {
                plan.warm_menus.insert(menu_id);
            }
        }

        for (submenu_id, (_, kind)) in submenu_epochs {
            let (EventKind::SubMenuUpserted { menu_id, .. }
            | EventKind::SubMenuDeleted { menu_id, .. }) = kind
            else {
                continue;
            };
            plan.sweep_prefixes.insert(CacheKey::SubMenu {
                menu_id,
                submenu_id,
            });
            plan.drop_keys.insert(CacheKey::SubMenuList(menu_id));
            plan.drop_keys.insert(CacheKey::Menu(menu_id));
            plan.drop_keys.insert(CacheKey::MenuList);
            plan.drop_keys.insert(CacheKey::Tree);
            if matches!(kind, EventKind::SubMenuUpserted { .. }) {
                plan.warm_submenus.insert((menu_id, submenu_id));
            }
        }

        for (dish_id, (_, kind)) in dish_epochs {
            let (EventKind::DishUpserted {
                menu_id,
                submenu_id,
                ..
            }
            | EventKind::DishDeleted {
                menu_id,
                submenu_id,
                ..
            }) = kind
            else {
                continue;
            };
            plan.sweep_prefixes.insert(CacheKey::Dish {
                menu_id,
                submenu_id,
                dish_id,
            });
            plan.drop_keys.insert(CacheKey::DishList {
                menu_id,
                submenu_id,
            });
            plan.drop_keys.insert(CacheKey::SubMenu {
                menu_id,
                submenu_id,
            });
            plan.drop_keys.insert(CacheKey::SubMenuList(menu_id));
            plan.drop_keys.insert(CacheKey::Menu(menu_id));
            plan.drop_keys.insert(CacheKey::MenuList);
            plan.drop_keys.insert(CacheKey::Tree);
            if matches!(kind, EventKind::DishUpserted { .. }) {
                plan.warm_dishes.insert((menu_id, submenu_id, dish_id));
            }
        }

        plan
    }

    /// True when any key must be swept or dropped.
    pub fn has_invalidation(&self) -> bool {
        !self.sweep_prefixes.is_empty() || !self.drop_keys.is_empty()
    }

    /// True when at least one entity or collection should be rebuilt.
    pub fn has_warm_actions(&self) -> bool {
        !self.warm_menus.is_empty()
            || !self.warm_submenus.is_empty()
            || !self.warm_dishes.is_empty()
            || self.warm_menu_list
            || self.warm_tree
    }

    /// True when the batch produced no work at all.
    pub fn is_empty(&self) -> bool {
        !self.has_invalidation() && !self.has_warm_actions()
    }
}

fn keep_latest(
    epochs: &mut HashMap<Uuid, (u64, EventKind)>,
    entity_id: Uuid,
    epoch: u64,
    kind: EventKind,
) {
    epochs
        .entry(entity_id)
        .and_modify(|(e, k)| {
            if epoch > *e {
                *e = epoch;
                *k = kind;
            }
        })
        .or_insert((epoch, kind));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::events::CacheEvent;

    fn event(kind: EventKind, epoch: u64) -> CacheEvent {
        CacheEvent::new(kind, epoch)
    }

    #[test]
    fn menu_upsert_sweeps_subtree_and_drops_aggregates() {
        let menu_id = Uuid::new_v4();
        let plan = ConsumptionPlan::from_events(vec![event(EventKind::MenuUpserted { menu_id }, 0)]);

        assert!(plan.sweep_prefixes.contains(&CacheKey::Menu(menu_id)));
        assert!(plan.drop_keys.contains(&CacheKey::MenuList));
        assert!(plan.drop_keys.contains(&CacheKey::Tree));
        assert!(plan.warm_menus.contains(&menu_id));
    }

    #[test]
    fn menu_delete_does_not_warm_menu() {
        let menu_id = Uuid::new_v4();
        let plan = ConsumptionPlan::from_events(vec![event(EventKind::MenuDeleted { menu_id }, 0)]);

        assert!(plan.sweep_prefixes.contains(&CacheKey::Menu(menu_id)));
        assert!(!plan.warm_menus.contains(&menu_id));
    }

    #[test]
    fn submenu_upsert_reaches_every_ancestor_aggregate() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let plan = ConsumptionPlan::from_events(vec![event(
            EventKind::SubMenuUpserted {
                menu_id,
                submenu_id,
            },
            0,
        )]);

        assert!(plan.sweep_prefixes.contains(&CacheKey::SubMenu {
            menu_id,
            submenu_id
        }));
        assert!(plan.drop_keys.contains(&CacheKey::SubMenuList(menu_id)));
        assert!(plan.drop_keys.contains(&CacheKey::Menu(menu_id)));
        assert!(plan.drop_keys.contains(&CacheKey::MenuList));
        assert!(plan.drop_keys.contains(&CacheKey::Tree));
        assert!(plan.warm_submenus.contains(&(menu_id, submenu_id)));
        // The parent menu is dropped but not warmed; it refills on read.
        assert!(!plan.warm_menus.contains(&menu_id));
    }

    #[test]
    fn dish_upsert_reaches_every_ancestor_aggregate() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let dish_id = Uuid::new_v4();
        let plan = ConsumptionPlan::from_events(vec![event(
            EventKind::DishUpserted {
                menu_id,
                submenu_id,
                dish_id,
            },
            0,
        )]);

        assert!(plan.sweep_prefixes.contains(&CacheKey::Dish {
            menu_id,
            submenu_id,
            dish_id
        }));
        assert!(plan.drop_keys.contains(&CacheKey::DishList {
            menu_id,
            submenu_id
        }));
        assert!(plan.drop_keys.contains(&CacheKey::SubMenu {
            menu_id,
            submenu_id
        }));
        assert!(plan.drop_keys.contains(&CacheKey::SubMenuList(menu_id)));
        assert!(plan.drop_keys.contains(&CacheKey::Menu(menu_id)));
        assert!(plan.drop_keys.contains(&CacheKey::MenuList));
        assert!(plan.drop_keys.contains(&CacheKey::Tree));
        assert!(plan.warm_dishes.contains(&(menu_id, submenu_id, dish_id)));
    }

    #[test]
    fn sweeps_always_carry_an_id_segment() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let plan = ConsumptionPlan::from_events(vec![
            event(EventKind::MenuUpserted { menu_id }, 0),
            event(
                EventKind::SubMenuDeleted {
                    menu_id,
                    submenu_id,
                },
                1,
            ),
        ]);

        for prefix in &plan.sweep_prefixes {
            assert!(!matches!(prefix, CacheKey::MenuList | CacheKey::Tree));
        }
    }

    #[test]
    fn startup_event_warms_list_and_snapshot() {
        let plan = ConsumptionPlan::from_events(vec![event(EventKind::WarmupOnStartup, 0)]);

        assert!(plan.warm_menu_list);
        assert!(plan.warm_tree);
        assert!(!plan.has_invalidation());
    }

    #[test]
    fn a_republished_event_counts_once() {
        let menu_id = Uuid::new_v4();
        let first = event(EventKind::MenuUpserted { menu_id }, 0);

        let plan = ConsumptionPlan::from_events(vec![first.clone(), first]);

        assert_eq!(plan.warm_menus.len(), 1);
    }

    #[test]
    fn later_delete_overrides_earlier_upsert() {
        let menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let plan = ConsumptionPlan::from_events(vec![
            event(
                EventKind::SubMenuUpserted {
                    menu_id,
                    submenu_id,
                },
                0,
            ),
            event(
                EventKind::SubMenuDeleted {
                    menu_id,
                    submenu_id,
                },
                1,
            ),
        ]);

        // The deleted submenu must not come back through the warm phase.
        assert!(!plan.warm_submenus.contains(&(menu_id, submenu_id)));
        assert!(plan.sweep_prefixes.contains(&CacheKey::SubMenu {
            menu_id,
            submenu_id
        }));
    }

    #[test]
    fn display_summarizes_the_work() {
        let plan = ConsumptionPlan::default();
        let rendered = plan.to_string();
        assert!(rendered.contains("ConsumptionPlan"));
        assert!(rendered.contains("sweep: 0"));
    }

    #[test]
    fn empty_plan_reports_no_work() {
        assert!(ConsumptionPlan::default().is_empty());

        let plan = ConsumptionPlan::from_events(vec![event(
            EventKind::MenuDeleted {
                menu_id: Uuid::new_v4(),
            },
            0,
        )]);
        assert!(!plan.is_empty());
    }
}

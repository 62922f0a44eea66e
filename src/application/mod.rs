//! Application services layer.

pub mod dishes;
pub mod error;
pub mod menus;
pub mod repos;
pub mod submenus;
pub mod views;

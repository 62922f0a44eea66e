use serde::{Deserialize, Serialize};

use crate::domain::entities::EntityKind;

#[derive(Debug, Deserialize, Serialize)]
pub struct MenuCreateRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MenuUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubMenuCreateRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubMenuUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DishCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: String,
    pub discount: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DishUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub discount: Option<i32>,
}

/// Body returned by successful delete operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationStatus {
    pub status: bool,
    pub message: String,
}

impl OperationStatus {
    pub fn deleted(kind: EntityKind) -> Self {
        Self {
            status: true,
            message: format!("The {kind} has been deleted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_body_spells_out_the_kind() {
        let body = OperationStatus::deleted(EntityKind::SubMenu);
        assert!(body.status);
        assert_eq!(body.message, "The submenu has been deleted");
    }
}

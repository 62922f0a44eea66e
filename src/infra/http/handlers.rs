use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::error::{CatalogError, ErrorReport};
use crate::application::repos::{
    CreateDishParams, CreateMenuParams, CreateSubMenuParams, RepoError, UpdateDishParams,
    UpdateMenuParams, UpdateSubMenuParams,
};
use crate::domain::entities::EntityKind;

use super::AppState;
use super::error::{ApiError, codes};
use super::models::*;

// -------- Menus --------
pub async fn list_menus(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let views = state.menus.list().await.map_err(catalog_to_api)?;
    Ok(Json(views))
}

pub async fn create_menu(
    State(state): State<AppState>,
    Json(payload): Json<MenuCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .menus
        .create(CreateMenuParams {
            title: payload.title,
            description: payload.description,
        })
        .await
        .map_err(catalog_to_api)?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.menus.get(menu_id).await.map_err(catalog_to_api)?;
    Ok(Json(view))
}

pub async fn update_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    Json(payload): Json<MenuUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .menus
        .update(UpdateMenuParams {
            id: menu_id,
            title: payload.title,
            description: payload.description,
        })
        .await
        .map_err(catalog_to_api)?;

    Ok(Json(view))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.menus.delete(menu_id).await.map_err(catalog_to_api)?;
    Ok(Json(OperationStatus::deleted(EntityKind::Menu)))
}

/// Full nested snapshot: every menu with its submenus and their dishes.
pub async fn full_catalog(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tree = state.menus.full_tree().await.map_err(catalog_to_api)?;
    Ok(Json(tree))
}

// -------- Submenus --------
pub async fn list_submenus(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let views = state
        .submenus
        .list(menu_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(views))
}

pub async fn create_submenu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    Json(payload): Json<SubMenuCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .submenus
        .create(CreateSubMenuParams {
            title: payload.title,
            description: payload.description,
            menu_id,
        })
        .await
        .map_err(catalog_to_api)?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_submenu(
    State(state): State<AppState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .submenus
        .get(menu_id, submenu_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(view))
}

pub async fn update_submenu(
    State(state): State<AppState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubMenuUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .submenus
        .update(
            menu_id,
            UpdateSubMenuParams {
                id: submenu_id,
                title: payload.title,
                description: payload.description,
            },
        )
        .await
        .map_err(catalog_to_api)?;

    Ok(Json(view))
}

pub async fn delete_submenu(
    State(state): State<AppState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .submenus
        .delete(menu_id, submenu_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(OperationStatus::deleted(EntityKind::SubMenu)))
}

// -------- Dishes --------
pub async fn list_dishes(
    State(state): State<AppState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .dishes
        .list(menu_id, submenu_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(records))
}

pub async fn create_dish(
    State(state): State<AppState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DishCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .dishes
        .create(
            menu_id,
            CreateDishParams {
                title: payload.title,
                description: payload.description,
                price: payload.price,
                discount: payload.discount,
                submenu_id,
            },
        )
        .await
        .map_err(catalog_to_api)?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_dish(
    State(state): State<AppState>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .dishes
        .get(menu_id, submenu_id, dish_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(record))
}

pub async fn update_dish(
    State(state): State<AppState>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<DishUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .dishes
        .update(
            menu_id,
            submenu_id,
            UpdateDishParams {
                id: dish_id,
                title: payload.title,
                description: payload.description,
                price: payload.price,
                discount: payload.discount,
            },
        )
        .await
        .map_err(catalog_to_api)?;

    Ok(Json(record))
}

pub async fn delete_dish(
    State(state): State<AppState>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .dishes
        .delete(menu_id, submenu_id, dish_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(OperationStatus::deleted(EntityKind::Dish)))
}

// -------- Health --------
pub async fn health(State(state): State<AppState>) -> Response {
    match state.health.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

// -------- Helper conversions --------
fn catalog_to_api(err: CatalogError) -> ApiError {
    match err {
        CatalogError::NotFound { kind } => ApiError::not_found(match kind {
            EntityKind::Menu => "menu not found",
            EntityKind::SubMenu => "submenu not found",
            EntityKind::Dish => "dish not found",
        }),
        CatalogError::AlreadyExists { kind } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::DUPLICATE,
            match kind {
                EntityKind::Menu => "menu already exists",
                EntityKind::SubMenu => "submenu already exists",
                EntityKind::Dish => "dish already exists",
            },
            None,
        ),
        CatalogError::Repo(repo) => repo_to_api(repo),
    }
}

fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

//! Aggregate counter queries.
//!
//! Every counter is computed from current rows at call time. The scalar
//! forms back single-entity views; the grouped forms back list views so a
//! listing never issues one count query per row.

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{
    AggregateCountsRepo, MenuCountsRow, RepoError, SubMenuCountsRow,
};

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct MenuCountsDbRow {
    menu_id: Uuid,
    submenus_count: i64,
    dishes_count: i64,
}

#[derive(sqlx::FromRow)]
struct SubMenuCountsDbRow {
    submenu_id: Uuid,
    dishes_count: i64,
}

#[async_trait]
impl AggregateCountsRepo for PostgresRepositories {
    async fn count_submenus(&self, menu_id: Uuid) -> Result<i64, RepoError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submenus WHERE menu_id = $1")
            .bind(menu_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_dishes_in_submenu(&self, submenu_id: Uuid) -> Result<i64, RepoError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dishes WHERE submenu_id = $1")
            .bind(submenu_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_dishes_in_menu(&self, menu_id: Uuid) -> Result<i64, RepoError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(d.id)
            FROM dishes d
            INNER JOIN submenus s ON s.id = d.submenu_id
            WHERE s.menu_id = $1
            "#,
        )
        .bind(menu_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn menu_count_rows(&self) -> Result<Vec<MenuCountsRow>, RepoError> {
        let rows: Vec<MenuCountsDbRow> = sqlx::query_as::<_, MenuCountsDbRow>(
            r#"
            SELECT m.id AS menu_id,
                   COUNT(DISTINCT s.id) AS submenus_count,
                   COUNT(DISTINCT d.id) AS dishes_count
            FROM menus m
            LEFT JOIN submenus s ON s.menu_id = m.id
            LEFT JOIN dishes d ON d.submenu_id = s.id
            GROUP BY m.id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| MenuCountsRow {
                menu_id: row.menu_id,
                submenus_count: row.submenus_count,
                dishes_count: row.dishes_count,
            })
            .collect())
    }

    async fn submenu_count_rows(&self, menu_id: Uuid) -> Result<Vec<SubMenuCountsRow>, RepoError> {
        let rows: Vec<SubMenuCountsDbRow> = sqlx::query_as::<_, SubMenuCountsDbRow>(
            r#"
            SELECT s.id AS submenu_id,
                   COUNT(d.id) AS dishes_count
            FROM submenus s
            LEFT JOIN dishes d ON d.submenu_id = s.id
            WHERE s.menu_id = $1
            GROUP BY s.id
            "#,
        )
        .bind(menu_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| SubMenuCountsRow {
                submenu_id: row.submenu_id,
                dishes_count: row.dishes_count,
            })
            .collect())
    }
}

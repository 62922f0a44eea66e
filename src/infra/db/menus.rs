use async_trait::async_trait;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::application::repos::{CreateMenuParams, MenusRepo, RepoError, UpdateMenuParams};
use crate::domain::entities::MenuRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: Uuid,
    title: String,
    description: Option<String>,
}

impl From<MenuRow> for MenuRecord {
    fn from(row: MenuRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
        }
    }
}

#[async_trait]
impl MenusRepo for PostgresRepositories {
    async fn create_menu(&self, params: CreateMenuParams) -> Result<MenuRecord, RepoError> {
        let CreateMenuParams { title, description } = params;

        let row: MenuRow = sqlx::query_as::<_, MenuRow>(
            r#"
            INSERT INTO menus (id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(MenuRecord::from(row))
    }

    async fn find_menu(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError> {
        let row: Option<MenuRow> = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT id, title, description
            FROM menus
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(MenuRecord::from))
    }

    async fn list_menus(&self) -> Result<Vec<MenuRecord>, RepoError> {
        let rows: Vec<MenuRow> = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT id, title, description
            FROM menus
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MenuRecord::from).collect())
    }

    async fn update_menu(
        &self,
        params: UpdateMenuParams,
    ) -> Result<Option<MenuRecord>, RepoError> {
        let UpdateMenuParams {
            id,
            title,
            description,
        } = params;

        if title.is_none() && description.is_none() {
            return self.find_menu(id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE menus SET ");
        let mut assignments = qb.separated(", ");
        if let Some(title) = title {
            assignments.push("title = ");
            assignments.push_bind_unseparated(title);
        }
        if let Some(description) = description {
            assignments.push("description = ");
            assignments.push_bind_unseparated(description);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING id, title, description");

        let row: Option<MenuRow> = qb
            .build_query_as::<MenuRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(MenuRecord::from))
    }

    async fn delete_menu(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

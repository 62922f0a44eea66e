use async_trait::async_trait;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::application::repos::{
    CreateSubMenuParams, RepoError, SubMenusRepo, UpdateSubMenuParams,
};
use crate::domain::entities::SubMenuRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct SubMenuRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    menu_id: Uuid,
}

impl From<SubMenuRow> for SubMenuRecord {
    fn from(row: SubMenuRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            menu_id: row.menu_id,
        }
    }
}

#[async_trait]
impl SubMenusRepo for PostgresRepositories {
    async fn create_submenu(
        &self,
        params: CreateSubMenuParams,
    ) -> Result<SubMenuRecord, RepoError> {
        let CreateSubMenuParams {
            title,
            description,
            menu_id,
        } = params;

        let row: SubMenuRow = sqlx::query_as::<_, SubMenuRow>(
            r#"
            INSERT INTO submenus (id, title, description, menu_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, menu_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .bind(menu_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(SubMenuRecord::from(row))
    }

    async fn find_submenu(&self, id: Uuid) -> Result<Option<SubMenuRecord>, RepoError> {
        let row: Option<SubMenuRow> = sqlx::query_as::<_, SubMenuRow>(
            r#"
            SELECT id, title, description, menu_id
            FROM submenus
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SubMenuRecord::from))
    }

    async fn list_submenus(&self, menu_id: Uuid) -> Result<Vec<SubMenuRecord>, RepoError> {
        let rows: Vec<SubMenuRow> = sqlx::query_as::<_, SubMenuRow>(
            r#"
            SELECT id, title, description, menu_id
            FROM submenus
            WHERE menu_id = $1
            ORDER BY id
            "#,
        )
        .bind(menu_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SubMenuRecord::from).collect())
    }

    async fn list_all_submenus(&self) -> Result<Vec<SubMenuRecord>, RepoError> {
        let rows: Vec<SubMenuRow> = sqlx::query_as::<_, SubMenuRow>(
            r#"
            SELECT id, title, description, menu_id
            FROM submenus
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SubMenuRecord::from).collect())
    }

    async fn update_submenu(
        &self,
        params: UpdateSubMenuParams,
    ) -> Result<Option<SubMenuRecord>, RepoError> {
        let UpdateSubMenuParams {
            id,
            title,
            description,
        } = params;

        if title.is_none() && description.is_none() {
            return self.find_submenu(id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE submenus SET ");
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
        qb.push(" RETURNING id, title, description, menu_id");

        let row: Option<SubMenuRow> = qb
            .build_query_as::<SubMenuRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(SubMenuRecord::from))
    }

    async fn delete_submenu(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM submenus WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

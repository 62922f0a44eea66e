use async_trait::async_trait;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::application::repos::{CreateDishParams, DishesRepo, RepoError, UpdateDishParams};
use crate::domain::entities::DishRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct DishRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: String,
    discount: i32,
    submenu_id: Uuid,
}

impl From<DishRow> for DishRecord {
    fn from(row: DishRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            discount: row.discount,
            submenu_id: row.submenu_id,
        }
    }
}

#[async_trait]
impl DishesRepo for PostgresRepositories {
    async fn create_dish(&self, params: CreateDishParams) -> Result<DishRecord, RepoError> {
        let CreateDishParams {
            title,
            description,
            price,
            discount,
            submenu_id,
        } = params;

        let row: DishRow = sqlx::query_as::<_, DishRow>(
            r#"
            INSERT INTO dishes (id, title, description, price, discount, submenu_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, price, discount, submenu_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(discount.unwrap_or(0))
        .bind(submenu_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(DishRecord::from(row))
    }

    async fn find_dish(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError> {
        let row: Option<DishRow> = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT id, title, description, price, discount, submenu_id
            FROM dishes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(DishRecord::from))
    }

    async fn list_dishes(&self, submenu_id: Uuid) -> Result<Vec<DishRecord>, RepoError> {
        let rows: Vec<DishRow> = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT id, title, description, price, discount, submenu_id
            FROM dishes
            WHERE submenu_id = $1
            ORDER BY id
            "#,
        )
        .bind(submenu_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DishRecord::from).collect())
    }

    async fn list_all_dishes(&self) -> Result<Vec<DishRecord>, RepoError> {
        let rows: Vec<DishRow> = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT id, title, description, price, discount, submenu_id
            FROM dishes
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DishRecord::from).collect())
    }

    async fn update_dish(
        &self,
        params: UpdateDishParams,
    ) -> Result<Option<DishRecord>, RepoError> {
        let UpdateDishParams {
            id,
            title,
            description,
            price,
            discount,
        } = params;

        if title.is_none() && description.is_none() && price.is_none() && discount.is_none() {
            return self.find_dish(id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE dishes SET ");
        let mut assignments = qb.separated(", ");
        if let Some(title) = title {
            assignments.push("title = ");
            assignments.push_bind_unseparated(title);
        }
        if let Some(description) = description {
            assignments.push("description = ");
            assignments.push_bind_unseparated(description);
        }
        if let Some(price) = price {
            assignments.push("price = ");
            assignments.push_bind_unseparated(price);
        }
        if let Some(discount) = discount {
            assignments.push("discount = ");
            assignments.push_bind_unseparated(discount);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING id, title, description, price, discount, submenu_id");

        let row: Option<DishRow> = qb
            .build_query_as::<DishRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(DishRecord::from))
    }

    async fn delete_dish(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

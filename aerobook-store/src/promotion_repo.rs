use aerobook_core::promotion::Promotion;
use aerobook_core::repository::{PromotionRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{backend, on_insert};

pub struct PostgresPromotionRepository {
    pool: PgPool,
}

impl PostgresPromotionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PromotionRow {
    id: Uuid,
    title: String,
    description: String,
    discount: String,
    valid_until: DateTime<Utc>,
    bg_color: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<PromotionRow> for Promotion {
    fn from(row: PromotionRow) -> Self {
        Promotion {
            id: row.id,
            title: row.title,
            description: row.description,
            discount: row.discount,
            valid_until: row.valid_until,
            bg_color: row.bg_color,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PromotionRepository for PostgresPromotionRepository {
    async fn list_promotions(&self, active_only: bool) -> RepositoryResult<Vec<Promotion>> {
        let rows: Vec<PromotionRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, discount, valid_until, bg_color, is_active, created_at
            FROM promotions
            WHERE ($1 = FALSE OR is_active)
            ORDER BY created_at DESC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Promotion::from).collect())
    }

    async fn get_promotion(&self, id: Uuid) -> RepositoryResult<Option<Promotion>> {
        let row: Option<PromotionRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, discount, valid_until, bg_color, is_active, created_at
            FROM promotions WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Promotion::from))
    }

    async fn create_promotion(&self, promotion: &Promotion) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO promotions (id, title, description, discount, valid_until, bg_color, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(promotion.id)
        .bind(&promotion.title)
        .bind(&promotion.description)
        .bind(&promotion.discount)
        .bind(promotion.valid_until)
        .bind(&promotion.bg_color)
        .bind(promotion.is_active)
        .bind(promotion.created_at)
        .execute(&self.pool)
        .await
        .map_err(on_insert("id"))?;

        Ok(())
    }

    async fn update_promotion(&self, promotion: &Promotion) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE promotions
            SET title = $2, description = $3, discount = $4, valid_until = $5, bg_color = $6, is_active = $7
            WHERE id = $1
            "#,
        )
        .bind(promotion.id)
        .bind(&promotion.title)
        .bind(&promotion.description)
        .bind(&promotion.discount)
        .bind(promotion.valid_until)
        .bind(&promotion.bg_color)
        .bind(promotion.is_active)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Offer".to_string()));
        }
        Ok(())
    }

    async fn delete_promotion(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use sqlx::PgExecutor;

use crate::{
    categories::repo_types::{Category, CategoryPatch, NewCategory},
    db::PgStore,
    store::{is_foreign_key_violation, CategoryStore, StoreError, StoreResult},
    transactions::repo_types::TransactionType,
};

#[async_trait]
impl CategoryStore for PgStore {
    async fn create_category(&self, user_id: i64, new: NewCategory) -> StoreResult<Category> {
        insert_category(&self.pool, user_id, &new).await
    }

    async fn list_categories(
        &self,
        user_id: i64,
        kind: Option<TransactionType>,
    ) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, kind, color, icon, created_at
            FROM categories
            WHERE user_id = $1 AND ($2::transaction_type IS NULL OR kind = $2)
            ORDER BY kind, id
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_category(&self, user_id: i64, id: i64) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, kind, color, icon, created_at
            FROM categories
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_category(
        &self,
        user_id: i64,
        id: i64,
        patch: CategoryPatch,
    ) -> StoreResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name  = COALESCE($3, name),
                color = COALESCE($4, color),
                icon  = COALESCE($5, icon)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, kind, color, icon, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(patch.name)
        .bind(patch.color)
        .bind(patch.icon)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(StoreError::NotFound)
    }

    async fn delete_category(&self, user_id: i64, id: i64) -> StoreResult<()> {
        let result = sqlx::query(r#"DELETE FROM categories WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::still_referenced()
                } else {
                    e.into()
                }
            })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn seed_default_categories(
        &self,
        user_id: i64,
        defaults: &[NewCategory],
    ) -> StoreResult<Vec<Category>> {
        let mut tx = self.pool.begin().await?;

        // serialize concurrent first requests of the same user
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let (existing,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM categories WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        if existing == 0 {
            for new in defaults {
                insert_category(&mut *tx, user_id, new).await?;
            }
            tracing::info!(user_id, count = defaults.len(), "seeded default categories");
        }
        tx.commit().await?;

        self.list_categories(user_id, None).await
    }
}

async fn insert_category<'e, E>(
    executor: E,
    user_id: i64,
    new: &NewCategory,
) -> StoreResult<Category>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (user_id, name, kind, color, icon)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, name, kind, color, icon, created_at
        "#,
    )
    .bind(user_id)
    .bind(&new.name)
    .bind(new.kind)
    .bind(&new.color)
    .bind(&new.icon)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

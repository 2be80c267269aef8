use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    db::PgStore,
    store::{StoreError, StoreResult, TransactionStore},
    transactions::repo_types::{
        CategoryTotal, NewTransaction, Transaction, TransactionFilter, TransactionPatch,
        TransactionType, TypeStat,
    },
};

/// Escapes `LIKE` wildcards so a search term only matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl TransactionStore for PgStore {
    async fn create_transaction(
        &self,
        user_id: i64,
        new: NewTransaction,
    ) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, category_id, kind, amount, description, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, category_id, kind, amount, description, date, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(new.category_id)
        .bind(new.kind)
        .bind(new.amount)
        .bind(new.description)
        .bind(new.date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_transactions(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, category_id, kind, amount, description, date, created_at, updated_at
            FROM transactions
            WHERE user_id = $1
              AND ($4::transaction_type IS NULL OR kind = $4)
              AND ($5::text IS NULL OR description ILIKE $5)
            ORDER BY date DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .bind(filter.kind)
        .bind(filter.search.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_transactions_by_date_range(
        &self,
        user_id: i64,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, category_id, kind, amount, description, date, created_at, updated_at
            FROM transactions
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_transaction(&self, user_id: i64, id: i64) -> StoreResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, category_id, kind, amount, description, date, created_at, updated_at
            FROM transactions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        patch: TransactionPatch,
    ) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions SET
                kind        = COALESCE($3, kind),
                amount      = COALESCE($4, amount),
                category_id = COALESCE($5, category_id),
                description = COALESCE($6, description),
                date        = COALESCE($7, date),
                updated_at  = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, category_id, kind, amount, description, date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(patch.kind)
        .bind(patch.amount)
        .bind(patch.category_id)
        .bind(patch.description)
        .bind(patch.date)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(StoreError::NotFound)
    }

    async fn delete_transaction(&self, user_id: i64, id: i64) -> StoreResult<()> {
        let result = sqlx::query(r#"DELETE FROM transactions WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn transaction_stats(&self, user_id: i64) -> StoreResult<Vec<TypeStat>> {
        let rows = sqlx::query_as::<_, TypeStat>(
            r#"
            SELECT kind, SUM(amount)::BIGINT AS total, COUNT(*) AS count
            FROM transactions
            WHERE user_id = $1
            GROUP BY kind
            ORDER BY kind
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn category_breakdown(
        &self,
        user_id: i64,
        kind: TransactionType,
    ) -> StoreResult<Vec<CategoryTotal>> {
        let rows = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT t.category_id,
                   c.name               AS category_name,
                   c.color              AS category_color,
                   SUM(t.amount)::BIGINT AS total,
                   COUNT(*)             AS count
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = $1 AND t.kind = $2
            GROUP BY t.category_id, c.name, c.color
            ORDER BY total DESC, t.category_id ASC
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::repo_types::{Role, UpsertUser, User},
    db::PgStore,
    store::{require_open_id, StoreResult, UserStore},
};

const USER_COLUMNS: &str = "id, open_id, name, email, login_method, password_hash, role, \
                            created_at, updated_at, last_signed_in";

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: UpsertUser) -> StoreResult<User> {
        require_open_id(&user.open_id)?;
        let signed_in = user.last_signed_in.unwrap_or_else(OffsetDateTime::now_utc);

        // a taken open_id surfaces as a unique violation
        let sql = format!(
            r#"
            INSERT INTO users (open_id, name, email, login_method, password_hash, role, last_signed_in)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.open_id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.login_method)
            .bind(&user.password_hash)
            .bind(user.role.unwrap_or(Role::User))
            .bind(signed_in)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn upsert_user(&self, user: UpsertUser) -> StoreResult<User> {
        require_open_id(&user.open_id)?;
        let refresh = user.refreshes_sign_in();
        let signed_in = user.last_signed_in.unwrap_or_else(OffsetDateTime::now_utc);

        let sql = format!(
            r#"
            INSERT INTO users (open_id, name, email, login_method, password_hash, role, last_signed_in)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (open_id) DO UPDATE SET
                name           = COALESCE($2, users.name),
                email          = COALESCE($3, users.email),
                login_method   = COALESCE($4, users.login_method),
                password_hash  = COALESCE($5, users.password_hash),
                role           = COALESCE($8, users.role),
                last_signed_in = CASE WHEN $9 THEN $7 ELSE users.last_signed_in END,
                updated_at     = now()
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.open_id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.login_method)
            .bind(&user.password_hash)
            .bind(user.role.unwrap_or(Role::User))
            .bind(signed_in)
            .bind(user.role)
            .bind(refresh)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_user_by_open_id(&self, open_id: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE open_id = $1 LIMIT 1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(open_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

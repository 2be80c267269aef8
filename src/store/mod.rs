//! Persistence seam. Every read and write is scoped by `user_id`.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::{
    auth::repo_types::{UpsertUser, User},
    categories::repo_types::{Category, CategoryPatch, NewCategory},
    transactions::repo_types::{
        CategoryTotal, NewTransaction, Transaction, TransactionFilter, TransactionPatch,
        TransactionType, TypeStat,
    },
};

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn still_referenced() -> Self {
        StoreError::Conflict("record is still referenced by transactions".into())
    }

    pub(crate) fn missing_reference() -> Self {
        StoreError::Invalid("referenced record does not exist".into())
    }
}

/// Users are keyed by `open_id`, so it must not be blank.
pub(crate) fn require_open_id(open_id: &str) -> StoreResult<()> {
    if open_id.trim().is_empty() {
        return Err(StoreError::Invalid("user open_id is required".into()));
    }
    Ok(())
}

// foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";
// unique_violation
const UNIQUE_VIOLATION: &str = "23505";

fn db_code(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// True when a delete was blocked by rows still pointing at the target.
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    db_code(e).as_deref() == Some(FOREIGN_KEY_VIOLATION)
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let code = db_code(&e);
        match (code.as_deref(), e) {
            (_, sqlx::Error::RowNotFound) => StoreError::NotFound,
            // inserts and updates; deletes map this themselves
            (Some(FOREIGN_KEY_VIOLATION), _) => StoreError::missing_reference(),
            (Some(UNIQUE_VIOLATION), _) => StoreError::Conflict("record already exists".into()),
            (_, other) => StoreError::Database(other.into()),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Plain insert; `Conflict` when the `open_id` is taken.
    async fn create_user(&self, user: UpsertUser) -> StoreResult<User>;
    async fn upsert_user(&self, user: UpsertUser) -> StoreResult<User>;
    async fn get_user_by_open_id(&self, open_id: &str) -> StoreResult<Option<User>>;
    async fn get_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create_transaction(&self, user_id: i64, new: NewTransaction)
        -> StoreResult<Transaction>;

    /// Newest first.
    async fn list_transactions(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>>;

    /// Both ends inclusive, newest first.
    async fn list_transactions_by_date_range(
        &self,
        user_id: i64,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> StoreResult<Vec<Transaction>>;

    async fn get_transaction(&self, user_id: i64, id: i64) -> StoreResult<Option<Transaction>>;

    async fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        patch: TransactionPatch,
    ) -> StoreResult<Transaction>;

    async fn delete_transaction(&self, user_id: i64, id: i64) -> StoreResult<()>;

    async fn transaction_stats(&self, user_id: i64) -> StoreResult<Vec<TypeStat>>;

    /// Largest total first.
    async fn category_breakdown(
        &self,
        user_id: i64,
        kind: TransactionType,
    ) -> StoreResult<Vec<CategoryTotal>>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create_category(&self, user_id: i64, new: NewCategory) -> StoreResult<Category>;

    async fn list_categories(
        &self,
        user_id: i64,
        kind: Option<TransactionType>,
    ) -> StoreResult<Vec<Category>>;

    async fn get_category(&self, user_id: i64, id: i64) -> StoreResult<Option<Category>>;

    async fn update_category(
        &self,
        user_id: i64,
        id: i64,
        patch: CategoryPatch,
    ) -> StoreResult<Category>;

    async fn delete_category(&self, user_id: i64, id: i64) -> StoreResult<()>;

    /// Inserts `defaults` only when the user has no categories yet and
    /// returns all of the user's categories.
    async fn seed_default_categories(
        &self,
        user_id: i64,
        defaults: &[NewCategory],
    ) -> StoreResult<Vec<Category>>;
}

pub trait Store: UserStore + TransactionStore + CategoryStore {}

impl<T: UserStore + TransactionStore + CategoryStore> Store for T {}

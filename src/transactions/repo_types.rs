use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Whether money comes in or goes out. Shared by transactions and categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// Transaction record in the database. `amount` is in minor units.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub kind: TransactionType,
    pub amount: i64,
    pub description: Option<String>,
    pub date: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub category_id: i64,
    pub kind: TransactionType,
    pub amount: i64,
    pub description: Option<String>,
    pub date: OffsetDateTime,
}

/// Narrows a transaction listing. `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.kind.map_or(true, |k| tx.kind == k)
            && self.search.as_deref().map_or(true, |needle| {
                tx.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle.to_lowercase()))
            })
    }
}

/// Fields left as `None` are not touched by an update.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub kind: Option<TransactionType>,
    pub amount: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

/// Sum and count of a user's transactions of one type.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TypeStat {
    pub kind: TransactionType,
    pub total: i64,
    pub count: i64,
}

/// Sum and count of a user's transactions in one category.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CategoryTotal {
    pub category_id: i64,
    pub category_name: String,
    pub category_color: String,
    pub total: i64,
    pub count: i64,
}

//! In-memory store used by the HTTP tests. Mirrors the SQL semantics of `PgStore`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::{
    require_open_id, CategoryStore, StoreError, StoreResult, TransactionStore, UserStore,
};
use crate::{
    auth::repo_types::{Role, UpsertUser, User},
    categories::repo_types::{Category, CategoryPatch, NewCategory},
    transactions::repo_types::{
        CategoryTotal, NewTransaction, Transaction, TransactionFilter, TransactionPatch,
        TransactionType, TypeStat,
    },
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(rows: &mut [Transaction]) {
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

fn insert_category(t: &mut Tables, user_id: i64, new: &NewCategory) -> Category {
    let category = Category {
        id: t.next_id(),
        user_id,
        name: new.name.clone(),
        kind: new.kind,
        color: new.color.clone(),
        icon: new.icon.clone(),
        created_at: OffsetDateTime::now_utc(),
    };
    t.categories.push(category.clone());
    category
}

fn categories_of(t: &Tables, user_id: i64, kind: Option<TransactionType>) -> Vec<Category> {
    let mut rows: Vec<Category> = t
        .categories
        .iter()
        .filter(|c| c.user_id == user_id && kind.map_or(true, |k| c.kind == k))
        .cloned()
        .collect();
    rows.sort_by_key(|c| (c.kind, c.id));
    rows
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: UpsertUser) -> StoreResult<User> {
        require_open_id(&user.open_id)?;
        let now = OffsetDateTime::now_utc();

        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.open_id == user.open_id) {
            return Err(StoreError::Conflict("record already exists".into()));
        }
        let created = User {
            id: t.next_id(),
            open_id: user.open_id,
            name: user.name,
            email: user.email,
            login_method: user.login_method,
            password_hash: user.password_hash,
            role: user.role.unwrap_or(Role::User),
            created_at: now,
            updated_at: now,
            last_signed_in: user.last_signed_in.unwrap_or(now),
        };
        t.users.push(created.clone());
        Ok(created)
    }

    async fn upsert_user(&self, user: UpsertUser) -> StoreResult<User> {
        require_open_id(&user.open_id)?;
        let refresh = user.refreshes_sign_in();
        let now = OffsetDateTime::now_utc();
        let signed_in = user.last_signed_in.unwrap_or(now);

        let mut t = self.tables.lock().await;
        if let Some(existing) = t.users.iter_mut().find(|u| u.open_id == user.open_id) {
            if user.name.is_some() {
                existing.name = user.name;
            }
            if user.email.is_some() {
                existing.email = user.email;
            }
            if user.login_method.is_some() {
                existing.login_method = user.login_method;
            }
            if user.password_hash.is_some() {
                existing.password_hash = user.password_hash;
            }
            if let Some(role) = user.role {
                existing.role = role;
            }
            if refresh {
                existing.last_signed_in = signed_in;
            }
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = User {
            id: t.next_id(),
            open_id: user.open_id,
            name: user.name,
            email: user.email,
            login_method: user.login_method,
            password_hash: user.password_hash,
            role: user.role.unwrap_or(Role::User),
            created_at: now,
            updated_at: now,
            last_signed_in: signed_in,
        };
        t.users.push(created.clone());
        Ok(created)
    }

    async fn get_user_by_open_id(&self, open_id: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.open_id == open_id).cloned())
    }

    async fn get_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn create_transaction(
        &self,
        user_id: i64,
        new: NewTransaction,
    ) -> StoreResult<Transaction> {
        let mut t = self.tables.lock().await;
        if !t.categories.iter().any(|c| c.id == new.category_id) {
            return Err(StoreError::missing_reference());
        }
        let now = OffsetDateTime::now_utc();
        let row = Transaction {
            id: t.next_id(),
            user_id,
            category_id: new.category_id,
            kind: new.kind,
            amount: new.amount,
            description: new.description,
            date: new.date,
            created_at: now,
            updated_at: now,
        };
        t.transactions.push(row.clone());
        Ok(row)
    }

    async fn list_transactions(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Transaction> = t
            .transactions
            .iter()
            .filter(|tx| tx.user_id == user_id && filter.matches(tx))
            .cloned()
            .collect();
        newest_first(&mut rows);
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_transactions_by_date_range(
        &self,
        user_id: i64,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> StoreResult<Vec<Transaction>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Transaction> = t
            .transactions
            .iter()
            .filter(|tx| tx.user_id == user_id && tx.date >= start && tx.date <= end)
            .cloned()
            .collect();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn get_transaction(&self, user_id: i64, id: i64) -> StoreResult<Option<Transaction>> {
        let t = self.tables.lock().await;
        Ok(t
            .transactions
            .iter()
            .find(|tx| tx.id == id && tx.user_id == user_id)
            .cloned())
    }

    async fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        patch: TransactionPatch,
    ) -> StoreResult<Transaction> {
        let mut t = self.tables.lock().await;
        if let Some(category_id) = patch.category_id {
            if !t.categories.iter().any(|c| c.id == category_id) {
                return Err(StoreError::missing_reference());
            }
        }
        let row = t
            .transactions
            .iter_mut()
            .find(|tx| tx.id == id && tx.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        if let Some(kind) = patch.kind {
            row.kind = kind;
        }
        if let Some(amount) = patch.amount {
            row.amount = amount;
        }
        if let Some(category_id) = patch.category_id {
            row.category_id = category_id;
        }
        if patch.description.is_some() {
            row.description = patch.description;
        }
        if let Some(date) = patch.date {
            row.date = date;
        }
        row.updated_at = OffsetDateTime::now_utc();
        Ok(row.clone())
    }

    async fn delete_transaction(&self, user_id: i64, id: i64) -> StoreResult<()> {
        let mut t = self.tables.lock().await;
        let before = t.transactions.len();
        t.transactions
            .retain(|tx| !(tx.id == id && tx.user_id == user_id));
        if t.transactions.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn transaction_stats(&self, user_id: i64) -> StoreResult<Vec<TypeStat>> {
        let t = self.tables.lock().await;
        let mut grouped: BTreeMap<TransactionType, (i64, i64)> = BTreeMap::new();
        for tx in t.transactions.iter().filter(|tx| tx.user_id == user_id) {
            let entry = grouped.entry(tx.kind).or_default();
            entry.0 += tx.amount;
            entry.1 += 1;
        }
        Ok(grouped
            .into_iter()
            .map(|(kind, (total, count))| TypeStat { kind, total, count })
            .collect())
    }

    async fn category_breakdown(
        &self,
        user_id: i64,
        kind: TransactionType,
    ) -> StoreResult<Vec<CategoryTotal>> {
        let t = self.tables.lock().await;
        let mut grouped: BTreeMap<i64, (i64, i64)> = BTreeMap::new();
        for tx in t
            .transactions
            .iter()
            .filter(|tx| tx.user_id == user_id && tx.kind == kind)
        {
            let entry = grouped.entry(tx.category_id).or_default();
            entry.0 += tx.amount;
            entry.1 += 1;
        }
        let mut rows: Vec<CategoryTotal> = grouped
            .into_iter()
            .filter_map(|(category_id, (total, count))| {
                let category = t.categories.iter().find(|c| c.id == category_id)?;
                Some(CategoryTotal {
                    category_id,
                    category_name: category.name.clone(),
                    category_color: category.color.clone(),
                    total,
                    count,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total).then(a.category_id.cmp(&b.category_id)));
        Ok(rows)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn create_category(&self, user_id: i64, new: NewCategory) -> StoreResult<Category> {
        let mut t = self.tables.lock().await;
        Ok(insert_category(&mut t, user_id, &new))
    }

    async fn list_categories(
        &self,
        user_id: i64,
        kind: Option<TransactionType>,
    ) -> StoreResult<Vec<Category>> {
        let t = self.tables.lock().await;
        Ok(categories_of(&t, user_id, kind))
    }

    async fn get_category(&self, user_id: i64, id: i64) -> StoreResult<Option<Category>> {
        let t = self.tables.lock().await;
        Ok(t
            .categories
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn update_category(
        &self,
        user_id: i64,
        id: i64,
        patch: CategoryPatch,
    ) -> StoreResult<Category> {
        let mut t = self.tables.lock().await;
        let row = t
            .categories
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(color) = patch.color {
            row.color = color;
        }
        if let Some(icon) = patch.icon {
            row.icon = icon;
        }
        Ok(row.clone())
    }

    async fn delete_category(&self, user_id: i64, id: i64) -> StoreResult<()> {
        let mut t = self.tables.lock().await;
        if !t.categories.iter().any(|c| c.id == id && c.user_id == user_id) {
            return Err(StoreError::NotFound);
        }
        if t.transactions.iter().any(|tx| tx.category_id == id) {
            return Err(StoreError::still_referenced());
        }
        t.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn seed_default_categories(
        &self,
        user_id: i64,
        defaults: &[NewCategory],
    ) -> StoreResult<Vec<Category>> {
        let mut t = self.tables.lock().await;
        if !t.categories.iter().any(|c| c.user_id == user_id) {
            for new in defaults {
                insert_category(&mut t, user_id, new);
            }
        }
        Ok(categories_of(&t, user_id, None))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn user(open_id: &str, password_hash: &str) -> UpsertUser {
        UpsertUser {
            open_id: open_id.into(),
            password_hash: Some(password_hash.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upsert_requires_open_id() {
        let store = MemoryStore::new();
        let err = store.upsert_user(UpsertUser::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        let err = store.create_user(user("  ", "hash")).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn create_user_never_overwrites() {
        let store = MemoryStore::new();
        let first = store.create_user(user("a@example.com", "first")).await.unwrap();

        let err = store
            .create_user(user("a@example.com", "second"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let stored = store.get_user_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn transaction_needs_an_existing_category() {
        let store = MemoryStore::new();
        let err = store
            .create_transaction(
                1,
                NewTransaction {
                    category_id: 42,
                    kind: TransactionType::Expense,
                    amount: 100,
                    description: None,
                    date: datetime!(2026-10-01 12:00 UTC),
                },
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, StoreError::Invalid(ref msg) if msg == "referenced record does not exist")
        );
    }
}

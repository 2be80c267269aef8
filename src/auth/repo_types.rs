use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub open_id: String,              // external identity, unique
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub password_hash: Option<String>, // Argon2 hash, never leaves the server
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub last_signed_in: OffsetDateTime,
}

/// Insert-or-update payload keyed by `open_id`.
///
/// On insert every field is written. On update only the fields that are
/// `Some` overwrite the stored row.
#[derive(Debug, Clone, Default)]
pub struct UpsertUser {
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub last_signed_in: Option<OffsetDateTime>,
}

impl UpsertUser {
    /// An update that would change nothing still bumps `last_signed_in`.
    pub fn refreshes_sign_in(&self) -> bool {
        self.last_signed_in.is_some()
            || (self.name.is_none()
                && self.email.is_none()
                && self.login_method.is_none()
                && self.password_hash.is_none()
                && self.role.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_refreshes_sign_in() {
        let upsert = UpsertUser {
            open_id: "someone".into(),
            ..Default::default()
        };
        assert!(upsert.refreshes_sign_in());
    }

    #[test]
    fn profile_update_keeps_sign_in_time() {
        let upsert = UpsertUser {
            open_id: "someone".into(),
            name: Some("Someone".into()),
            ..Default::default()
        };
        assert!(!upsert.refreshes_sign_in());

        let upsert = UpsertUser {
            last_signed_in: Some(OffsetDateTime::now_utc()),
            ..upsert
        };
        assert!(upsert.refreshes_sign_in());
    }
}

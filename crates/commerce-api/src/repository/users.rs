//! 자격증명 저장소 구현.
//!
//! - [`PgUserStore`]: PostgreSQL (`users` 테이블, 유일성 제약)
//! - [`MemoryUserStore`]: 단일 쓰기 잠금으로 유일성을 보장하는 인메모리 저장소

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commerce_core::{
    Credential, CredentialChanges, NewCredential, Role, StoreError, StoreResult, UniqueField,
    UserStore,
};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

const USERNAME_CONSTRAINT: &str = "users_username_key";

/// `users` 테이블 행.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Credential {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::Backend(format!("unknown role in users table: {}", row.role)))?;

        Ok(Credential {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// PostgreSQL 자격증명 저장소.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Credential::try_from)
        .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Credential>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Credential::try_from)
        .transpose()
    }

    async fn insert(&self, new: NewCredential) -> StoreResult<Credential> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    let field = match db_err.constraint() {
                        Some(USERNAME_CONSTRAINT) => UniqueField::Username,
                        _ => UniqueField::Email,
                    };
                    return StoreError::Duplicate { field };
                }
            }
            backend(e)
        })?;

        Credential::try_from(row)
    }

    async fn list(&self) -> StoreResult<Vec<Credential>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?
        .into_iter()
        .map(Credential::try_from)
        .collect()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: CredentialChanges,
    ) -> StoreResult<Option<Credential>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, first_name, last_name, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Credential::try_from)
        .transpose()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(backend)
    }
}

/// 인메모리 자격증명 저장소.
///
/// 유일성 확인과 삽입이 하나의 쓰기 잠금 안에서 수행됩니다.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, Credential>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        let users = self.users.read().await;
        Ok(users.values().find(|c| c.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Credential>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, new: NewCredential) -> StoreResult<Credential> {
        let mut users = self.users.write().await;

        if users.values().any(|c| c.email == new.email) {
            return Err(StoreError::Duplicate {
                field: UniqueField::Email,
            });
        }
        if users.values().any(|c| c.username == new.username) {
            return Err(StoreError::Duplicate {
                field: UniqueField::Username,
            });
        }

        let now = Utc::now();
        let credential = Credential {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(credential.id, credential.clone());

        Ok(credential)
    }

    async fn list(&self) -> StoreResult<Vec<Credential>> {
        let mut users: Vec<Credential> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|c| c.created_at);
        Ok(users)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: CredentialChanges,
    ) -> StoreResult<Option<Credential>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|credential| {
            changes.apply_to(credential, Utc::now());
            credential.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_credential(username: &str, email: &str) -> NewCredential {
        NewCredential {
            username: username.to_string(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            password_hash: "$argon2id$placeholder".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryUserStore::new();
        let created = store.insert(new_credential("a", "a@x.com")).await.unwrap();

        let by_email = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert!(store.find_by_id(created.id).await.unwrap().is_some());
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicates() {
        let store = MemoryUserStore::new();
        store.insert(new_credential("a", "a@x.com")).await.unwrap();

        let err = store.insert(new_credential("b", "a@x.com")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Duplicate {
                field: UniqueField::Email
            }
        ));

        let err = store.insert(new_credential("a", "b@x.com")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Duplicate {
                field: UniqueField::Username
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_single_winner() {
        let store = Arc::new(MemoryUserStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(new_credential(&format!("user{}", i), "same@x.com"))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryUserStore::new();
        let created = store.insert(new_credential("a", "a@x.com")).await.unwrap();

        let updated = store
            .update(
                created.id,
                CredentialChanges {
                    first_name: Some("Ann".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Ann"));
        assert!(store
            .update(Uuid::new_v4(), CredentialChanges::default())
            .await
            .unwrap()
            .is_none());

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
    }
}

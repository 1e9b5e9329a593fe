//! Employee persistence over SQLite.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::model::{CreateEmployee, Employee, UpdateEmployee};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("employee not found")]
    NotFound,

    #[error("email already exists")]
    Conflict,

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // UNIQUE(email) violations get their own variant so callers can
        // answer with a conflict instead of a generic failure.
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                return StoreError::Conflict;
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Creates the employees table when it does not exist yet. Safe to call on
/// every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            position TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// All employees, newest first. Ties on the timestamp fall back to the
/// higher id so the ordering stays stable.
pub async fn list_all(pool: &SqlitePool) -> StoreResult<Vec<Employee>> {
    let rows = sqlx::query_as::<_, Employee>(
        "SELECT id, name, email, position, created_at, updated_at FROM employees ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> StoreResult<Employee> {
    let row = sqlx::query_as::<_, Employee>(
        "SELECT id, name, email, position, created_at, updated_at FROM employees WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.ok_or(StoreError::NotFound)
}

/// Inserts a new employee and returns the stored row, timestamps included.
pub async fn create(pool: &SqlitePool, data: &CreateEmployee) -> StoreResult<Employee> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO employees (name, email, position, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.position)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_by_id(pool, result.last_insert_rowid()).await
}

/// Applies a partial update. Absent fields keep their current value;
/// `updated_at` is always refreshed while `created_at` never moves.
pub async fn update(pool: &SqlitePool, id: i64, patch: &UpdateEmployee) -> StoreResult<Employee> {
    let current = get_by_id(pool, id).await?;

    let name = patch.name.clone().unwrap_or(current.name);
    let email = patch.email.clone().unwrap_or(current.email);
    let position = patch.position.clone().unwrap_or(current.position);

    let result = sqlx::query(
        "UPDATE employees SET name = ?, email = ?, position = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(&email)
    .bind(&position)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }

    get_by_id(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::time::Duration;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    fn sample(name: &str, email: &str) -> CreateEmployee {
        CreateEmployee {
            name: name.to_string(),
            email: email.to_string(),
            position: "Engineer".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let pool = test_pool().await;
        let employee = create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();
        assert!(employee.id > 0);
        assert_eq!(employee.created_at, employee.updated_at);
        assert_eq!(employee.name, "Jane Doe");
        assert_eq!(employee.position, "Engineer");
    }

    #[tokio::test]
    async fn created_employee_round_trips() {
        let pool = test_pool().await;
        let created = create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();
        let fetched = get_by_id(&pool, created.id).await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let pool = test_pool().await;
        create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();
        let err = create(&pool, &sample("Other Jane", "jane@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let pool = test_pool().await;
        let first = create(&pool, &sample("First Person", "first@example.com"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = create(&pool, &sample("Second Person", "second@example.com"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let third = create(&pool, &sample("Third Person", "third@example.com"))
            .await
            .unwrap();

        let ids: Vec<i64> = list_all(&pool).await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn list_is_empty_for_fresh_store() {
        let pool = test_pool().await;
        assert!(list_all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_missing_employee_is_not_found() {
        let pool = test_pool().await;
        let err = get_by_id(&pool, 999).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn update_merges_partial_fields() {
        let pool = test_pool().await;
        let created = create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let patch = UpdateEmployee {
            position: Some("Staff Engineer".to_string()),
            ..Default::default()
        };
        let updated = update(&pool, created.id, &patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.email, "jane@example.com");
        assert_eq!(updated.position, "Staff Engineer");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.created_at);
    }

    #[tokio::test]
    async fn update_keeps_own_email_without_conflict() {
        let pool = test_pool().await;
        let created = create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();

        let patch = UpdateEmployee {
            name: Some("Jane D Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            ..Default::default()
        };
        let updated = update(&pool, created.id, &patch).await.unwrap();
        assert_eq!(updated.name, "Jane D Doe");
        assert_eq!(updated.email, "jane@example.com");
    }

    #[tokio::test]
    async fn update_rejects_taken_email() {
        let pool = test_pool().await;
        create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();
        let other = create(&pool, &sample("John Doe", "john@example.com"))
            .await
            .unwrap();

        let patch = UpdateEmployee {
            email: Some("jane@example.com".to_string()),
            ..Default::default()
        };
        let err = update(&pool, other.id, &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn update_missing_employee_is_not_found() {
        let pool = test_pool().await;
        let patch = UpdateEmployee {
            name: Some("Nobody Here".to_string()),
            ..Default::default()
        };
        let err = update(&pool, 42, &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let pool = test_pool().await;
        let created = create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();

        delete(&pool, created.id).await.unwrap();
        let err = get_by_id(&pool, created.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let err = delete(&pool, created.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn deleted_email_can_be_reused() {
        let pool = test_pool().await;
        let created = create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();
        delete(&pool, created.id).await.unwrap();

        let again = create(&pool, &sample("Jane Again", "jane@example.com"))
            .await
            .unwrap();
        assert_ne!(again.id, created.id);
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let pool = test_pool().await;
        ensure_schema(&pool).await.unwrap();
        create(&pool, &sample("Jane Doe", "jane@example.com"))
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        assert_eq!(list_all(&pool).await.unwrap().len(), 1);
    }
}

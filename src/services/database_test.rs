#[cfg(test)]
mod database_tests {
    use tempfile::tempdir;

    use crate::services::database::{create_database_pool, create_test_pool, run_migrations};

    #[tokio::test]
    async fn test_pool_creates_database_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("forms.db");
        let db_path_str = db_path.to_str().unwrap();

        let pool = create_database_pool(db_path_str).await.unwrap();
        assert!(db_path.exists());

        // Schema is usable straight away
        sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES ('alice', 'alice@example.com', 'hash', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool.close().await;
        dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_migrations_create_schema() {
        let pool = create_test_pool().await;

        // All four tables should exist and accept rows
        sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES ('alice', 'alice@example.com', 'hash', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        // Running migrations again must be a no-op
        run_migrations(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_field_type_check_constraint() {
        let pool = create_test_pool().await;

        sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES ('bob', 'bob@example.com', 'hash', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO forms (title, description, user_id, created_at, updated_at)
             VALUES ('t', NULL, 1, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // A field type outside the closed enumeration is rejected by the schema
        let result = sqlx::query(
            "INSERT INTO form_fields (form_id, field_type, label) VALUES (1, 'slider', 'x')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = create_test_pool().await;

        // No form with id 42 exists
        let result = sqlx::query(
            "INSERT INTO form_fields (form_id, field_type, label) VALUES (42, 'text', 'x')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}

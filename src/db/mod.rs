mod user;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use user::{NewUser, NotificationPref, User, UserRole, UserStore};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    /// Use ":memory:" for an in-memory database.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", path)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get the current schema version.
    async fn get_version(&self) -> Result<i32, sqlx::Error> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|r| r.0).unwrap_or(0))
    }

    /// Set the schema version within a transaction.
    async fn set_version(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        version: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut **tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version = self.get_version().await?;

        if version < 1 {
            self.migrate_v1().await?;
        }

        Ok(())
    }

    /// Execute a list of queries in a transaction, then set the version.
    async fn run_migration(
        &self,
        version: i32,
        queries: &[&'static str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for query in queries {
            sqlx::query(*query).execute(&mut *tx).await?;
        }
        Self::set_version(&mut tx, version).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn migrate_v1(&self) -> Result<(), sqlx::Error> {
        self.run_migration(
            1,
            &[
                "CREATE TABLE users (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    password TEXT NOT NULL,
                    phone_number TEXT NOT NULL DEFAULT '',
                    role TEXT NOT NULL DEFAULT 'user',
                    notifications TEXT NOT NULL DEFAULT 'yes',
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_users_email ON users(email)",
                "CREATE INDEX idx_users_notifications ON users(notifications)",
            ],
        )
        .await
    }

    /// Get the user store.
    pub fn users(&self) -> UserStore {
        UserStore::new(self.pool.clone())
    }

    /// Get the underlying connection pool (for tests that need raw SQL access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "hashed-password".to_string(),
            phone_number: "5511999990000".to_string(),
            notifications: NotificationPref::Yes,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_user() {
        let db = Database::open(":memory:").await.unwrap();

        let user = db
            .users()
            .insert(sample_user("alice@example.com"))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.notifications, NotificationPref::Yes);
        assert!(!user.created_at.is_empty());

        let by_id = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.id, user.id);

        let by_email = db
            .users()
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_fails() {
        let db = Database::open(":memory:").await.unwrap();

        db.users()
            .insert(sample_user("alice@example.com"))
            .await
            .unwrap();
        let result = db.users().insert(sample_user("Alice@Example.com")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_notifiable_filters_by_preference() {
        let db = Database::open(":memory:").await.unwrap();

        let alice = db
            .users()
            .insert(sample_user("alice@example.com"))
            .await
            .unwrap();
        let mut opted_out = sample_user("bob@example.com");
        opted_out.notifications = NotificationPref::No;
        db.users().insert(opted_out).await.unwrap();

        let notifiable = db.users().notifiable().await.unwrap();
        assert_eq!(notifiable.len(), 1);
        assert_eq!(notifiable[0].id, alice.id);
    }

    #[tokio::test]
    async fn test_set_notifications() {
        let db = Database::open(":memory:").await.unwrap();

        let user = db
            .users()
            .insert(sample_user("alice@example.com"))
            .await
            .unwrap();

        let updated = db
            .users()
            .set_notifications(&user.id, NotificationPref::No)
            .await
            .unwrap();
        assert!(updated);

        let user = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(user.notifications, NotificationPref::No);

        let missing = db
            .users()
            .set_notifications("no-such-id", NotificationPref::No)
            .await
            .unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = Database::open(":memory:").await.unwrap();

        let user = db
            .users()
            .insert(sample_user("alice@example.com"))
            .await
            .unwrap();
        assert!(db.users().delete(&user.id).await.unwrap());

        assert!(db.users().get_by_id(&user.id).await.unwrap().is_none());
        assert!(!db.users().delete(&user.id).await.unwrap());
    }
}

//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::models::{Author, LatestQuote, Quote};

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        tracing::info!("SQLite connection established, running migrations...");

        // Run migrations (inline for simplicity)
        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        // Authors table. The UNIQUE constraint on name backs the
        // idempotent get-or-create used on quote submission.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS authors (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Quotes table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS quotes (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                author_id TEXT NOT NULL REFERENCES authors(id),
                generated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // Author operations

    pub async fn find_author_by_name(&self, name: &str) -> Result<Option<Author>> {
        let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, name, created_at FROM authors WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|(id, name, created_at)| Author {
            id,
            name,
            created_at,
        }))
    }

    /// Insert an author unless one with the same name already exists.
    ///
    /// Two concurrent submissions of the same new name can both reach this
    /// insert; the UNIQUE constraint makes the losing one affect zero rows
    /// instead of creating a duplicate.
    pub async fn insert_author_if_absent(&self, name: &str) -> Result<bool> {
        let id = uuid::Uuid::new_v4().to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO authors (id, name, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(Utc::now())
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Idempotent get-or-create by exact name match. Returns the author row
    /// and whether this call created it.
    pub async fn get_or_create_author(&self, name: &str) -> Result<(Author, bool)> {
        if let Some(author) = self.find_author_by_name(name).await? {
            return Ok((author, false));
        }

        let created = self.insert_author_if_absent(name).await?;
        let author = self
            .find_author_by_name(name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("author row missing after get-or-create: {}", name))?;

        Ok((author, created))
    }

    // Quote operations

    pub async fn insert_quote(&self, content: &str, author_id: &str) -> Result<Quote> {
        let quote = Quote {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            author_id: author_id.to_string(),
            generated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO quotes (id, content, author_id, generated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&quote.id)
        .bind(&quote.content)
        .bind(&quote.author_id)
        .bind(quote.generated_at)
        .execute(&*self.pool)
        .await?;

        Ok(quote)
    }

    /// The most recently generated quote joined with its author, if any.
    /// Insertion order (rowid) breaks timestamp ties.
    pub async fn latest_quote(&self) -> Result<Option<LatestQuote>> {
        let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT q.content, a.name, q.generated_at
            FROM quotes q
            JOIN authors a ON a.id = q.author_id
            ORDER BY q.generated_at DESC, q.rowid DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|(content, author_name, generated_at)| LatestQuote {
            content,
            author_name,
            generated_at,
        }))
    }
}

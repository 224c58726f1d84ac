//! Whole-state persistence between the registry and the relational store
//!
//! Save and load move the entire registry at once: save truncates all four
//! tables inside one transaction and reinserts every row, load reads
//! everything back into a fresh registry. There is no incremental diffing.

use sqlx::{FromRow, SqlitePool};

use crate::{
    error::AppResult,
    models::{book::Book, user::{Role, User}},
    registry::Registry,
};

const CREATE_BOOKS: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id TEXT PRIMARY KEY,
        title TEXT,
        author TEXT,
        genre TEXT,
        copies INTEGER NOT NULL
    )
"#;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT,
        role TEXT
    )
"#;

const CREATE_BORROWED: &str = r#"
    CREATE TABLE IF NOT EXISTS borrowed (
        userId TEXT,
        bookId TEXT,
        PRIMARY KEY (userId, bookId)
    )
"#;

const CREATE_HISTORY: &str = r#"
    CREATE TABLE IF NOT EXISTS history (
        userId TEXT,
        bookId TEXT,
        PRIMARY KEY (userId, bookId)
    )
"#;

const SCHEMA: [&str; 4] = [CREATE_BOOKS, CREATE_USERS, CREATE_BORROWED, CREATE_HISTORY];

#[derive(Debug, Clone, FromRow)]
struct BookRow {
    id: String,
    title: String,
    author: String,
    genre: String,
    copies: i64,
}

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: String,
    name: String,
    role: String,
}

#[derive(Debug, Clone, FromRow)]
struct PairRow {
    #[sqlx(rename = "userId")]
    user_id: String,
    #[sqlx(rename = "bookId")]
    book_id: String,
}

/// Persistence mapper for the registry
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Dump the full registry state to the store
    ///
    /// Schema creation, truncate and reinsert all run in one transaction,
    /// so a failure rolls back and leaves the previous rows intact.
    pub async fn save_from(&self, registry: &Registry) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        for table in ["borrowed", "history", "users", "books"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        for book in registry.books() {
            sqlx::query("INSERT INTO books (id, title, author, genre, copies) VALUES (?, ?, ?, ?, ?)")
                .bind(book.id())
                .bind(book.title())
                .bind(book.author())
                .bind(book.genre())
                .bind(book.available_copies())
                .execute(&mut *tx)
                .await?;
        }

        for user in registry.users() {
            sqlx::query("INSERT INTO users (id, name, role) VALUES (?, ?, ?)")
                .bind(user.id())
                .bind(user.name())
                .bind(user.role().as_str())
                .execute(&mut *tx)
                .await?;

            for book_id in user.borrowed() {
                sqlx::query("INSERT INTO borrowed (userId, bookId) VALUES (?, ?)")
                    .bind(user.id())
                    .bind(book_id)
                    .execute(&mut *tx)
                    .await?;
            }
            for book_id in user.history() {
                sqlx::query("INSERT INTO history (userId, bookId) VALUES (?, ?)")
                    .bind(user.id())
                    .bind(book_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        tracing::info!(
            books = registry.book_count(),
            users = registry.user_count(),
            "registry saved to store"
        );
        Ok(())
    }

    /// Rebuild registry state from the store
    ///
    /// The schema is created if missing so a fresh store loads as empty.
    /// Borrowed/history rows whose user or book no longer exists are
    /// skipped with a warning rather than failing the load.
    pub async fn load_into(&self, registry: &mut Registry) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;

        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&mut *conn).await?;
        }

        let books: Vec<BookRow> = sqlx::query_as("SELECT id, title, author, genre, copies FROM books")
            .fetch_all(&mut *conn)
            .await?;
        for row in books {
            let book = Book::new(row.id, row.title, row.author, row.genre, row.copies)?;
            registry.add_book(book)?;
        }

        let users: Vec<UserRow> = sqlx::query_as("SELECT id, name, role FROM users")
            .fetch_all(&mut *conn)
            .await?;
        for row in users {
            let user = User::new(row.id, row.name, Role::from(row.role.as_str()));
            registry.add_user(user)?;
        }

        let borrowed: Vec<PairRow> = sqlx::query_as("SELECT userId, bookId FROM borrowed")
            .fetch_all(&mut *conn)
            .await?;
        for row in borrowed {
            if !registry.restore_borrowed(&row.user_id, &row.book_id) {
                tracing::warn!(
                    user = %row.user_id,
                    book = %row.book_id,
                    "skipping borrowed row with missing user or book"
                );
            }
        }

        let history: Vec<PairRow> = sqlx::query_as("SELECT userId, bookId FROM history")
            .fetch_all(&mut *conn)
            .await?;
        for row in history {
            if !registry.restore_history(&row.user_id, &row.book_id) {
                tracing::warn!(
                    user = %row.user_id,
                    book = %row.book_id,
                    "skipping history row with missing user or book"
                );
            }
        }

        tracing::info!(
            books = registry.book_count(),
            users = registry.user_count(),
            "registry loaded from store"
        );
        Ok(())
    }
}

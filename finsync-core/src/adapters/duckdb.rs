//! DuckDB document store implementation

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use duckdb::{params, Connection};
use serde_json::Value as JsonValue;

use super::memory::generate_id;
use crate::domain::result::{Error, Result};
use crate::ports::{Collection, Document, DocumentStore, WriteBatch, WriteOp};
use crate::services::{MigrationResult, MigrationService};

/// Document store backed by a single DuckDB table
///
/// All collections share the `documents` table, keyed by
/// `(collection, doc_id)`. Document bodies are stored as JSON text.
pub struct DuckDbDocumentStore {
    conn: Arc<Mutex<Connection>>,
    db_path: Option<PathBuf>,
}

impl DuckDbDocumentStore {
    /// Open (or create) a database file
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Self::try_open_connection(Some(db_path))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Self::try_open_connection(None)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: Option<&Path>) -> Result<Connection> {
        // Extension autoloading stays off: nothing here needs an extension and
        // cached extension binaries can fail to load on some platforms
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = match db_path {
            Some(path) => Connection::open_with_flags(path, config)?,
            None => Connection::open_in_memory_with_flags(config)?,
        };
        Ok(conn)
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::database("Database connection lock poisoned"))?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            tracing::info!(applied = ?result.applied, "Database schema upgraded");
        }
        Ok(())
    }

    /// Run `f` against the connection on the blocking thread pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| Error::database("Database connection lock poisoned"))?;
            f(&mut conn)
        })
        .await?
    }
}

fn apply(conn: &Connection, op: WriteOp) -> Result<()> {
    match op {
        WriteOp::Delete { collection, id } => {
            conn.execute(
                "DELETE FROM documents WHERE collection = ? AND doc_id = ?",
                params![collection.name(), id],
            )?;
        }
        WriteOp::Create { collection, data } => {
            conn.execute(
                "INSERT INTO documents (collection, doc_id, data) VALUES (?, ?, ?)",
                params![collection.name(), generate_id(), serde_json::to_string(&data)?],
            )?;
        }
        WriteOp::Set {
            collection,
            id,
            data,
        } => {
            conn.execute(
                "INSERT OR REPLACE INTO documents (collection, doc_id, data) VALUES (?, ?, ?)",
                params![collection.name(), id, serde_json::to_string(&data)?],
            )?;
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for DuckDbDocumentStore {
    async fn get_all(&self, collection: Collection) -> Result<Vec<Document>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT doc_id, data FROM documents WHERE collection = ? ORDER BY doc_id",
            )?;
            let rows = stmt
                .query_map([collection.name()], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, data)| {
                    Ok(Document {
                        id,
                        data: serde_json::from_str(&data)?,
                    })
                })
                .collect()
        })
        .await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| apply(conn, WriteOp::Delete { collection, id }))
            .await
    }

    async fn create(&self, collection: Collection, data: JsonValue) -> Result<String> {
        let id = generate_id();
        self.set(collection, &id, data).await?;
        Ok(id)
    }

    async fn set(&self, collection: Collection, id: &str, data: JsonValue) -> Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            apply(
                conn,
                WriteOp::Set {
                    collection,
                    id,
                    data,
                },
            )
        })
        .await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            for op in batch.into_ops() {
                apply(&tx, op)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn count(&self, collection: Collection) -> Result<usize> {
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?",
                [collection.name()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
        .await
    }
}

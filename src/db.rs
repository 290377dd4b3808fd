//! # Database Module (Sip-Store)
//!
//! Manages the persistent .db file holding the `drinks` table. Handles
//! schema initialization, connection management, and the single-row CRUD
//! operations shared by the CLI and the HTTP API. Name uniqueness is
//! enforced by the table's UNIQUE constraint; constraint violations map to
//! `SipError::Conflict`, missing ids to `SipError::NotFound`.

use crate::drink::{validate_description, validate_name, Drink, DrinkPatch};
use crate::error::{SipError, SipResult};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

/// The Sip-Store: owns the database connection and the drinks table
pub struct SipStore {
    conn: Connection,
    path: String,
}

impl SipStore {
    /// Opens (or creates) the database file at `path`
    pub async fn new<P: AsRef<Path>>(path: P) -> SipResult<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        info!("Opening SipDB at: {}", path_str);

        let conn = Connection::open(&path_str)
            .await
            .map_err(|e| SipError::Database(format!("Failed to open database: {}", e)))?;

        Self::initialize_pragmas(&conn).await?;

        Ok(Self {
            conn,
            path: path_str,
        })
    }

    /// Creates an in-memory database (useful for testing)
    pub async fn in_memory() -> SipResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| SipError::Database(format!("Failed to create database: {}", e)))?;

        Self::initialize_pragmas(&conn).await?;

        Ok(Self {
            conn,
            path: ":memory:".to_string(),
        })
    }

    async fn initialize_pragmas(conn: &Connection) -> SipResult<()> {
        debug!("Setting up database pragmas...");

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(|e| SipError::Database(format!("Failed to set pragmas: {}", e)))?;

        Ok(())
    }

    /// Creates the drinks table if absent. Idempotent: safe to call any
    /// number of times without touching existing rows.
    pub async fn initialize(&self) -> SipResult<()> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS drinks (
                         id INTEGER PRIMARY KEY AUTOINCREMENT,
                         name VARCHAR(80) UNIQUE NOT NULL,
                         description VARCHAR(120)
                     );",
                )?;
                Ok(())
            })
            .await
            .map_err(|e| SipError::Database(format!("Failed to create schema: {}", e)))?;

        info!("Schema initialized");
        Ok(())
    }

    /// Inserts a new drink and returns the assigned id
    pub async fn insert(&self, name: &str, description: Option<&str>) -> SipResult<i64> {
        validate_name(name)?;
        if let Some(description) = description {
            validate_description(description)?;
        }

        let name_owned = name.to_string();
        let description = description.map(String::from);
        let result = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO drinks (name, description) VALUES (?1, ?2)",
                    rusqlite::params![name_owned, description],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await;

        match result {
            Ok(id) => {
                debug!("Inserted drink {} ({})", id, name);
                Ok(id)
            }
            Err(e) if is_unique_violation(&e) => Err(SipError::Conflict(format!(
                "A drink named '{}' already exists",
                name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up one drink by id. Absence is a normal outcome, not an error.
    pub async fn get(&self, id: i64) -> SipResult<Option<Drink>> {
        let drink = self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT id, name, description FROM drinks WHERE id = ?1")?;
                let mut rows = stmt.query([id])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row_to_drink(row)?)),
                    None => Ok(None),
                }
            })
            .await?;

        Ok(drink)
    }

    /// Returns all drinks ordered by id
    pub async fn list(&self) -> SipResult<Vec<Drink>> {
        let drinks = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, name, description FROM drinks ORDER BY id")?;
                let mut rows = stmt.query([])?;
                let mut drinks = Vec::new();
                while let Some(row) = rows.next()? {
                    drinks.push(row_to_drink(row)?);
                }
                Ok(drinks)
            })
            .await?;

        Ok(drinks)
    }

    /// Applies only the fields present in `patch` and returns the updated
    /// row. An empty patch is a no-op read.
    pub async fn update(&self, id: i64, patch: DrinkPatch) -> SipResult<Drink> {
        patch.validate()?;

        if patch.is_empty() {
            return self.require(id).await;
        }

        let conflict_name = patch.name.clone();
        let result = self
            .conn
            .call(move |conn| {
                let mut sets: Vec<&str> = Vec::new();
                let mut params: Vec<rusqlite::types::Value> = Vec::new();
                if let Some(name) = patch.name {
                    sets.push("name = ?");
                    params.push(name.into());
                }
                if let Some(description) = patch.description {
                    sets.push("description = ?");
                    params.push(description.into());
                }
                params.push(id.into());

                let sql = format!("UPDATE drinks SET {} WHERE id = ?", sets.join(", "));
                let affected = conn.execute(&sql, rusqlite::params_from_iter(params))?;
                Ok(affected)
            })
            .await;

        match result {
            Ok(0) => Err(not_found(id)),
            Ok(_) => {
                debug!("Updated drink {}", id);
                self.require(id).await
            }
            Err(e) if is_unique_violation(&e) => Err(SipError::Conflict(format!(
                "A drink named '{}' already exists",
                conflict_name.unwrap_or_default()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Full replacement: overwrites both fields, clearing the description
    /// when `None` is given.
    pub async fn replace(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> SipResult<Drink> {
        validate_name(name)?;
        if let Some(description) = description {
            validate_description(description)?;
        }

        let name_owned = name.to_string();
        let conflict_name = name.to_string();
        let description = description.map(String::from);
        let result = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    "UPDATE drinks SET name = ?1, description = ?2 WHERE id = ?3",
                    rusqlite::params![name_owned, description, id],
                )?;
                Ok(affected)
            })
            .await;

        match result {
            Ok(0) => Err(not_found(id)),
            Ok(_) => self.require(id).await,
            Err(e) if is_unique_violation(&e) => Err(SipError::Conflict(format!(
                "A drink named '{}' already exists",
                conflict_name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the row permanently. A second delete of the same id reports
    /// not-found, never a crash.
    pub async fn delete(&self, id: i64) -> SipResult<()> {
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute("DELETE FROM drinks WHERE id = ?1", [id])?;
                Ok(affected)
            })
            .await?;

        if affected == 0 {
            return Err(not_found(id));
        }
        debug!("Deleted drink {}", id);
        Ok(())
    }

    /// Like `get`, but absence is an error. Used where the row must exist.
    pub async fn require(&self, id: i64) -> SipResult<Drink> {
        self.get(id).await?.ok_or_else(|| not_found(id))
    }

    /// Cheap connectivity check for the health endpoint
    pub async fn ping(&self) -> SipResult<()> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(|e| SipError::Database(format!("Ping failed: {}", e)))
    }

    /// Get the database file path
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn not_found(id: i64) -> SipError {
    SipError::NotFound(format!("Drink {} does not exist", id))
}

fn row_to_drink(row: &rusqlite::Row) -> Result<Drink, rusqlite::Error> {
    Ok(Drink {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
    matches!(
        err,
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SipStore {
        let store = SipStore::in_memory().await.unwrap();
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = test_store().await;
        store.insert("Mojito", Some("Minty")).await.unwrap();

        // A second initialize must not wipe existing rows
        store.initialize().await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = test_store().await;

        let id = store.insert("Mojito", Some("Minty")).await.unwrap();
        let drink = store.get(id).await.unwrap().unwrap();
        assert_eq!(drink.name, "Mojito");
        assert_eq!(drink.description.as_deref(), Some("Minty"));

        assert!(store.get(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_without_description() {
        let store = test_store().await;

        let id = store.insert("Water", None).await.unwrap();
        let drink = store.get(id).await.unwrap().unwrap();
        assert_eq!(drink.description, None);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let store = test_store().await;
        store.insert("Mojito", Some("Minty")).await.unwrap();

        let err = store.insert("Mojito", Some("Other")).await.unwrap_err();
        assert!(matches!(err, SipError::Conflict(_)));

        // The failed insert must not have touched the existing row
        let drinks = store.list().await.unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].description.as_deref(), Some("Minty"));
    }

    #[tokio::test]
    async fn test_list_shows_each_row_once() {
        let store = test_store().await;
        let a = store.insert("Mojito", Some("Minty")).await.unwrap();
        let b = store.insert("Negroni", Some("Bitter")).await.unwrap();

        let drinks = store.list().await.unwrap();
        assert_eq!(drinks.len(), 2);
        assert_ne!(a, b);
        assert_eq!(drinks[0].id, a);
        assert_eq!(drinks[1].id, b);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let store = test_store().await;
        let id = store.insert("Mojito", Some("Minty")).await.unwrap();

        let drink = store
            .update(
                id,
                DrinkPatch {
                    name: None,
                    description: Some("Very minty".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(drink.name, "Mojito");
        assert_eq!(drink.description.as_deref(), Some("Very minty"));
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let store = test_store().await;
        let id = store.insert("Mojito", Some("Minty")).await.unwrap();

        let err = store
            .update(
                id + 100,
                DrinkPatch {
                    name: Some("Daiquiri".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SipError::NotFound(_)));

        // Existing rows unchanged
        let drinks = store.list().await.unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].name, "Mojito");
    }

    #[tokio::test]
    async fn test_update_name_collision_is_conflict() {
        let store = test_store().await;
        store.insert("Mojito", None).await.unwrap();
        let id = store.insert("Negroni", None).await.unwrap();

        let err = store
            .update(
                id,
                DrinkPatch {
                    name: Some("Mojito".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SipError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_empty_patch_is_a_read() {
        let store = test_store().await;
        let id = store.insert("Mojito", Some("Minty")).await.unwrap();

        let drink = store.update(id, DrinkPatch::default()).await.unwrap();
        assert_eq!(drink.name, "Mojito");
    }

    #[tokio::test]
    async fn test_replace_clears_description() {
        let store = test_store().await;
        let id = store.insert("Mojito", Some("Minty")).await.unwrap();

        let drink = store.replace(id, "Mojito Deluxe", None).await.unwrap();
        assert_eq!(drink.name, "Mojito Deluxe");
        assert_eq!(drink.description, None);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let store = test_store().await;
        let id = store.insert("Mojito", None).await.unwrap();

        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());

        // Delete is idempotent in effect: the second call reports not-found
        let err = store.delete(id).await.unwrap_err();
        assert!(matches!(err, SipError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = test_store().await;
        let first = store.insert("Mojito", None).await.unwrap();
        store.delete(first).await.unwrap();

        let second = store.insert("Negroni", None).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_validation_happens_before_write() {
        let store = test_store().await;
        assert!(store.insert("", None).await.is_err());
        assert!(store
            .insert(&"x".repeat(81), None)
            .await
            .is_err());
        assert_eq!(store.list().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drinks.db");

        let store = SipStore::new(&path).await.unwrap();
        store.initialize().await.unwrap();
        let id = store.insert("Mojito", Some("Minty")).await.unwrap();
        drop(store);

        // Rows survive reopening the file
        let store = SipStore::new(&path).await.unwrap();
        let drink = store.get(id).await.unwrap().unwrap();
        assert_eq!(drink.name, "Mojito");
    }
}

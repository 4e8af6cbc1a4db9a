use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::ApiError;
use crate::models::Todo;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS todos (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    title     TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0
)";

/// Thread-safe SQLite handle shared by all request handlers.
///
/// rusqlite connections cannot be shared across threads directly, so access
/// is serialized behind a mutex. Every operation touches at most one row, so
/// no transaction ever spans two calls.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open or create the database file and apply the schema.
    pub fn open(path: &Path) -> Result<Self, ApiError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ApiError::Internal(format!("create dir: {e}")))?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Fresh private database, used by tests.
    pub fn open_in_memory() -> Result<Self, ApiError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, ApiError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, title, completed FROM todos ORDER BY id")?;
        let rows = stmt.query_map([], row_to_todo)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_todo(&self, id: i64) -> Result<Option<Todo>, ApiError> {
        let conn = self.conn.lock();
        let todo = conn
            .query_row(
                "SELECT id, title, completed FROM todos WHERE id = ?1",
                [id],
                row_to_todo,
            )
            .optional()?;
        Ok(todo)
    }

    /// Insert a new row with `completed = false`; SQLite assigns the id.
    pub fn insert_todo(&self, title: &str) -> Result<Todo, ApiError> {
        let conn = self.conn.lock();
        conn.execute("INSERT INTO todos (title, completed) VALUES (?1, 0)", [title])?;
        Ok(Todo {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            completed: false,
        })
    }

    /// Partial update: only the supplied fields change. Returns the updated
    /// row, or `None` when no row has this id.
    pub fn update_todo(
        &self,
        id: i64,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Option<Todo>, ApiError> {
        let conn = self.conn.lock();
        let changed = match (title, completed) {
            (Some(t), Some(c)) => conn.execute(
                "UPDATE todos SET title = ?1, completed = ?2 WHERE id = ?3",
                params![t, c, id],
            )?,
            (Some(t), None) => {
                conn.execute("UPDATE todos SET title = ?1 WHERE id = ?2", params![t, id])?
            }
            (None, Some(c)) => conn.execute(
                "UPDATE todos SET completed = ?1 WHERE id = ?2",
                params![c, id],
            )?,
            // Callers validate that at least one field is present.
            (None, None) => return Err(ApiError::BadRequest("No fields to update".to_string())),
        };

        if changed == 0 {
            return Ok(None);
        }

        let todo = conn
            .query_row(
                "SELECT id, title, completed FROM todos WHERE id = ?1",
                [id],
                row_to_todo,
            )
            .optional()?;
        Ok(todo)
    }

    /// Returns false when no row had this id.
    pub fn delete_todo(&self, id: i64) -> Result<bool, ApiError> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }
}

fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_fresh_increasing_ids() {
        let db = Db::open_in_memory().unwrap();
        let a = db.insert_todo("first").unwrap();
        let b = db.insert_todo("second").unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.title, "first");
        assert!(!a.completed);
    }

    #[test]
    fn update_completed_leaves_title_untouched() {
        let db = Db::open_in_memory().unwrap();
        let todo = db.insert_todo("Buy milk").unwrap();
        let updated = db.update_todo(todo.id, None, Some(true)).unwrap().unwrap();
        assert_eq!(updated.title, "Buy milk");
        assert!(updated.completed);
    }

    #[test]
    fn update_title_leaves_completed_untouched() {
        let db = Db::open_in_memory().unwrap();
        let todo = db.insert_todo("Buy milk").unwrap();
        db.update_todo(todo.id, None, Some(true)).unwrap();
        let renamed = db
            .update_todo(todo.id, Some("Buy bread"), None)
            .unwrap()
            .unwrap();
        assert_eq!(renamed.title, "Buy bread");
        assert!(renamed.completed);
    }

    #[test]
    fn update_missing_row_returns_none() {
        let db = Db::open_in_memory().unwrap();
        assert!(db.update_todo(42, Some("nope"), None).unwrap().is_none());
    }

    #[test]
    fn delete_then_get_misses() {
        let db = Db::open_in_memory().unwrap();
        let todo = db.insert_todo("gone soon").unwrap();
        assert!(db.delete_todo(todo.id).unwrap());
        assert!(db.get_todo(todo.id).unwrap().is_none());
        assert!(!db.delete_todo(todo.id).unwrap());
    }
}

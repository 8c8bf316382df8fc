//! Local turso database for client state that outlives a session

use std::path::Path;
use tokio::sync::Mutex;
use turso::{Builder, Connection};

pub type DbResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

mod app_state;

/// A single local database connection.
///
/// Access is serialized through a mutex; turso connections are not safe to
/// drive from concurrent tasks.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file and create missing tables.
    pub async fn open(db_path: &Path) -> DbResult<Self> {
        let path = db_path
            .to_str()
            .ok_or("Database path is not valid UTF-8")?;
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        conn.execute_batch(app_state::get_table_sql()).await?;

        log::info!("Opened database at {}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

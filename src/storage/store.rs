use crate::{Error, Result};
use libsql::{Builder, Connection, Database};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
enum Collection {
    Documents,
    DataModules,
}

impl Collection {
    fn table(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::DataModules => "data_modules",
        }
    }

    fn key_column(self) -> &'static str {
        match self {
            Self::Documents => "id",
            Self::DataModules => "dmc",
        }
    }
}

#[derive(Debug, Default)]
struct Fallback {
    settings: Option<Value>,
    documents: Vec<(String, Value)>,
    data_modules: Vec<(String, Value)>,
}

impl Fallback {
    fn rows(&mut self, collection: Collection) -> &mut Vec<(String, Value)> {
        match collection {
            Collection::Documents => &mut self.documents,
            Collection::DataModules => &mut self.data_modules,
        }
    }
}

/// Settings, uploaded documents and data modules, each stored as opaque JSON.
pub struct DocumentStore {
    db: Option<(Database, Connection)>,
    // Only used when the database could not be opened
    fallback: Arc<Mutex<Fallback>>,
}

impl DocumentStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let mut store = Self {
            db: None,
            fallback: Arc::new(Mutex::new(Fallback::default())),
        };

        match store.init_database(db_path).await {
            Ok(()) => {
                info!("Database initialized successfully: {}", db_path);
            }
            Err(e) => {
                warn!(
                    "Database initialization failed, using in-memory fallback: {}",
                    e
                );
            }
        }

        Ok(store)
    }

    async fn init_database(&mut self, db_path: &str) -> Result<()> {
        let db = Builder::new_local(db_path).build().await?;
        let conn = db.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (id INTEGER PRIMARY KEY, data TEXT NOT NULL)",
            (),
        )
        .await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (id TEXT PRIMARY KEY, data TEXT NOT NULL)",
            (),
        )
        .await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS data_modules (dmc TEXT PRIMARY KEY, data TEXT NOT NULL)",
            (),
        )
        .await?;

        self.db = Some((db, conn));
        Ok(())
    }

    pub fn is_persistent(&self) -> bool {
        self.db.is_some()
    }

    fn conn(&self) -> Option<&Connection> {
        self.db.as_ref().map(|(_, conn)| conn)
    }

    fn lock_fallback(&self) -> Result<std::sync::MutexGuard<'_, Fallback>> {
        self.fallback
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))
    }

    pub async fn get_settings(&self) -> Result<Option<Value>> {
        match self.conn() {
            Some(conn) => Self::get_settings_from_db(conn).await,
            None => Ok(self.lock_fallback()?.settings.clone()),
        }
    }

    async fn get_settings_from_db(conn: &Connection) -> Result<Option<Value>> {
        let mut rows = conn.query("SELECT data FROM settings WHERE id = 1", ()).await?;
        match rows.next().await? {
            Some(row) => {
                let data: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    pub async fn save_settings(&self, settings: &Value) -> Result<()> {
        let payload = serde_json::to_string(settings)?;

        if let Some(conn) = self.conn() {
            conn.execute(
                "INSERT OR REPLACE INTO settings (id, data) VALUES (1, ?)",
                [payload.as_str()],
            )
            .await?;
            debug!("Settings saved to database");
            return Ok(());
        }

        self.lock_fallback()?.settings = Some(settings.clone());
        Ok(())
    }

    /// Stores `defaults` as the settings when none exist yet; returns the effective settings.
    pub async fn ensure_settings(&self, defaults: Value) -> Result<Value> {
        match self.get_settings().await? {
            Some(settings) => Ok(settings),
            None => {
                self.save_settings(&defaults).await?;
                Ok(defaults)
            }
        }
    }

    pub async fn insert_document(&self, id: &str, data: &Value) -> Result<()> {
        self.upsert(Collection::Documents, id, data).await
    }

    pub async fn get_document(&self, id: &str) -> Result<Option<Value>> {
        self.get(Collection::Documents, id).await
    }

    pub async fn list_documents(&self) -> Result<Vec<Value>> {
        self.list(Collection::Documents).await
    }

    pub async fn insert_data_module(&self, dmc: &str, data: &Value) -> Result<()> {
        self.upsert(Collection::DataModules, dmc, data).await
    }

    pub async fn get_data_module(&self, dmc: &str) -> Result<Option<Value>> {
        self.get(Collection::DataModules, dmc).await
    }

    pub async fn list_data_modules(&self) -> Result<Vec<Value>> {
        self.list(Collection::DataModules).await
    }

    async fn upsert(&self, collection: Collection, key: &str, data: &Value) -> Result<()> {
        if let Some(conn) = self.conn() {
            Self::upsert_to_db(conn, collection, key, data).await?;
            debug!("Saved {} row: {}", collection.table(), key);
            return Ok(());
        }

        let mut fallback = self.lock_fallback()?;
        let rows = fallback.rows(collection);
        match rows.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = data.clone(),
            None => rows.push((key.to_string(), data.clone())),
        }
        Ok(())
    }

    async fn upsert_to_db(
        conn: &Connection,
        collection: Collection,
        key: &str,
        data: &Value,
    ) -> Result<()> {
        // Upsert in place so listing order stays the first-insert order
        let sql = format!(
            "INSERT INTO {table} ({key}, data) VALUES (?, ?) \
             ON CONFLICT({key}) DO UPDATE SET data = excluded.data",
            table = collection.table(),
            key = collection.key_column()
        );
        conn.execute(&sql, (key, serde_json::to_string(data)?)).await?;
        Ok(())
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        if let Some(conn) = self.conn() {
            return Self::get_from_db(conn, collection, key).await;
        }

        let mut fallback = self.lock_fallback()?;
        Ok(fallback
            .rows(collection)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.clone()))
    }

    async fn get_from_db(
        conn: &Connection,
        collection: Collection,
        key: &str,
    ) -> Result<Option<Value>> {
        let sql = format!(
            "SELECT data FROM {} WHERE {} = ?",
            collection.table(),
            collection.key_column()
        );
        let mut rows = conn.query(&sql, [key]).await?;
        match rows.next().await? {
            Some(row) => {
                let data: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        if let Some(conn) = self.conn() {
            let values = Self::list_from_db(conn, collection).await?;
            debug!("Retrieved {} rows from {}", values.len(), collection.table());
            return Ok(values);
        }

        let mut fallback = self.lock_fallback()?;
        Ok(fallback
            .rows(collection)
            .iter()
            .map(|(_, value)| value.clone())
            .collect())
    }

    async fn list_from_db(conn: &Connection, collection: Collection) -> Result<Vec<Value>> {
        let sql = format!("SELECT data FROM {} ORDER BY rowid ASC", collection.table());
        let mut rows = conn.query(&sql, ()).await?;

        let mut values = Vec::new();
        while let Some(row) = rows.next().await? {
            let data: String = row.get(0)?;
            values.push(serde_json::from_str(&data)?);
        }

        Ok(values)
    }
}

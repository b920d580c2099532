//! Agent registry: the live set of agents the dispatcher routes over.
//!
//! Injected as a trait so the dispatcher always reads fresh state and
//! tests can supply deterministic candidate sets. Two implementations:
//! SQLite for the application, in-memory for tests.

use crate::types::AgentProfile;
use chrono::{DateTime, Utc};
use quorum_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, RwLock};

/// Registry of agents.
#[async_trait::async_trait]
pub trait AgentRegistry: Send + Sync {
    /// List all registered agents, in registration order.
    async fn list_agents(&self) -> AppResult<Vec<AgentProfile>>;

    /// Fetch a single agent by id.
    async fn get_agent(&self, id: &str) -> AppResult<Option<AgentProfile>>;

    /// Register a new agent.
    async fn create_agent(&self, profile: &AgentProfile) -> AppResult<()>;

    /// Remove an agent. Returns false if no such agent existed.
    async fn delete_agent(&self, id: &str) -> AppResult<bool>;
}

/// SQLite-backed registry.
pub struct SqliteRegistry {
    conn: Mutex<Connection>,
}

impl SqliteRegistry {
    /// Open (or create) a registry in the database at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Registry(format!("Failed to create registry directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Registry(format!("Failed to open registry: {}", e)))?;

        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory registry, used by tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Registry(format!("Failed to open registry: {}", e)))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> AppResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                behavioral_prompt TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Registry(format!("Failed to create agents table: {}", e)))?;
        Ok(())
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))
    }

    fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentProfile> {
        let created_at: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(AgentProfile {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            behavioral_prompt: row.get(3)?,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl AgentRegistry for SqliteRegistry {
    async fn list_agents(&self) -> AppResult<Vec<AgentProfile>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, description, behavioral_prompt, created_at
                 FROM agents ORDER BY created_at, id",
            )
            .map_err(|e| AppError::Registry(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], Self::row_to_profile)
            .map_err(|e| AppError::Registry(format!("Failed to query agents: {}", e)))?;

        let mut agents = Vec::new();
        for row in rows {
            agents.push(
                row.map_err(|e| AppError::Registry(format!("Failed to read agent row: {}", e)))?,
            );
        }
        Ok(agents)
    }

    async fn get_agent(&self, id: &str) -> AppResult<Option<AgentProfile>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, description, behavioral_prompt, created_at
                 FROM agents WHERE id = ?1",
            )
            .map_err(|e| AppError::Registry(format!("Failed to prepare query: {}", e)))?;

        let mut rows = stmt
            .query_map(params![id], Self::row_to_profile)
            .map_err(|e| AppError::Registry(format!("Failed to query agent: {}", e)))?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(|e| {
                AppError::Registry(format!("Failed to read agent row: {}", e))
            })?)),
            None => Ok(None),
        }
    }

    async fn create_agent(&self, profile: &AgentProfile) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO agents (id, name, description, behavioral_prompt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile.id,
                profile.name,
                profile.description,
                profile.behavioral_prompt,
                profile.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Registry(format!("Failed to create agent: {}", e)))?;

        tracing::info!("Registered agent '{}' ({})", profile.name, profile.id);
        Ok(())
    }

    async fn delete_agent(&self, id: &str) -> AppResult<bool> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM agents WHERE id = ?1", params![id])
            .map_err(|e| AppError::Registry(format!("Failed to delete agent: {}", e)))?;

        Ok(removed > 0)
    }
}

/// In-memory registry for tests and ephemeral setups.
#[derive(Default)]
pub struct InMemoryRegistry {
    agents: RwLock<Vec<AgentProfile>>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the given profiles.
    pub fn with_agents(agents: Vec<AgentProfile>) -> Self {
        Self {
            agents: RwLock::new(agents),
        }
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, Vec<AgentProfile>>> {
        self.agents
            .read()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, Vec<AgentProfile>>> {
        self.agents
            .write()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl AgentRegistry for InMemoryRegistry {
    async fn list_agents(&self) -> AppResult<Vec<AgentProfile>> {
        Ok(self.read()?.clone())
    }

    async fn get_agent(&self, id: &str) -> AppResult<Option<AgentProfile>> {
        Ok(self.read()?.iter().find(|a| a.id == id).cloned())
    }

    async fn create_agent(&self, profile: &AgentProfile) -> AppResult<()> {
        self.write()?.push(profile.clone());
        Ok(())
    }

    async fn delete_agent(&self, id: &str) -> AppResult<bool> {
        let mut agents = self.write()?;
        let before = agents.len();
        agents.retain(|a| a.id != id);
        Ok(agents.len() < before)
    }
}

//! DuckDB-backed warehouse for harvested issue and Q&A records.
//!
//! Every entity kind is stored in four structurally identical partition
//! tables selected by [`WindowTag`]. Writes are plain inserts: the poller
//! re-walks upstream data every cycle and duplicate rows across cycles are
//! accepted behavior.

pub mod duckdb;
pub mod migrations;
pub mod window;

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::params;
use thiserror::Error;

pub use crate::duckdb::{DuckDbConnectionManager, PooledConnection};
pub use crate::window::{EntityKind, WindowTag};

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub db_path: PathBuf,
    pub max_pool_size: usize,
}

impl WarehouseConfig {
    pub fn at(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            max_pool_size: 2,
        }
    }
}

/// Storage shape of a GitHub issue. Timestamps are RFC3339 strings cast to
/// TIMESTAMP at insert time.
#[derive(Debug, Clone)]
pub struct IssueRow {
    pub github_id: i64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Storage shape of a Stack Exchange question.
#[derive(Debug, Clone)]
pub struct QuestionRow {
    pub question_id: i64,
    pub title: String,
    pub body: Option<String>,
    pub is_answered: bool,
    pub creation_date: Option<i64>,
}

/// Storage shape of a Stack Exchange answer, keyed back to its question.
#[derive(Debug, Clone)]
pub struct AnswerRow {
    pub answer_id: i64,
    pub question_id: i64,
    pub body: Option<String>,
}

#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open (or create) the warehouse and apply migrations.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        let warehouse = Self { manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Insert one issue into the partition bound to `window`.
    pub fn insert_issue(&self, window: WindowTag, row: &IssueRow) -> Result<(), WarehouseError> {
        let table = window.table(EntityKind::Issue);
        let sql = format!(
            "INSERT INTO {table} (github_id, title, body, state, created_at, updated_at) \
             VALUES (?, ?, ?, ?, TRY_CAST(? AS TIMESTAMP), TRY_CAST(? AS TIMESTAMP))"
        );

        let connection = self.manager.acquire()?;
        connection.execute(
            &sql,
            params![
                row.github_id,
                row.title,
                row.body,
                row.state,
                row.created_at,
                row.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Insert one question into the partition bound to `window`.
    pub fn insert_question(
        &self,
        window: WindowTag,
        row: &QuestionRow,
    ) -> Result<(), WarehouseError> {
        let table = window.table(EntityKind::Question);
        let sql = format!(
            "INSERT INTO {table} (question_id, title, body, is_answered, creation_date) \
             VALUES (?, ?, ?, ?, ?)"
        );

        let connection = self.manager.acquire()?;
        connection.execute(
            &sql,
            params![
                row.question_id,
                row.title,
                row.body,
                row.is_answered,
                row.creation_date,
            ],
        )?;
        Ok(())
    }

    /// Insert one answer into the partition bound to `window`.
    pub fn insert_answer(&self, window: WindowTag, row: &AnswerRow) -> Result<(), WarehouseError> {
        let table = window.table(EntityKind::Answer);
        let sql = format!(
            "INSERT INTO {table} (answer_id, question_id, body) VALUES (?, ?, ?)"
        );

        let connection = self.manager.acquire()?;
        connection.execute(&sql, params![row.answer_id, row.question_id, row.body])?;
        Ok(())
    }

    /// Row count of one partition table.
    pub fn partition_count(
        &self,
        window: WindowTag,
        kind: EntityKind,
    ) -> Result<i64, WarehouseError> {
        let table = window.table(kind);
        let connection = self.manager.acquire()?;
        let count = connection.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// Answer/question id pairs stored in one answer partition.
    pub fn answer_links(&self, window: WindowTag) -> Result<Vec<(i64, i64)>, WarehouseError> {
        let table = window.table(EntityKind::Answer);
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(&format!(
            "SELECT answer_id, question_id FROM {table} ORDER BY row_id"
        ))?;
        let rows = statement
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(i64, i64)>, _>>()?;
        Ok(rows)
    }
}

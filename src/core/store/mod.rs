//! SQLite-backed bill-of-materials store
//!
//! Each project owns exactly one generation of consolidated BOM lines.
//! A generation is written in a single `BEGIN IMMEDIATE` transaction:
//! readers see either the previous complete set or the new one, and two
//! generators for the same project are serialized by SQLite's write lock.

mod queries;
mod schema;
mod types;

pub use types::*;

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::core::error::CalcError;
use crate::core::fraction::round_cents;
use crate::core::identity::EntityId;
use crate::entities::bom::{BomLineItem, BomStatus, MaterialType, Uom};

/// Database file name inside `.cabkit/`
pub const STORE_FILE_NAME: &str = "shop.db";

/// Current schema version - a database at any other version is refused
const SCHEMA_VERSION: i32 = 1;

/// How long a writer waits for another generator to release the lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BomStore {
    conn: Connection,
}

impl BomStore {
    /// Open or create the store at a path
    pub fn open_at(path: &Path) -> Result<Self, CalcError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CalcError::Storage(e.to_string()))?;
        }

        let conn = Connection::open(path)?;
        // journal_mode returns a row, so it cannot go through execute()
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
        Self::with_connection(conn)
    }

    /// Private in-memory store, used by tests
    pub fn open_in_memory() -> Result<Self, CalcError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CalcError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let mut store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Replace a project's bill of materials with freshly generated lines
    ///
    /// Fails with `Conflict` when the project already has a generation and
    /// `overwrite` is false. Any error leaves the previous generation intact.
    pub fn generate(
        &mut self,
        project_id: &EntityId,
        lines: &[BomLineItem],
        input_hash: &str,
        overwrite: bool,
    ) -> Result<GenerationSummary, CalcError> {
        if let Some(stray) = lines.iter().find(|l| &l.project_id != project_id) {
            return Err(CalcError::invalid(
                "project_id",
                format!("line {} belongs to project {}", stray.id, stray.project_id),
            ));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous: Option<i64> = tx
            .query_row(
                "SELECT generation FROM bom_generations WHERE project_id = ?1",
                params![project_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        if previous.is_some() && !overwrite {
            return Err(CalcError::Conflict(format!(
                "project {} already has a bill of materials",
                project_id
            )));
        }

        tx.execute(
            "DELETE FROM bom_line_sources WHERE line_id IN
                (SELECT id FROM bom_lines WHERE project_id = ?1)",
            params![project_id.to_string()],
        )?;
        let replaced = tx.execute(
            "DELETE FROM bom_lines WHERE project_id = ?1",
            params![project_id.to_string()],
        )?;

        {
            let mut insert_line = tx.prepare(
                "INSERT INTO bom_lines
                    (id, project_id, cabinet_id, name, material_type, quantity, uom,
                     unit_cost, total_cost, status, created, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            let mut insert_source = tx.prepare(
                "INSERT OR IGNORE INTO bom_line_sources (line_id, cabinet_id) VALUES (?1, ?2)",
            )?;

            for (position, line) in lines.iter().enumerate() {
                insert_line.execute(params![
                    line.id.to_string(),
                    project_id.to_string(),
                    line.cabinet_id.as_ref().map(|id| id.to_string()),
                    line.name,
                    line.material_type.as_str(),
                    line.quantity,
                    line.uom.as_str(),
                    line.unit_cost,
                    line.total_cost,
                    line.status.as_str(),
                    line.created.to_rfc3339(),
                    position as i64,
                ])?;
                for source in &line.source_cabinet_ids {
                    insert_source.execute(params![line.id.to_string(), source.to_string()])?;
                }
            }
        }

        let generation = previous.unwrap_or(0) + 1;
        let total_cost = round_cents(lines.iter().map(|l| l.total_cost).sum());
        let generated_at = Utc::now();

        tx.execute(
            "INSERT OR REPLACE INTO bom_generations
                (project_id, generation, input_hash, line_count, total_cost, generated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project_id.to_string(),
                generation,
                input_hash,
                lines.len() as i64,
                total_cost,
                generated_at.to_rfc3339(),
            ],
        )?;

        tx.commit()?;

        tracing::info!(
            project = %project_id,
            generation,
            lines = lines.len(),
            replaced,
            "bill of materials generated"
        );

        Ok(GenerationSummary {
            project_id: project_id.clone(),
            generation,
            line_count: lines.len(),
            total_cost,
            replaced,
            input_hash: input_hash.to_string(),
            generated_at,
        })
    }

    /// Contributing cabinets of one line
    fn sources_for(&self, line_id: &str) -> Result<Vec<EntityId>, CalcError> {
        let mut stmt = self.conn.prepare(
            "SELECT cabinet_id FROM bom_line_sources WHERE line_id = ?1 ORDER BY cabinet_id",
        )?;
        let ids = stmt
            .query_map(params![line_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        ids.iter()
            .map(|s| parse_id(s))
            .collect()
    }

    /// Attach sources to lines read with [`LINE_COLUMNS`]
    fn hydrate(&self, rows: Vec<RawLine>) -> Result<Vec<BomLineItem>, CalcError> {
        rows.into_iter()
            .map(|raw| {
                let sources = self.sources_for(&raw.id)?;
                raw.into_item(sources)
            })
            .collect()
    }
}

/// Column list matching [`RawLine::from_row`]
const LINE_COLUMNS: &str = "id, project_id, cabinet_id, name, material_type, quantity, uom,
     unit_cost, total_cost, status, created";

/// A `bom_lines` row before ids and enums are parsed
struct RawLine {
    id: String,
    project_id: String,
    cabinet_id: Option<String>,
    name: String,
    material_type: String,
    quantity: f64,
    uom: String,
    unit_cost: f64,
    total_cost: f64,
    status: String,
    created: String,
}

impl RawLine {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            cabinet_id: row.get(2)?,
            name: row.get(3)?,
            material_type: row.get(4)?,
            quantity: row.get(5)?,
            uom: row.get(6)?,
            unit_cost: row.get(7)?,
            total_cost: row.get(8)?,
            status: row.get(9)?,
            created: row.get(10)?,
        })
    }

    fn into_item(self, source_cabinet_ids: Vec<EntityId>) -> Result<BomLineItem, CalcError> {
        Ok(BomLineItem {
            id: parse_id(&self.id)?,
            project_id: parse_id(&self.project_id)?,
            cabinet_id: self.cabinet_id.as_deref().map(parse_id).transpose()?,
            source_cabinet_ids,
            name: self.name,
            material_type: self
                .material_type
                .parse::<MaterialType>()
                .map_err(CalcError::Storage)?,
            quantity: self.quantity,
            uom: self.uom.parse::<Uom>().map_err(CalcError::Storage)?,
            unit_cost: self.unit_cost,
            total_cost: self.total_cost,
            status: self.status.parse::<BomStatus>().map_err(CalcError::Storage)?,
            created: parse_datetime(&self.created),
        })
    }
}

fn parse_id(s: &str) -> Result<EntityId, CalcError> {
    s.parse()
        .map_err(|e| CalcError::Storage(format!("corrupt id '{}': {}", s, e)))
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

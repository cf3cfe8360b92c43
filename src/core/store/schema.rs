//! Store schema creation

use rusqlite::{params, OptionalExtension};

use super::{BomStore, SCHEMA_VERSION};
use crate::core::error::CalcError;

impl BomStore {
    /// Create tables on first open, refuse databases written by another schema
    pub(super) fn init_schema(&mut self) -> Result<(), CalcError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER NOT NULL
            );

            -- One row per consolidated BOM line
            CREATE TABLE IF NOT EXISTS bom_lines (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                cabinet_id TEXT,
                name TEXT NOT NULL,
                material_type TEXT NOT NULL,
                quantity REAL NOT NULL,
                uom TEXT NOT NULL,
                unit_cost REAL NOT NULL,
                total_cost REAL NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created TEXT NOT NULL,
                position INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_bom_lines_project ON bom_lines(project_id);
            CREATE INDEX IF NOT EXISTS idx_bom_lines_cabinet ON bom_lines(cabinet_id);

            -- Cabinets that contributed to each line
            CREATE TABLE IF NOT EXISTS bom_line_sources (
                line_id TEXT NOT NULL,
                cabinet_id TEXT NOT NULL,
                PRIMARY KEY (line_id, cabinet_id)
            );

            CREATE INDEX IF NOT EXISTS idx_bom_sources_cabinet ON bom_line_sources(cabinet_id);

            -- Latest generation per project
            CREATE TABLE IF NOT EXISTS bom_generations (
                project_id TEXT PRIMARY KEY,
                generation INTEGER NOT NULL,
                input_hash TEXT NOT NULL,
                line_count INTEGER NOT NULL,
                total_cost REAL NOT NULL,
                generated_at TEXT NOT NULL
            );
            "#,
        )?;

        let existing: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
            .optional()?;

        match existing {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(version) if version == SCHEMA_VERSION => {}
            Some(version) => {
                return Err(CalcError::Storage(format!(
                    "database schema version {} is not supported (expected {})",
                    version, SCHEMA_VERSION
                )));
            }
        }

        Ok(())
    }
}

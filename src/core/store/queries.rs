//! Store read queries and status updates

use rusqlite::{params, OptionalExtension, TransactionBehavior};
use std::collections::BTreeSet;

use super::{parse_datetime, BomStore, GenerationInfo, RawLine, LINE_COLUMNS};
use super::{BulkUpdateSummary, CabinetBom, GroupSummary, ProjectBom};
use crate::core::error::CalcError;
use crate::core::fraction::round_cents;
use crate::core::identity::EntityId;
use crate::entities::bom::{BomLineItem, BomStatus, MaterialType};

impl BomStore {
    /// Whether a project has a stored generation
    pub fn has_generation(&self, project_id: &EntityId) -> Result<bool, CalcError> {
        Ok(self.generation_info(project_id)?.is_some())
    }

    fn generation_info(&self, project_id: &EntityId) -> Result<Option<GenerationInfo>, CalcError> {
        let row: Option<(i64, String, String)> = self
            .conn
            .query_row(
                "SELECT generation, input_hash, generated_at FROM bom_generations
                 WHERE project_id = ?1",
                params![project_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        Ok(row.map(|(generation, input_hash, generated_at)| GenerationInfo {
            generation,
            input_hash,
            generated_at: parse_datetime(&generated_at),
        }))
    }

    /// Every line of a project with per-type and per-status rollups
    pub fn by_project(&self, project_id: &EntityId) -> Result<ProjectBom, CalcError> {
        let generation = self
            .generation_info(project_id)?
            .ok_or_else(|| CalcError::NotFound {
                kind: "bill of materials",
                id: project_id.to_string(),
            })?;

        let sql = format!(
            "SELECT {} FROM bom_lines WHERE project_id = ?1 ORDER BY position",
            LINE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![project_id.to_string()], RawLine::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        let items = self.hydrate(rows)?;

        let by_material_type = MaterialType::all()
            .iter()
            .filter_map(|t| summarize(t.as_str(), items.iter().filter(|i| i.material_type == *t)))
            .collect();
        let by_status = BomStatus::all()
            .iter()
            .filter_map(|s| summarize(s.as_str(), items.iter().filter(|i| i.status == *s)))
            .collect();

        Ok(ProjectBom {
            project_id: project_id.clone(),
            total_cost: total_of(&items),
            items,
            by_material_type,
            by_status,
            generation,
        })
    }

    /// Lines a cabinet contributed to, merged lines included
    pub fn by_cabinet(&self, cabinet_id: &EntityId) -> Result<CabinetBom, CalcError> {
        let sql = format!(
            "SELECT {} FROM bom_lines
             WHERE cabinet_id = ?1
                OR id IN (SELECT line_id FROM bom_line_sources WHERE cabinet_id = ?1)
             ORDER BY project_id, position",
            LINE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![cabinet_id.to_string()], RawLine::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            return Err(CalcError::NotFound {
                kind: "cabinet",
                id: cabinet_id.to_string(),
            });
        }

        let items = self.hydrate(rows)?;
        Ok(CabinetBom {
            cabinet_id: cabinet_id.clone(),
            total_cost: total_of(&items),
            items,
        })
    }

    pub fn get_line(&self, id: &EntityId) -> Result<BomLineItem, CalcError> {
        let sql = format!("SELECT {} FROM bom_lines WHERE id = ?1", LINE_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, params![id.to_string()], RawLine::from_row)
            .optional()?
            .ok_or_else(|| CalcError::NotFound {
                kind: "BOM line",
                id: id.to_string(),
            })?;

        let mut items = self.hydrate(vec![raw])?;
        items.pop().ok_or_else(|| CalcError::Storage("line vanished while reading".to_string()))
    }

    /// Set many lines to one status in a single transaction
    ///
    /// Unknown ids are skipped; duplicates count once. Moving a line
    /// backwards is allowed here (stock corrections) but is logged.
    pub fn bulk_update_status(
        &mut self,
        ids: &[EntityId],
        status: BomStatus,
    ) -> Result<BulkUpdateSummary, CalcError> {
        if ids.is_empty() {
            return Err(CalcError::invalid("ids", "at least one BOM line id is required"));
        }

        let distinct: BTreeSet<&EntityId> = ids.iter().collect();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut updated = 0;
        let mut regressions = 0;
        {
            let mut current = tx.prepare("SELECT status FROM bom_lines WHERE id = ?1")?;
            let mut update = tx.prepare("UPDATE bom_lines SET status = ?1 WHERE id = ?2")?;

            for id in &distinct {
                let Some(previous) = current
                    .query_row(params![id.to_string()], |row| row.get::<_, String>(0))
                    .optional()?
                else {
                    tracing::debug!(line = %id, "skipping unknown BOM line");
                    continue;
                };

                let previous: BomStatus = previous.parse().map_err(CalcError::Storage)?;
                if !previous.can_advance_to(status) {
                    regressions += 1;
                    tracing::warn!(line = %id, from = %previous, to = %status, "BOM line status moved backwards");
                }
                updated += update.execute(params![status.as_str(), id.to_string()])?;
            }
        }
        tx.commit()?;

        tracing::info!(requested = distinct.len(), updated, %status, "bulk status update");

        Ok(BulkUpdateSummary {
            requested: distinct.len(),
            updated,
            regressions,
        })
    }

    /// Advance a single line; backwards moves are rejected
    pub fn set_status(&mut self, id: &EntityId, status: BomStatus) -> Result<BomLineItem, CalcError> {
        let line = self.get_line(id)?;
        if !line.status.can_advance_to(status) {
            return Err(CalcError::invalid(
                "status",
                format!("cannot move {} from {} back to {}", id, line.status, status),
            ));
        }

        self.conn.execute(
            "UPDATE bom_lines SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.to_string()],
        )?;
        tracing::info!(line = %id, from = %line.status, to = %status, "BOM line status updated");

        Ok(BomLineItem { status, ..line })
    }
}

fn summarize<'a>(key: &str, items: impl Iterator<Item = &'a BomLineItem>) -> Option<GroupSummary> {
    let (count, total) = items.fold((0, 0.0), |(n, t), item| (n + 1, t + item.total_cost));
    (count > 0).then(|| GroupSummary {
        key: key.to_string(),
        count,
        total_cost: round_cents(total),
    })
}

fn total_of(items: &[BomLineItem]) -> f64 {
    round_cents(items.iter().map(|i| i.total_cost).sum())
}

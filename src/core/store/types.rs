//! Store result types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::identity::EntityId;
use crate::entities::bom::BomLineItem;

/// Outcome of persisting a generated bill of materials
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub project_id: EntityId,
    /// Bumped on every successful generation of this project
    pub generation: i64,
    pub line_count: usize,
    pub total_cost: f64,
    /// Lines discarded from the previous generation
    pub replaced: usize,
    pub input_hash: String,
    pub generated_at: DateTime<Utc>,
}

/// Count and cost of the lines sharing one key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub total_cost: f64,
}

/// Metadata of the latest generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationInfo {
    pub generation: i64,
    pub input_hash: String,
    pub generated_at: DateTime<Utc>,
}

/// Full bill of materials for a project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectBom {
    pub project_id: EntityId,
    pub items: Vec<BomLineItem>,
    pub by_material_type: Vec<GroupSummary>,
    pub by_status: Vec<GroupSummary>,
    pub total_cost: f64,
    pub generation: GenerationInfo,
}

/// Lines a cabinet contributed to, including merged lines
#[derive(Debug, Clone, Serialize)]
pub struct CabinetBom {
    pub cabinet_id: EntityId,
    pub items: Vec<BomLineItem>,
    pub total_cost: f64,
}

/// Result of a bulk status change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkUpdateSummary {
    /// Distinct ids requested
    pub requested: usize,
    /// Lines found and set to the new status
    pub updated: usize,
    /// Lines moved backwards in the lifecycle
    pub regressions: usize,
}

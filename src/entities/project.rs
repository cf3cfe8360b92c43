//! Project tree: project → rooms → locations → cabinet runs → cabinets
//!
//! Project files live under `projects/` as `PRJ-<ulid>.cab.yaml`. They are
//! maintained by the shop's ERP and read here only to drive BOM generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::CalcError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::cabinet::{
    CabinetInput, CabinetType, Component, ComponentKind, Exterior, FaceFrameStyle, SlideLength,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectTree {
    pub id: EntityId,
    pub name: String,

    #[serde(default)]
    pub rooms: Vec<Room>,

    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub runs: Vec<CabinetRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinetRun {
    pub name: String,
    #[serde(default)]
    pub cabinets: Vec<CabinetRecord>,
}

/// A cabinet as recorded in the project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinetRecord {
    pub id: EntityId,
    pub name: String,
    pub cabinet_type: CabinetType,

    /// Linear length along the wall (exterior width)
    pub length: f64,
    pub height: f64,
    pub depth: f64,

    /// Overrides the number of drawer components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawer_count: Option<u32>,

    /// Overrides the number of door components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toe_kick_height: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawer_slide_length: Option<SlideLength>,

    #[serde(default)]
    pub face_frame_style: FaceFrameStyle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_standards_id: Option<String>,
}

impl ProjectTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Prj),
            name: name.into(),
            rooms: Vec::new(),
            created: Utc::now(),
        }
    }

    /// Load a project file
    pub fn load(path: &Path) -> Result<Self, CalcError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CalcError::NotFound {
                    kind: "project",
                    id: path.display().to_string(),
                }
            } else {
                CalcError::Storage(e.to_string())
            }
        })?;
        serde_yml::from_str(&contents)
            .map_err(|e| CalcError::invalid(path.display().to_string(), e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), CalcError> {
        let yaml = serde_yml::to_string(self).map_err(|e| CalcError::Storage(e.to_string()))?;
        std::fs::write(path, yaml).map_err(|e| CalcError::Storage(format!("{}: {}", path.display(), e)))
    }

    /// Every cabinet in tree order
    pub fn cabinets(&self) -> Vec<&CabinetRecord> {
        self.rooms
            .iter()
            .flat_map(|room| room.locations.iter())
            .flat_map(|location| location.runs.iter())
            .flat_map(|run| run.cabinets.iter())
            .collect()
    }

    pub fn find_cabinet(&self, id: &EntityId) -> Option<&CabinetRecord> {
        self.cabinets().into_iter().find(|c| &c.id == id)
    }
}

impl CabinetRecord {
    pub fn new(name: impl Into<String>, cabinet_type: CabinetType, length: f64, height: f64, depth: f64) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Cab),
            name: name.into(),
            cabinet_type,
            length,
            height,
            depth,
            drawer_count: None,
            door_count: None,
            toe_kick_height: None,
            components: Vec::new(),
            drawer_slide_length: None,
            face_frame_style: FaceFrameStyle::default(),
            construction_standards_id: None,
        }
    }

    pub fn drawer_count(&self) -> u32 {
        self.drawer_count
            .unwrap_or_else(|| self.count_of(ComponentKind::Drawer))
    }

    pub fn door_count(&self) -> u32 {
        self.door_count
            .unwrap_or_else(|| self.count_of(ComponentKind::Door))
    }

    fn count_of(&self, kind: ComponentKind) -> u32 {
        self.components.iter().filter(|c| c.kind == kind).count() as u32
    }

    /// Calculator input for this cabinet
    pub fn to_input(&self) -> CabinetInput {
        CabinetInput {
            exterior: Exterior {
                width: self.length,
                height: self.height,
                depth: self.depth,
            },
            toe_kick_height: self.toe_kick_height,
            cabinet_type: self.cabinet_type,
            components: self.components.clone(),
            construction_standards_id: self.construction_standards_id.clone(),
            drawer_slide_length: self.drawer_slide_length,
            auto_adjust_depth: false,
            face_frame_style: self.face_frame_style,
            face_frame_stile_width: None,
            face_frame_rail_width: None,
        }
    }
}

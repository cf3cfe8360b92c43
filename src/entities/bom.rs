//! Bill-of-materials line items and their procurement lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::identity::{EntityId, EntityPrefix};

/// Material category of a BOM line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    SheetGood,
    Hardware,
    EdgeBanding,
    Finish,
    Other,
}

impl MaterialType {
    pub fn all() -> &'static [MaterialType] {
        &[
            MaterialType::SheetGood,
            MaterialType::Hardware,
            MaterialType::EdgeBanding,
            MaterialType::Finish,
            MaterialType::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::SheetGood => "sheet_good",
            MaterialType::Hardware => "hardware",
            MaterialType::EdgeBanding => "edge_banding",
            MaterialType::Finish => "finish",
            MaterialType::Other => "other",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MaterialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid material type: {}", s))
    }
}

/// Unit of measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Uom {
    /// Square feet
    Sqft,
    Each,
    Pair,
    /// Linear feet
    Lf,
}

impl Uom {
    pub fn as_str(&self) -> &'static str {
        match self {
            Uom::Sqft => "sqft",
            Uom::Each => "each",
            Uom::Pair => "pair",
            Uom::Lf => "lf",
        }
    }
}

impl fmt::Display for Uom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Uom {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqft" => Ok(Uom::Sqft),
            "each" => Ok(Uom::Each),
            "pair" => Ok(Uom::Pair),
            "lf" => Ok(Uom::Lf),
            _ => Err(format!("Invalid unit of measure: {}", s)),
        }
    }
}

/// Procurement status, in lifecycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BomStatus {
    #[default]
    Pending,
    Ordered,
    Received,
    Issued,
}

impl BomStatus {
    pub fn all() -> &'static [BomStatus] {
        &[
            BomStatus::Pending,
            BomStatus::Ordered,
            BomStatus::Received,
            BomStatus::Issued,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BomStatus::Pending => "pending",
            BomStatus::Ordered => "ordered",
            BomStatus::Received => "received",
            BomStatus::Issued => "issued",
        }
    }

    /// Forward-only transition check for single-line updates
    pub fn can_advance_to(&self, next: BomStatus) -> bool {
        next >= *self
    }
}

impl fmt::Display for BomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BomStatus::Pending),
            "ordered" => Ok(BomStatus::Ordered),
            "received" => Ok(BomStatus::Received),
            "issued" => Ok(BomStatus::Issued),
            _ => Err(format!(
                "Invalid status: {} (expected pending, ordered, received or issued)",
                s
            )),
        }
    }
}

/// One priced material or hardware line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLineItem {
    pub id: EntityId,

    pub project_id: EntityId,

    /// Cleared once lines from different cabinets are merged
    pub cabinet_id: Option<EntityId>,

    /// Every cabinet that contributed to this line
    #[serde(default)]
    pub source_cabinet_ids: Vec<EntityId>,

    pub name: String,
    pub material_type: MaterialType,
    pub quantity: f64,
    pub uom: Uom,
    pub unit_cost: f64,
    pub total_cost: f64,

    #[serde(default)]
    pub status: BomStatus,

    pub created: DateTime<Utc>,
}

impl BomLineItem {
    pub fn is_ordered(&self) -> bool {
        self.status >= BomStatus::Ordered
    }

    pub fn is_received(&self) -> bool {
        self.status >= BomStatus::Received
    }

    pub fn is_issued(&self) -> bool {
        self.status == BomStatus::Issued
    }

    /// Fresh id for a line being persisted
    pub fn assign_id(&mut self) {
        self.id = EntityId::new(EntityPrefix::Bom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_order() {
        assert!(BomStatus::Pending < BomStatus::Ordered);
        assert!(BomStatus::Received < BomStatus::Issued);
        assert!(BomStatus::Ordered.can_advance_to(BomStatus::Received));
        assert!(BomStatus::Ordered.can_advance_to(BomStatus::Ordered));
        assert!(!BomStatus::Issued.can_advance_to(BomStatus::Pending));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Ordered".parse::<BomStatus>().unwrap(), BomStatus::Ordered);
        assert!("lost".parse::<BomStatus>().is_err());
    }

    #[test]
    fn test_material_type_roundtrip() {
        for t in MaterialType::all() {
            assert_eq!(t.as_str().parse::<MaterialType>().unwrap(), *t);
        }
        let json = serde_json::to_string(&MaterialType::EdgeBanding).unwrap();
        assert_eq!(json, "\"edge_banding\"");
    }

    #[test]
    fn test_uom_serde() {
        assert_eq!(serde_json::to_string(&Uom::Sqft).unwrap(), "\"sqft\"");
        assert_eq!("LF".parse::<Uom>().unwrap(), Uom::Lf);
    }
}

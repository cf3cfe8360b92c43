//! Bill-of-materials generation and consolidation
//!
//! Every cabinet in a project yields a handful of candidate lines (box
//! plywood, back panel, slides, hinges, edge banding). Candidates with the
//! same material type and name are then merged into one line per material,
//! keeping the contributing cabinet ids.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::CalcError;
use crate::core::fraction::{round_cents, round_to};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::engine::cabinet::CabinetDimensionCalculator;
use crate::entities::bom::{BomLineItem, BomStatus, MaterialType, Uom};
use crate::entities::project::{CabinetRecord, ProjectTree};

/// Names of the generated lines
pub mod line_names {
    pub const CABINET_BOX: &str = "3/4\" Plywood - Cabinet Box";
    pub const BACK_PANEL: &str = "1/4\" Plywood - Back Panel";
    pub const DRAWER_SLIDES: &str = "Drawer Slides (pair)";
    pub const HINGES: &str = "Concealed Hinges";
    pub const EDGE_BANDING: &str = "Edge Banding";
}

pub const HINGES_PER_DOOR: u32 = 2;

/// Default unit costs in US dollars, overridable from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCosts {
    /// Per square foot
    pub cabinet_box_plywood: f64,
    /// Per square foot
    pub back_panel_plywood: f64,
    /// Per pair
    pub drawer_slide_pair: f64,
    pub hinge: f64,
    /// Per linear foot
    pub edge_banding: f64,
}

impl Default for UnitCosts {
    fn default() -> Self {
        Self {
            cabinet_box_plywood: 3.50,
            back_panel_plywood: 1.50,
            drawer_slide_pair: 35.00,
            hinge: 5.00,
            edge_banding: 0.50,
        }
    }
}

pub struct BomGenerator {
    costs: UnitCosts,
    calculator: CabinetDimensionCalculator,
}

impl BomGenerator {
    pub fn new(costs: UnitCosts, calculator: CabinetDimensionCalculator) -> Self {
        Self { costs, calculator }
    }

    pub fn costs(&self) -> &UnitCosts {
        &self.costs
    }

    /// Consolidated lines for a whole project
    ///
    /// Every cabinet is sized first; one geometry error fails the project.
    pub fn generate(&self, project: &ProjectTree) -> Result<Vec<BomLineItem>, CalcError> {
        Ok(consolidate(self.candidates(project)?))
    }

    /// Unmerged lines, cabinet by cabinet in tree order
    pub fn candidates(&self, project: &ProjectTree) -> Result<Vec<BomLineItem>, CalcError> {
        let per_cabinet = project
            .cabinets()
            .par_iter()
            .map(|cabinet| {
                self.calculator
                    .calculate_from_exterior(&cabinet.to_input())
                    .map_err(|e| match e {
                        CalcError::InvalidArgument { field, message } => CalcError::InvalidArgument {
                            field: format!("{}.{}", cabinet.id, field),
                            message,
                        },
                        CalcError::InfeasibleGeometry { quantity, value } => {
                            CalcError::InfeasibleGeometry {
                                quantity: format!("{}.{}", cabinet.id, quantity),
                                value,
                            }
                        }
                        other => other,
                    })?;
                Ok(self.cabinet_lines(&project.id, cabinet))
            })
            .collect::<Result<Vec<_>, CalcError>>()?;

        Ok(per_cabinet.into_iter().flatten().collect())
    }

    fn cabinet_lines(&self, project_id: &EntityId, cabinet: &CabinetRecord) -> Vec<BomLineItem> {
        let (l, h, d) = (cabinet.length, cabinet.height, cabinet.depth);
        let c = &self.costs;

        let mut lines = vec![
            candidate(
                project_id,
                cabinet,
                line_names::CABINET_BOX,
                MaterialType::SheetGood,
                (2.0 * d * h + 2.0 * l * d) / 144.0,
                Uom::Sqft,
                c.cabinet_box_plywood,
            ),
            candidate(
                project_id,
                cabinet,
                line_names::BACK_PANEL,
                MaterialType::SheetGood,
                l * h / 144.0,
                Uom::Sqft,
                c.back_panel_plywood,
            ),
        ];

        let drawers = cabinet.drawer_count();
        if drawers > 0 {
            lines.push(candidate(
                project_id,
                cabinet,
                line_names::DRAWER_SLIDES,
                MaterialType::Hardware,
                f64::from(drawers),
                Uom::Pair,
                c.drawer_slide_pair,
            ));
        }

        let hinges = cabinet.door_count() * HINGES_PER_DOOR;
        if hinges > 0 {
            lines.push(candidate(
                project_id,
                cabinet,
                line_names::HINGES,
                MaterialType::Hardware,
                f64::from(hinges),
                Uom::Each,
                c.hinge,
            ));
        }

        lines.push(candidate(
            project_id,
            cabinet,
            line_names::EDGE_BANDING,
            MaterialType::EdgeBanding,
            round_to(l / 12.0 * 4.0, 1),
            Uom::Lf,
            c.edge_banding,
        ));

        lines
    }
}

fn candidate(
    project_id: &EntityId,
    cabinet: &CabinetRecord,
    name: &str,
    material_type: MaterialType,
    quantity: f64,
    uom: Uom,
    unit_cost: f64,
) -> BomLineItem {
    let quantity = round_to(quantity, 2);
    BomLineItem {
        id: EntityId::new(EntityPrefix::Bom),
        project_id: project_id.clone(),
        cabinet_id: Some(cabinet.id.clone()),
        source_cabinet_ids: vec![cabinet.id.clone()],
        name: name.to_string(),
        material_type,
        quantity,
        uom,
        unit_cost,
        total_cost: round_cents(quantity * unit_cost),
        status: BomStatus::Pending,
        created: chrono::Utc::now(),
    }
}

/// Merge lines sharing a material type and name
///
/// Output is ordered by material type then name. Members of a group are
/// summed in a fixed order, so the result does not depend on input order,
/// and consolidating twice changes nothing.
pub fn consolidate(items: Vec<BomLineItem>) -> Vec<BomLineItem> {
    let mut groups: BTreeMap<(MaterialType, String), Vec<BomLineItem>> = BTreeMap::new();
    for item in items {
        groups
            .entry((item.material_type, item.name.clone()))
            .or_default()
            .push(item);
    }

    groups.into_values().filter_map(merge_group).collect()
}

fn merge_group(mut members: Vec<BomLineItem>) -> Option<BomLineItem> {
    members.sort_by(|a, b| {
        sources_of(a)
            .cmp(&sources_of(b))
            .then(a.quantity.total_cmp(&b.quantity))
            .then(a.total_cost.total_cmp(&b.total_cost))
            .then(a.id.cmp(&b.id))
    });

    let sources: Vec<EntityId> = members
        .iter()
        .flat_map(sources_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let quantity = round_to(members.iter().map(|m| m.quantity).sum(), 2);
    let total_cost = round_cents(members.iter().map(|m| m.total_cost).sum());
    let status = members.iter().map(|m| m.status).min()?;
    let created = members.iter().map(|m| m.created).min()?;

    let shared_unit_cost = members
        .windows(2)
        .all(|pair| pair[0].unit_cost == pair[1].unit_cost);

    let first = members.into_iter().next()?;
    let unit_cost = if shared_unit_cost || quantity <= 0.0 {
        first.unit_cost
    } else {
        round_to(total_cost / quantity, 4)
    };

    Some(BomLineItem {
        cabinet_id: match sources.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        },
        source_cabinet_ids: sources,
        quantity,
        total_cost,
        unit_cost,
        status,
        created,
        ..first
    })
}

fn sources_of(item: &BomLineItem) -> Vec<EntityId> {
    if item.source_cabinet_ids.is_empty() {
        item.cabinet_id.iter().cloned().collect()
    } else {
        item.source_cabinet_ids.clone()
    }
}

/// Stable hash of a project's cabinet data, recorded with each generation
pub fn project_fingerprint(project: &ProjectTree) -> Result<String, CalcError> {
    let bytes = serde_json::to_vec(&project.rooms)
        .map_err(|e| CalcError::invalid("project", e.to_string()))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::cabinet::{CabinetType, Component, ComponentKind};
    use crate::entities::project::{CabinetRun, Location, Room};

    fn project(cabinets: Vec<CabinetRecord>) -> ProjectTree {
        let mut tree = ProjectTree::new("Test kitchen");
        tree.rooms.push(Room {
            name: "Kitchen".to_string(),
            locations: vec![Location {
                name: "North wall".to_string(),
                runs: vec![CabinetRun {
                    name: "Base run".to_string(),
                    cabinets,
                }],
            }],
        });
        tree
    }

    fn generator() -> BomGenerator {
        BomGenerator::new(
            UnitCosts::default(),
            CabinetDimensionCalculator::builtin().unwrap(),
        )
    }

    fn find<'a>(lines: &'a [BomLineItem], name: &str) -> &'a BomLineItem {
        lines.iter().find(|l| l.name == name).unwrap()
    }

    #[test]
    fn test_cabinet_candidates() {
        let mut base = CabinetRecord::new("B30", CabinetType::Base, 30.0, 34.5, 24.0);
        base.door_count = Some(2);
        base.drawer_count = Some(1);
        let lines = generator().candidates(&project(vec![base])).unwrap();

        let boxes = find(&lines, line_names::CABINET_BOX);
        // (2*24*34.5 + 2*30*24) / 144 = 21.5
        assert_eq!(boxes.quantity, 21.5);
        assert_eq!(boxes.total_cost, 75.25);
        assert_eq!(boxes.uom, Uom::Sqft);

        let back = find(&lines, line_names::BACK_PANEL);
        assert_eq!(back.quantity, 7.19);
        assert!((back.total_cost - 7.19 * 1.5).abs() < 0.01);

        assert_eq!(find(&lines, line_names::DRAWER_SLIDES).total_cost, 35.0);
        assert_eq!(find(&lines, line_names::HINGES).quantity, 4.0);
        assert_eq!(find(&lines, line_names::EDGE_BANDING).quantity, 10.0);
        assert!(lines.iter().all(|l| l.status == BomStatus::Pending));
    }

    #[test]
    fn test_zero_hardware_lines_omitted() {
        let wall = CabinetRecord::new("W30", CabinetType::Wall, 30.0, 30.0, 12.0);
        let lines = generator().candidates(&project(vec![wall])).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(!lines.iter().any(|l| l.material_type == MaterialType::Hardware));
    }

    #[test]
    fn test_counts_from_components() {
        let mut drawers = CabinetRecord::new("DB18", CabinetType::DrawerBase, 18.0, 34.5, 24.0);
        drawers.components = vec![
            Component::new(ComponentKind::Drawer, 6.0),
            Component::new(ComponentKind::Drawer, 10.0),
            Component::new(ComponentKind::Drawer, 10.75),
        ];
        let lines = generator().candidates(&project(vec![drawers])).unwrap();
        assert_eq!(find(&lines, line_names::DRAWER_SLIDES).quantity, 3.0);
    }

    #[test]
    fn test_geometry_error_fails_whole_project() {
        let good = CabinetRecord::new("B30", CabinetType::Base, 30.0, 34.5, 24.0);
        let bad = CabinetRecord::new("Sliver", CabinetType::Base, 1.0, 34.5, 24.0);
        let bad_id = bad.id.to_string();
        let err = generator().generate(&project(vec![good, bad])).unwrap_err();
        assert!(matches!(err, CalcError::InfeasibleGeometry { .. }));
        assert!(err.field().unwrap().starts_with(&bad_id));
    }

    #[test]
    fn test_two_cabinets_merge_box_line() {
        let a = CabinetRecord::new("B30", CabinetType::Base, 30.0, 34.5, 24.0);
        let b = CabinetRecord::new("B24", CabinetType::Base, 24.0, 34.5, 24.0);
        let gen = generator();
        let tree = project(vec![a.clone(), b.clone()]);

        let candidates = gen.candidates(&tree).unwrap();
        let individual: Vec<&BomLineItem> = candidates
            .iter()
            .filter(|l| l.name == line_names::CABINET_BOX)
            .collect();
        let expected_qty = individual[0].quantity + individual[1].quantity;
        let expected_total = individual[0].total_cost + individual[1].total_cost;

        let merged = consolidate(candidates);
        let boxes = find(&merged, line_names::CABINET_BOX);
        assert!(boxes.cabinet_id.is_none());
        assert!((boxes.quantity - expected_qty).abs() < 1e-9);
        assert!((boxes.total_cost - expected_total).abs() < 1e-9);

        let mut expected_sources = vec![a.id, b.id];
        expected_sources.sort();
        assert_eq!(boxes.source_cabinet_ids, expected_sources);
    }

    #[test]
    fn test_single_cabinet_keeps_id() {
        let a = CabinetRecord::new("B30", CabinetType::Base, 30.0, 34.5, 24.0);
        let id = a.id.clone();
        let merged = generator().generate(&project(vec![a])).unwrap();
        assert!(merged.iter().all(|l| l.cabinet_id.as_ref() == Some(&id)));
    }

    #[test]
    fn test_consolidate_order_independent() {
        let cabinets: Vec<CabinetRecord> = [30.0, 24.0, 15.0, 36.0]
            .iter()
            .map(|w| {
                let mut c = CabinetRecord::new("B", CabinetType::Base, *w, 34.5, 24.0);
                c.door_count = Some(1);
                c
            })
            .collect();
        let candidates = generator().candidates(&project(cabinets)).unwrap();
        let mut reversed = candidates.clone();
        reversed.reverse();

        let forward = consolidate(candidates);
        let backward = consolidate(reversed);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_consolidate_idempotent() {
        let a = CabinetRecord::new("B30", CabinetType::Base, 30.0, 34.5, 24.0);
        let b = CabinetRecord::new("B18", CabinetType::Base, 18.0, 34.5, 24.0);
        let once = generator().generate(&project(vec![a, b])).unwrap();
        let twice = consolidate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_keeps_earliest_status() {
        let a = CabinetRecord::new("B30", CabinetType::Base, 30.0, 34.5, 24.0);
        let b = CabinetRecord::new("B18", CabinetType::Base, 18.0, 34.5, 24.0);
        let mut candidates = generator().candidates(&project(vec![a, b])).unwrap();
        for line in candidates.iter_mut() {
            line.status = BomStatus::Received;
        }
        candidates[0].status = BomStatus::Ordered;
        let merged = consolidate(candidates);
        assert_eq!(find(&merged, line_names::CABINET_BOX).status, BomStatus::Ordered);
    }

    #[test]
    fn test_custom_unit_costs() {
        let costs = UnitCosts {
            drawer_slide_pair: 42.0,
            ..Default::default()
        };
        let gen = BomGenerator::new(costs, CabinetDimensionCalculator::builtin().unwrap());
        let mut base = CabinetRecord::new("B30", CabinetType::Base, 30.0, 34.5, 24.0);
        base.drawer_count = Some(2);
        let lines = gen.candidates(&project(vec![base])).unwrap();
        assert_eq!(find(&lines, line_names::DRAWER_SLIDES).total_cost, 84.0);
    }

    #[test]
    fn test_fingerprint_tracks_cabinets() {
        let a = CabinetRecord::new("B30", CabinetType::Base, 30.0, 34.5, 24.0);
        let tree = project(vec![a]);
        let first = project_fingerprint(&tree).unwrap();
        assert_eq!(first, project_fingerprint(&tree).unwrap());
        assert_eq!(first.len(), 64);

        let mut changed = tree.clone();
        changed.rooms[0].locations[0].runs[0].cabinets[0].length = 33.0;
        assert_ne!(first, project_fingerprint(&changed).unwrap());
    }
}

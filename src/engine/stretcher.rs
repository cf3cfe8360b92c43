//! Stretcher placement
//!
//! Decides which seams of a cabinet elevation need a horizontal stretcher
//! and places each one so it stays clear of the drawer-slide runners.

use serde::Serialize;
use std::fmt;

use crate::core::fraction::Measure;
use crate::engine::cabinet::{BoxDimensions, ComponentBand};
use crate::engine::drawer::RUNNER_HEIGHT_FROM_BOTTOM;
use crate::engine::standards::ConstructionStandards;
use crate::entities::cabinet::{
    CabinetInput, ComponentKind, ComponentShape, FaceFrameStyle, TopConstruction,
};

/// Half-height of the keep-out zone around a runner mounting height
pub const SLIDE_ZONE_HALF_HEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StretcherLocation {
    TopFront,
    TopBack,
    /// Between two stacked components
    Seam,
}

impl fmt::Display for StretcherLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StretcherLocation::TopFront => "top_front",
            StretcherLocation::TopBack => "top_back",
            StretcherLocation::Seam => "seam",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stretcher {
    pub name: String,
    pub location: StretcherLocation,
    /// Index of the component above a seam stretcher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub above_component: Option<usize>,
    /// Centre line, measured down from the top of the carcass
    pub position: Measure,
    pub width: Measure,
    pub height: Measure,
    pub depth: Measure,
}

impl Stretcher {
    fn spans(&self) -> (f64, f64) {
        let half = self.height.inches / 2.0;
        (self.position.inches - half, self.position.inches + half)
    }
}

/// Runner mounting height reserved for one drawer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideMount {
    pub component_index: usize,
    /// Measured down from the top of the carcass
    pub height: Measure,
    pub zone_top: Measure,
    pub zone_bottom: Measure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionReason {
    /// Sink front cut around plumbing; no slide hardware behind it
    UShapedComponent,
    /// A face-frame rail already braces the seam
    RailSpansSeam,
    /// False-front backing or fixed shelf braces the seam
    RigidMember,
    /// Neither neighbour is a drawer
    NoDrawerAdjacent,
}

impl fmt::Display for SuppressionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuppressionReason::UShapedComponent => "adjacent to a U-shaped component",
            SuppressionReason::RailSpansSeam => "spanned by a face-frame rail",
            SuppressionReason::RigidMember => "braced by a rigid member",
            SuppressionReason::NoDrawerAdjacent => "no adjacent drawer",
        };
        write!(f, "{}", s)
    }
}

/// A seam left without a stretcher
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppressedSeam {
    pub location: StretcherLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub above_component: Option<usize>,
    pub position: Measure,
    pub reason: SuppressionReason,
}

/// A required stretcher that would land in a runner keep-out zone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StretcherConflict {
    pub stretcher: Stretcher,
    pub component_index: usize,
    pub slide_mount_height: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StretcherPlan {
    /// Top to bottom
    pub stretchers: Vec<Stretcher>,
    pub slide_mount_heights: Vec<SlideMount>,
    pub suppressed: Vec<SuppressedSeam>,
    pub conflicts: Vec<StretcherConflict>,
    pub requires_manual_review: bool,
    pub warnings: Vec<String>,
}

pub struct StretcherCalculator<'a> {
    standards: &'a ConstructionStandards,
}

impl<'a> StretcherCalculator<'a> {
    pub fn new(standards: &'a ConstructionStandards) -> Self {
        Self { standards }
    }

    /// Plan stretchers for a finished component layout
    pub fn plan(
        &self,
        cabinet: &CabinetInput,
        bands: &[ComponentBand],
        box_dimensions: &BoxDimensions,
    ) -> StretcherPlan {
        let inside_width = box_dimensions.inside_width.inches();
        let thickness = self.standards.stretcher_thickness;

        let mut candidates = Vec::new();
        let mut suppressed = Vec::new();

        if cabinet.cabinet_type.top_construction() == TopConstruction::Stretchers {
            let position = thickness / 2.0;
            let top_is_u_shaped = bands
                .first()
                .map(|b| b.shape == ComponentShape::UShaped)
                .unwrap_or(false);

            if top_is_u_shaped {
                suppressed.push(SuppressedSeam {
                    location: StretcherLocation::TopFront,
                    above_component: None,
                    position: Measure::new(position),
                    reason: SuppressionReason::UShapedComponent,
                });
            } else {
                candidates.push(self.stretcher("Top Front Stretcher", StretcherLocation::TopFront, None, position, inside_width));
            }
            candidates.push(self.stretcher("Top Back Stretcher", StretcherLocation::TopBack, None, position, inside_width));
        }

        let mut seam_number = 0;
        for pair in bands.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            let gap = lower.top - upper.bottom();
            let position = upper.bottom() + gap / 2.0;

            match self.seam_suppression(cabinet.face_frame_style, upper, lower, gap) {
                Some(reason) => suppressed.push(SuppressedSeam {
                    location: StretcherLocation::Seam,
                    above_component: Some(upper.index),
                    position: Measure::new(position),
                    reason,
                }),
                None => {
                    seam_number += 1;
                    candidates.push(self.stretcher(
                        &format!("Stretcher {}", seam_number),
                        StretcherLocation::Seam,
                        Some(upper.index),
                        position,
                        inside_width,
                    ));
                }
            }
        }

        let slide_mount_heights: Vec<SlideMount> = bands
            .iter()
            .filter(|b| b.kind == ComponentKind::Drawer)
            .map(|b| {
                let height = b.bottom() - RUNNER_HEIGHT_FROM_BOTTOM;
                SlideMount {
                    component_index: b.index,
                    height: Measure::new(height),
                    zone_top: Measure::new(height - SLIDE_ZONE_HALF_HEIGHT),
                    zone_bottom: Measure::new(height + SLIDE_ZONE_HALF_HEIGHT),
                }
            })
            .collect();

        let mut stretchers = Vec::new();
        let mut conflicts = Vec::new();
        for stretcher in candidates {
            let (top, bottom) = stretcher.spans();
            let collision = slide_mount_heights
                .iter()
                .find(|m| top < m.zone_bottom.inches && bottom > m.zone_top.inches);
            match collision {
                Some(mount) => conflicts.push(StretcherConflict {
                    component_index: mount.component_index,
                    slide_mount_height: mount.height.clone(),
                    stretcher,
                }),
                None => stretchers.push(stretcher),
            }
        }

        let mut warnings = Vec::new();
        if stretchers.is_empty() && conflicts.is_empty() {
            warnings.push("no stretchers required for this layout".to_string());
        }
        for conflict in &conflicts {
            warnings.push(format!(
                "{} at {} collides with the runner of component {}; manual review required",
                conflict.stretcher.name,
                conflict.stretcher.position,
                conflict.component_index + 1
            ));
        }

        StretcherPlan {
            requires_manual_review: !conflicts.is_empty(),
            stretchers,
            slide_mount_heights,
            suppressed,
            conflicts,
            warnings,
        }
    }

    fn seam_suppression(
        &self,
        style: FaceFrameStyle,
        upper: &ComponentBand,
        lower: &ComponentBand,
        gap: f64,
    ) -> Option<SuppressionReason> {
        if upper.shape == ComponentShape::UShaped || lower.shape == ComponentShape::UShaped {
            return Some(SuppressionReason::UShapedComponent);
        }
        if upper.kind != ComponentKind::Drawer && lower.kind != ComponentKind::Drawer {
            return Some(SuppressionReason::NoDrawerAdjacent);
        }
        if upper.kind.is_rigid() || lower.kind.is_rigid() {
            return Some(SuppressionReason::RigidMember);
        }
        if self.rail_spans(style, gap) {
            return Some(SuppressionReason::RailSpansSeam);
        }
        None
    }

    fn rail_spans(&self, style: FaceFrameStyle, gap: f64) -> bool {
        match style {
            FaceFrameStyle::Inset | FaceFrameStyle::PartialOverlay => true,
            FaceFrameStyle::FullOverlay => gap >= self.standards.face_frame_rail_gap_min,
            FaceFrameStyle::Frameless => false,
        }
    }

    fn stretcher(
        &self,
        name: &str,
        location: StretcherLocation,
        above_component: Option<usize>,
        position: f64,
        inside_width: f64,
    ) -> Stretcher {
        Stretcher {
            name: name.to_string(),
            location,
            above_component,
            position: Measure::new(position),
            width: Measure::new(inside_width),
            height: Measure::new(self.standards.stretcher_thickness),
            depth: Measure::new(self.standards.stretcher_depth),
        }
    }
}

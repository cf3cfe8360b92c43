//! Cabinet dimension calculator
//!
//! Turns exterior dimensions and a top-to-bottom component list into box,
//! face-frame and component dimensions, a stretcher plan and a cut list.
//! Every derived dimension carries the formula that produced it.
//!
//! When a slide length is requested and the box is too shallow, the
//! calculation either reports the shortfall or, with `auto_adjust_depth`,
//! runs once at the minimum exterior depth instead.

use serde::Serialize;

use crate::core::error::{require_feasible, CalcError};
use crate::core::fraction::{Derived, Measure};
use crate::engine::cut_list::{material, CutListItem};
use crate::engine::drawer::{
    depth_sufficiency, required_depth_for, DepthSufficiency, DrawerBoxResult, DrawerConfigurator,
};
use crate::engine::standards::{ConstructionStandards, StandardsRegistry};
use crate::engine::stretcher::{StretcherCalculator, StretcherPlan};
use crate::entities::cabinet::{
    CabinetInput, Component, ComponentKind, ComponentShape, DrawerOpening, Exterior,
    FaceFrameStyle, SlideLength, TopConstruction,
};

/// Components may overrun the opening by this much before the layout is invalid
pub const OVERFLOW_TOLERANCE: f64 = 0.5;
/// Shelf compartments shorter than this get a warning
pub const MIN_SHELF_COMPARTMENT: f64 = 5.5;
pub const SHELF_WIDTH_CLEARANCE: f64 = 0.125;
pub const SHELF_DEPTH_SETBACK: f64 = 0.25;
pub const HINGES_PER_DOOR: u32 = 2;

const EPSILON: f64 = 1e-9;

/// Carcass dimensions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxDimensions {
    pub toe_kick_height: Derived,
    pub inside_width: Derived,
    /// Exterior height less the toe kick
    pub carcass_height: Derived,
    pub inside_height: Derived,
    pub inside_depth: Derived,
    pub top_construction: TopConstruction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceFrameDimensions {
    pub style: FaceFrameStyle,
    pub stile_width: Measure,
    pub rail_width: Measure,
    pub stile_length: Derived,
    pub rail_length: Derived,
    pub opening_width: Derived,
    pub opening_height: Derived,
    pub mid_rail_count: usize,
}

/// Opening the components are laid out in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentOpening {
    pub width: Derived,
    pub height: Derived,
}

/// Vertical band allotted to one component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentBand {
    pub index: usize,
    pub kind: ComponentKind,
    pub shape: ComponentShape,
    /// Measured down from the top of the carcass
    pub top: f64,
    pub height: f64,
}

impl ComponentBand {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelDimensions {
    pub width: Derived,
    pub height: Derived,
    pub thickness: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentResult {
    pub index: usize,
    pub kind: ComponentKind,
    pub shape: ComponentShape,
    pub band_top: Measure,
    pub band_height: Measure,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub front: Option<PanelDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backing: Option<PanelDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelf: Option<PanelDimensions>,
    pub hinges: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawer_box: Option<DrawerBoxResult>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentLayout {
    pub opening: ComponentOpening,
    /// Space between stacked components (gap or mid-rail)
    pub separator: Measure,
    /// Opening height left over; negative when the components overrun
    pub unallocated: Measure,
    pub components: Vec<ComponentResult>,
}

/// Record of the single auto-adjust pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthAdjustment {
    pub slide_length: SlideLength,
    pub original_exterior_depth: Measure,
    pub adjusted_exterior_depth: Measure,
    pub formula: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub is_valid: bool,
    pub warnings: Vec<String>,
}

impl ValidationSummary {
    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.warnings.push(message.into());
    }
}

/// Everything derived for one cabinet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub input: CabinetInput,
    /// Exterior the dimensions were derived from (differs after auto-adjust)
    pub exterior: Exterior,
    pub standards: ConstructionStandards,
    pub box_dimensions: BoxDimensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_frame: Option<FaceFrameDimensions>,
    pub layout: ComponentLayout,
    pub stretchers: StretcherPlan,
    pub cut_list: Vec<CutListItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_check: Option<DepthSufficiency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_adjustment: Option<DepthAdjustment>,
    pub validation: ValidationSummary,
}

pub struct CabinetDimensionCalculator {
    registry: StandardsRegistry,
    drawers: DrawerConfigurator,
}

impl CabinetDimensionCalculator {
    pub fn new(registry: StandardsRegistry, drawers: DrawerConfigurator) -> Self {
        Self { registry, drawers }
    }

    /// Built-in standards and catalog
    pub fn builtin() -> Result<Self, CalcError> {
        Ok(Self::new(
            StandardsRegistry::builtin()?,
            DrawerConfigurator::default(),
        ))
    }

    pub fn registry(&self) -> &StandardsRegistry {
        &self.registry
    }

    pub fn drawers(&self) -> &DrawerConfigurator {
        &self.drawers
    }

    /// Size a cabinet from its exterior dimensions
    ///
    /// When a slide length is given with `auto_adjust_depth` and the box is
    /// too shallow for it, the input is derived once, directly at the
    /// minimum exterior depth. The depth check runs before any other
    /// geometry, so an exterior too shallow to derive is still adjusted.
    pub fn calculate_from_exterior(&self, input: &CabinetInput) -> Result<CalculationResult, CalcError> {
        input.validate()?;
        let standards = self.registry.resolve(input.construction_standards_id.as_deref())?;

        let Some(slide) = input.drawer_slide_length else {
            return self.derive(input, standards);
        };

        let first_inside = inside_depth(standards, input.exterior.depth);
        if input.auto_adjust_depth && first_inside < required_depth_for(slide) {
            return self.derive_adjusted(input, standards, slide);
        }

        let mut result = self.derive(input, standards)?;
        let check = depth_sufficiency(first_inside, slide)?;
        if !check.is_sufficient {
            result.validation.fail(format!(
                "box depth is too shallow for {} slides: {}",
                slide, check.recommendation
            ));
        }
        result.depth_check = Some(check);
        Ok(result)
    }

    /// Stretcher plan alone for an exterior request
    pub fn stretchers_for(&self, input: &CabinetInput) -> Result<StretcherPlan, CalcError> {
        Ok(self.calculate_from_exterior(input)?.stretchers)
    }

    /// The single pass at the minimum exterior depth for `slide`
    fn derive_adjusted(
        &self,
        input: &CabinetInput,
        standards: &ConstructionStandards,
        slide: SlideLength,
    ) -> Result<CalculationResult, CalcError> {
        let adjusted_depth = required_depth_for(slide) + standards.box_depth_margin();
        let mut adjusted = input.clone();
        adjusted.exterior.depth = adjusted_depth;

        let mut result = self.derive(&adjusted, standards)?;
        let recheck = depth_sufficiency(inside_depth(standards, adjusted_depth), slide)?;
        if !recheck.is_sufficient {
            result.validation.fail(recheck.recommendation.clone());
        }
        result.validation.warn(format!(
            "exterior depth increased from {} to {} for {} slides",
            Measure::new(input.exterior.depth),
            Measure::new(adjusted_depth),
            slide
        ));
        result.input = input.clone();
        result.depth_adjustment = Some(DepthAdjustment {
            slide_length: slide,
            original_exterior_depth: Measure::new(input.exterior.depth),
            adjusted_exterior_depth: Measure::new(adjusted_depth),
            formula: format!(
                "slide + shop clearance + back + wall margin = {} + 0.75 + {} + {}",
                slide.inches(),
                standards.back_panel_thickness,
                standards.min_box_depth_margin
            ),
        });
        result.depth_check = Some(recheck);
        Ok(result)
    }

    /// One pass over a validated input
    fn derive(&self, input: &CabinetInput, standards: &ConstructionStandards) -> Result<CalculationResult, CalcError> {
        let Exterior { width, height, depth } = input.exterior;
        let panel = standards.panel_thickness;
        let style = input.face_frame_style;
        let top_construction = input.cabinet_type.top_construction();

        let toe_kick = match input.toe_kick_height {
            Some(toe) => toe,
            None if input.cabinet_type.is_wall_hung() => 0.0,
            None => standards.toe_kick_default,
        };
        let (top_member, top_label) = match top_construction {
            TopConstruction::Panel => (panel, "top panel"),
            TopConstruction::Stretchers => (standards.stretcher_thickness, "stretcher"),
            TopConstruction::Open => (0.0, "open top"),
        };

        let inside_w = require_feasible("box.inside_width", width - 2.0 * panel)?;
        let carcass = require_feasible("box.carcass_height", height - toe_kick)?;
        let inside_h = require_feasible("box.inside_height", carcass - panel - top_member)?;
        let inside_d = require_feasible("box.inside_depth", inside_depth(standards, depth))?;

        let box_dimensions = BoxDimensions {
            toe_kick_height: Derived::new(
                toe_kick,
                match input.toe_kick_height {
                    Some(_) => "toe kick (input)".to_string(),
                    None => format!("toe kick default for {} = {}", input.cabinet_type, toe_kick),
                },
            ),
            inside_width: Derived::new(inside_w, format!("W - 2 x panel = {} - 2 x {}", width, panel)),
            carcass_height: Derived::new(carcass, format!("H - toe kick = {} - {}", height, toe_kick)),
            inside_height: Derived::new(
                inside_h,
                format!("carcass - bottom - {} = {} - {} - {}", top_label, carcass, panel, top_member),
            ),
            inside_depth: Derived::new(
                inside_d,
                format!(
                    "D - back - wall margin = {} - {} - {}",
                    depth, standards.back_panel_thickness, standards.min_box_depth_margin
                ),
            ),
            top_construction,
        };

        let stile = input.face_frame_stile_width.unwrap_or(standards.face_frame_stile_width);
        let rail = input.face_frame_rail_width.unwrap_or(standards.face_frame_rail_width);

        let (mut face_frame, opening, band_start, opening_w, opening_h) = if style.has_frame() {
            let opening_w = require_feasible("face_frame.opening_width", width - 2.0 * stile)?;
            let opening_h = require_feasible("face_frame.opening_height", carcass - 2.0 * rail)?;
            let opening_width = Derived::new(opening_w, format!("W - 2 x stile = {} - 2 x {}", width, stile));
            let opening_height =
                Derived::new(opening_h, format!("carcass - 2 x rail = {} - 2 x {}", carcass, rail));
            let frame = FaceFrameDimensions {
                style,
                stile_width: Measure::new(stile),
                rail_width: Measure::new(rail),
                stile_length: Derived::new(carcass, "stile length = carcass height"),
                rail_length: Derived::new(opening_w, "rail length = opening width"),
                opening_width: opening_width.clone(),
                opening_height: opening_height.clone(),
                mid_rail_count: 0,
            };
            let opening = ComponentOpening {
                width: opening_width,
                height: opening_height,
            };
            (Some(frame), opening, rail, opening_w, opening_h)
        } else {
            let opening = ComponentOpening {
                width: Derived::new(inside_w, "frameless: box inside width"),
                height: Derived::new(inside_h, "frameless: box inside height"),
            };
            (None, opening, top_member, inside_w, inside_h)
        };

        let mut validation = ValidationSummary {
            is_valid: true,
            warnings: Vec::new(),
        };

        // Bands run top-down, one separator between neighbours
        let separator = if style.rails_at_every_seam() {
            rail
        } else {
            standards.component_gap
        };
        let bands = allocate_bands(&input.components, band_start, separator);
        let used = bands.last().map(|b| b.bottom() - band_start).unwrap_or(0.0);
        let unallocated = opening_h - used;

        if !bands.is_empty() {
            if unallocated < -OVERFLOW_TOLERANCE {
                validation.fail(format!(
                    "components overrun the {} opening by {}",
                    Measure::new(opening_h),
                    Measure::new(-unallocated)
                ));
            } else if unallocated < -EPSILON {
                validation.warn(format!(
                    "components overrun the opening by {}",
                    Measure::new(-unallocated)
                ));
            } else if unallocated > EPSILON {
                validation.warn(format!(
                    "{} of the opening is unallocated below the last component",
                    Measure::new(unallocated)
                ));
            }
        }

        if let Some(frame) = face_frame.as_mut() {
            let seams = bands.len().saturating_sub(1);
            frame.mid_rail_count = match style {
                FaceFrameStyle::Inset | FaceFrameStyle::PartialOverlay => seams,
                FaceFrameStyle::FullOverlay if separator >= standards.face_frame_rail_gap_min => seams,
                _ => 0,
            };
        }

        let context = ComponentContext {
            standards,
            style,
            opening_w,
            inside_w,
            inside_d,
            slide_length: input.drawer_slide_length,
        };
        let mut components = Vec::with_capacity(bands.len());
        for band in &bands {
            let component = self
                .component(&context, band)
                .map_err(|e| in_component(e, band.index))?;
            if let Some(drawer_box) = &component.drawer_box {
                for issue in &drawer_box.issues {
                    validation.fail(format!("component {} drawer box: {}", band.index + 1, issue));
                }
            }
            if band.kind == ComponentKind::Shelf && band.height < MIN_SHELF_COMPARTMENT {
                validation.warn(format!(
                    "component {} shelf compartment is only {}",
                    band.index + 1,
                    Measure::new(band.height)
                ));
            }
            components.push(component);
        }

        let stretchers = StretcherCalculator::new(standards).plan(input, &bands, &box_dimensions);
        for warning in &stretchers.warnings {
            validation.warn(warning.clone());
        }

        let cut_list = build_cut_list(
            input,
            standards,
            &box_dimensions,
            face_frame.as_ref(),
            &components,
            &stretchers,
        );

        Ok(CalculationResult {
            input: input.clone(),
            exterior: input.exterior,
            standards: standards.clone(),
            box_dimensions,
            face_frame,
            layout: ComponentLayout {
                opening,
                separator: Measure::new(separator),
                unallocated: Measure::new(unallocated),
                components,
            },
            stretchers,
            cut_list,
            depth_check: None,
            depth_adjustment: None,
            validation,
        })
    }

    fn component(&self, ctx: &ComponentContext<'_>, band: &ComponentBand) -> Result<ComponentResult, CalcError> {
        let standards = ctx.standards;
        let panel = standards.panel_thickness;
        let reveal = standards.reveal;

        let mut result = ComponentResult {
            index: band.index,
            kind: band.kind,
            shape: band.shape,
            band_top: Measure::new(band.top),
            band_height: Measure::new(band.height),
            front: None,
            backing: None,
            shelf: None,
            hinges: 0,
            drawer_box: None,
            notes: Vec::new(),
        };

        if band.kind != ComponentKind::Shelf {
            let front_w = require_feasible("front_width", ctx.opening_w - 2.0 * reveal)?;
            let front_h = require_feasible("front_height", band.height - 2.0 * reveal)?;
            result.front = Some(PanelDimensions {
                width: Derived::new(front_w, format!("opening - 2 x reveal = {} - 2 x {}", ctx.opening_w, reveal)),
                height: Derived::new(front_h, format!("band - 2 x reveal = {} - 2 x {}", band.height, reveal)),
                thickness: Measure::new(panel),
            });
        }

        match band.kind {
            ComponentKind::Drawer => {
                // Framed boxes must pass through the frame opening
                let opening = DrawerOpening {
                    width: ctx.opening_w,
                    height: band.height,
                    depth: ctx.inside_d,
                    slide_side_thickness: standards.drawer_side_thickness,
                    face_frame_style: ctx.style,
                    slide_length: ctx.slide_length,
                };
                result.drawer_box = Some(self.drawers.compute_box(&opening)?);
            }
            ComponentKind::FalseFront => {
                let backing_w = require_feasible("backing_width", ctx.opening_w - 2.0 * panel)?;
                let backing_h = band.height + standards.false_front_backing_overhang;
                result.backing = Some(PanelDimensions {
                    width: Derived::new(backing_w, format!("opening - 2 x panel = {} - 2 x {}", ctx.opening_w, panel)),
                    height: Derived::new(
                        backing_h,
                        format!("band + overhang = {} + {}", band.height, standards.false_front_backing_overhang),
                    ),
                    thickness: Measure::new(panel),
                });
            }
            ComponentKind::Door => {
                result.hinges = HINGES_PER_DOOR;
            }
            ComponentKind::Shelf => {
                let shelf_w = require_feasible("shelf_width", ctx.inside_w - SHELF_WIDTH_CLEARANCE)?;
                let shelf_d = require_feasible("shelf_depth", ctx.inside_d - SHELF_DEPTH_SETBACK)?;
                result.shelf = Some(PanelDimensions {
                    width: Derived::new(shelf_w, format!("inside width - {} = {} - {}", SHELF_WIDTH_CLEARANCE, ctx.inside_w, SHELF_WIDTH_CLEARANCE)),
                    height: Derived::new(shelf_d, format!("inside depth - {} = {} - {}", SHELF_DEPTH_SETBACK, ctx.inside_d, SHELF_DEPTH_SETBACK)),
                    thickness: Measure::new(panel),
                });
            }
        }

        if band.shape == ComponentShape::UShaped {
            result
                .notes
                .push("U-shaped: notch the front and box around the plumbing; no stretcher behind".to_string());
        }
        Ok(result)
    }
}

struct ComponentContext<'a> {
    standards: &'a ConstructionStandards,
    style: FaceFrameStyle,
    opening_w: f64,
    inside_w: f64,
    inside_d: f64,
    slide_length: Option<SlideLength>,
}

fn inside_depth(standards: &ConstructionStandards, exterior_depth: f64) -> f64 {
    exterior_depth - standards.box_depth_margin()
}

fn allocate_bands(components: &[Component], start: f64, separator: f64) -> Vec<ComponentBand> {
    let mut cursor = start;
    components
        .iter()
        .enumerate()
        .map(|(index, component)| {
            if index > 0 {
                cursor += separator;
            }
            let band = ComponentBand {
                index,
                kind: component.kind,
                shape: component.shape,
                top: cursor,
                height: component.height,
            };
            cursor += component.height;
            band
        })
        .collect()
}

/// Qualify a component-level geometry failure with its position
fn in_component(error: CalcError, index: usize) -> CalcError {
    match error {
        CalcError::InfeasibleGeometry { quantity, value } => CalcError::InfeasibleGeometry {
            quantity: format!("components[{}].{}", index, quantity),
            value,
        },
        other => other,
    }
}

fn build_cut_list(
    input: &CabinetInput,
    standards: &ConstructionStandards,
    box_dimensions: &BoxDimensions,
    face_frame: Option<&FaceFrameDimensions>,
    components: &[ComponentResult],
    stretchers: &StretcherPlan,
) -> Vec<CutListItem> {
    let panel = standards.panel_thickness;
    let inside_w = box_dimensions.inside_width.inches();
    let inside_d = box_dimensions.inside_depth.inches();
    let carcass = box_dimensions.carcass_height.inches();

    let side_height = match box_dimensions.top_construction {
        TopConstruction::Open if input.cabinet_type.is_sink() => carcass + standards.sink_side_extension,
        TopConstruction::Stretchers => carcass - standards.stretcher_thickness,
        _ => carcass,
    };

    let mut items = vec![
        CutListItem::new("Left Side", inside_d, side_height, panel, 1, material::BOX_PLYWOOD),
        CutListItem::new("Right Side", inside_d, side_height, panel, 1, material::BOX_PLYWOOD),
    ];
    if box_dimensions.top_construction == TopConstruction::Panel {
        items.push(CutListItem::new("Top", inside_w, inside_d, panel, 1, material::BOX_PLYWOOD));
    }
    items.push(CutListItem::new("Bottom", inside_w, inside_d, panel, 1, material::BOX_PLYWOOD));
    items.push(CutListItem::new(
        "Back",
        inside_w,
        carcass,
        standards.back_panel_thickness,
        1,
        material::BACK_PLYWOOD,
    ));

    if let Some(frame) = face_frame {
        let stile_w = frame.stile_width.inches;
        let rail_w = frame.rail_width.inches;
        let rail_len = frame.rail_length.inches();
        items.push(CutListItem::new("Stile", stile_w, frame.stile_length.inches(), panel, 2, material::FACE_FRAME_HARDWOOD));
        items.push(CutListItem::new("Top Rail", rail_w, rail_len, panel, 1, material::FACE_FRAME_HARDWOOD));
        items.push(CutListItem::new("Bottom Rail", rail_w, rail_len, panel, 1, material::FACE_FRAME_HARDWOOD));
        if frame.mid_rail_count > 0 {
            items.push(CutListItem::new(
                "Mid Rail",
                rail_w,
                rail_len,
                panel,
                frame.mid_rail_count as u32,
                material::FACE_FRAME_HARDWOOD,
            ));
        }
    }

    let mut drawers = 0;
    let mut false_fronts = 0;
    let mut doors = 0;
    let mut shelves = 0;
    for component in components {
        let label = match component.kind {
            ComponentKind::Drawer => {
                drawers += 1;
                format!("Drawer {}", drawers)
            }
            ComponentKind::FalseFront => {
                false_fronts += 1;
                format!("False Front {}", false_fronts)
            }
            ComponentKind::Door => {
                doors += 1;
                format!("Door {}", doors)
            }
            ComponentKind::Shelf => {
                shelves += 1;
                format!("Shelf {}", shelves)
            }
        };

        if let Some(front) = &component.front {
            let name = match component.kind {
                ComponentKind::Drawer => format!("{} Face", label),
                _ => label.clone(),
            };
            items.push(panel_item(name, front, material::BOX_PLYWOOD));
        }
        if let Some(backing) = &component.backing {
            items.push(panel_item(format!("{} Backing", label), backing, material::BOX_PLYWOOD));
        }
        if let Some(shelf) = &component.shelf {
            items.push(panel_item(label.clone(), shelf, material::BOX_PLYWOOD));
        }
        if let Some(drawer_box) = &component.drawer_box {
            items.extend(drawer_box.cut_list.iter().map(|piece| piece.prefixed(&label)));
        }
    }

    for stretcher in &stretchers.stretchers {
        items.push(CutListItem::new(
            stretcher.name.clone(),
            stretcher.width.inches,
            stretcher.depth.inches,
            stretcher.height.inches,
            1,
            material::BOX_PLYWOOD,
        ));
    }

    items
}

fn panel_item(name: String, panel: &PanelDimensions, material_hint: &str) -> CutListItem {
    CutListItem::new(
        name,
        panel.width.inches(),
        panel.height.inches(),
        panel.thickness.inches,
        1,
        material_hint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::entities::cabinet::CabinetType;

    fn calculator() -> CabinetDimensionCalculator {
        CabinetDimensionCalculator::builtin().unwrap()
    }

    fn drawer_base() -> CabinetInput {
        let mut input = CabinetInput::new(CabinetType::DrawerBase, 18.0, 34.5, 24.0);
        input.components = vec![
            Component::new(ComponentKind::Drawer, 6.0),
            Component::new(ComponentKind::Drawer, 10.0),
            Component::new(ComponentKind::Drawer, 10.75),
        ];
        input
    }

    #[test]
    fn test_base_box_dimensions() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 24.0);
        input.toe_kick_height = Some(4.5);
        let result = calculator().calculate_from_exterior(&input).unwrap();
        let b = &result.box_dimensions;

        assert_eq!(b.inside_width.inches(), 28.5);
        assert_eq!(b.carcass_height.inches(), 30.0);
        assert_eq!(b.inside_height.inches(), 28.5);
        assert_eq!(b.inside_depth.inches(), 23.25);
        assert!(b.inside_width.formula.contains("30 - 2 x 0.75"));
    }

    #[test]
    fn test_box_smaller_than_exterior() {
        for cabinet_type in CabinetType::all() {
            let input = CabinetInput::new(*cabinet_type, 24.0, 34.5, 24.0);
            let result = calculator().calculate_from_exterior(&input).unwrap();
            let b = &result.box_dimensions;
            assert!(b.inside_width.inches() < 24.0);
            assert!(b.inside_height.inches() < 34.5);
            assert!(b.inside_depth.inches() < 24.0);
        }
    }

    #[test]
    fn test_wall_cabinet_has_no_toe_kick() {
        let input = CabinetInput::new(CabinetType::Wall, 30.0, 30.0, 12.0);
        let result = calculator().calculate_from_exterior(&input).unwrap();
        assert_eq!(result.box_dimensions.toe_kick_height.inches(), 0.0);
        assert_eq!(result.box_dimensions.carcass_height.inches(), 30.0);
        assert!(result.cut_list.iter().any(|c| c.name == "Top"));
    }

    #[test]
    fn test_face_frame_matches_stiles_and_rails() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 24.0);
        input.face_frame_stile_width = Some(1.75);
        let result = calculator().calculate_from_exterior(&input).unwrap();
        let frame = result.face_frame.unwrap();

        assert_eq!(frame.opening_width.inches(), 30.0 - 2.0 * 1.75);
        assert_eq!(frame.opening_height.inches(), 30.0 - 2.0 * 1.5);
        assert_eq!(frame.stile_length.inches(), 30.0);
        assert_eq!(frame.rail_length.inches(), frame.opening_width.inches());
    }

    #[test]
    fn test_frameless_uses_box_interior() {
        let mut input = CabinetInput::new(CabinetType::Wall, 30.0, 30.0, 12.0);
        input.face_frame_style = FaceFrameStyle::Frameless;
        let result = calculator().calculate_from_exterior(&input).unwrap();
        assert!(result.face_frame.is_none());
        assert_eq!(result.layout.opening.width.inches(), 28.5);
        assert!(!result.cut_list.iter().any(|c| c.name == "Stile"));
    }

    #[test]
    fn test_drawer_base_layout_fills_opening() {
        let result = calculator().calculate_from_exterior(&drawer_base()).unwrap();

        // 30" carcass - 2 x 1.5 rails = 27; 26.75 of drawers + 2 gaps of 1/8
        assert_eq!(result.layout.unallocated.inches, 0.0);
        assert!(result.validation.is_valid, "{:?}", result.validation.warnings);

        let first = &result.layout.components[0];
        assert_eq!(first.band_top.inches, 1.5);
        let front = first.front.as_ref().unwrap();
        assert_eq!(front.width.inches(), 15.0 - 0.25);
        assert_eq!(front.height.inches(), 5.75);

        let drawer_box = first.drawer_box.as_ref().unwrap();
        assert_eq!(drawer_box.opening.width, 15.0);
        assert_eq!(drawer_box.slide.length, SlideLength::In21);
    }

    #[test]
    fn test_drawer_cut_pieces_are_prefixed() {
        let result = calculator().calculate_from_exterior(&drawer_base()).unwrap();
        assert!(result.cut_list.iter().any(|c| c.name == "Drawer 2 Side"));
        assert!(result.cut_list.iter().any(|c| c.name == "Drawer 3 Front"));
        assert!(result.cut_list.iter().any(|c| c.name == "Drawer 3 Face"));
        assert!(result.cut_list.iter().any(|c| c.name == "Stretcher 1"));
        let back = result.cut_list.iter().find(|c| c.name == "Back").unwrap();
        assert_eq!(back.thickness.inches, 0.25);
    }

    #[test]
    fn test_side_height_by_top_construction() {
        let sink = CabinetInput::new(CabinetType::SinkBase, 36.0, 34.5, 24.0);
        let result = calculator().calculate_from_exterior(&sink).unwrap();
        let side = result.cut_list.iter().find(|c| c.name == "Left Side").unwrap();
        assert_eq!(side.height.inches, 30.75);

        let base = CabinetInput::new(CabinetType::Base, 36.0, 34.5, 24.0);
        let result = calculator().calculate_from_exterior(&base).unwrap();
        let side = result.cut_list.iter().find(|c| c.name == "Left Side").unwrap();
        assert_eq!(side.height.inches, 29.25);
    }

    #[test]
    fn test_overflow_beyond_tolerance_is_invalid() {
        let mut input = drawer_base();
        input.components.push(Component::new(ComponentKind::Drawer, 6.0));
        let result = calculator().calculate_from_exterior(&input).unwrap();
        assert!(!result.validation.is_valid);
        assert!(result.layout.unallocated.inches < -0.5);
    }

    #[test]
    fn test_underfill_is_a_warning() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 24.0);
        input.components = vec![Component::new(ComponentKind::Door, 20.0)];
        let result = calculator().calculate_from_exterior(&input).unwrap();
        assert!(result.validation.is_valid);
        assert_eq!(result.layout.unallocated.inches, 7.0);
        assert!(result.validation.warnings.iter().any(|w| w.contains("unallocated")));
        assert_eq!(result.layout.components[0].hinges, 2);
    }

    #[test]
    fn test_false_front_backing() {
        let mut input = CabinetInput::new(CabinetType::SinkBase, 36.0, 34.5, 24.0);
        input.components = vec![
            Component::new(ComponentKind::FalseFront, 6.0).u_shaped(),
            Component::new(ComponentKind::Door, 20.875),
        ];
        let result = calculator().calculate_from_exterior(&input).unwrap();
        let false_front = &result.layout.components[0];
        let backing = false_front.backing.as_ref().unwrap();
        assert_eq!(backing.width.inches(), 33.0 - 1.5);
        assert_eq!(backing.height.inches(), 7.0);
        assert_eq!(false_front.notes.len(), 1);
    }

    #[test]
    fn test_short_shelf_compartment_warns() {
        let mut input = CabinetInput::new(CabinetType::Wall, 30.0, 30.0, 12.0);
        input.components = vec![
            Component::new(ComponentKind::Door, 22.0),
            Component::new(ComponentKind::Shelf, 4.0),
        ];
        let result = calculator().calculate_from_exterior(&input).unwrap();
        let shelf = result.layout.components[1].shelf.as_ref().unwrap();
        assert_eq!(shelf.width.inches(), 28.375);
        assert_eq!(shelf.height.inches(), 11.0);
        assert!(result.validation.warnings.iter().any(|w| w.contains("shelf compartment")));
    }

    #[test]
    fn test_infeasible_box_names_quantity() {
        let input = CabinetInput::new(CabinetType::Base, 1.0, 34.5, 24.0);
        let err = calculator().calculate_from_exterior(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InfeasibleGeometry);
        assert_eq!(err.field(), Some("box.inside_width"));
    }

    #[test]
    fn test_tiny_drawer_band_names_component() {
        let mut input = CabinetInput::new(CabinetType::DrawerBase, 18.0, 34.5, 24.0);
        input.components = vec![Component::new(ComponentKind::Drawer, 0.2)];
        let err = calculator().calculate_from_exterior(&input).unwrap_err();
        assert_eq!(err.field(), Some("components[0].front_height"));
    }

    #[test]
    fn test_unknown_standards_not_found() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 24.0);
        input.construction_standards_id = Some("euro-32".to_string());
        let err = calculator().calculate_from_exterior(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_sufficient_depth_not_adjusted() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 24.0);
        input.toe_kick_height = Some(4.5);
        input.drawer_slide_length = Some(SlideLength::In18);
        input.auto_adjust_depth = true;
        let result = calculator().calculate_from_exterior(&input).unwrap();

        assert!(result.depth_adjustment.is_none());
        assert!(result.depth_check.as_ref().unwrap().is_sufficient);
        assert!(result.box_dimensions.inside_depth.inches() >= 18.75);
    }

    #[test]
    fn test_auto_adjust_depth_single_pass() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 16.0);
        input.toe_kick_height = Some(4.5);
        input.drawer_slide_length = Some(SlideLength::In18);
        input.auto_adjust_depth = true;
        let result = calculator().calculate_from_exterior(&input).unwrap();

        let adjustment = result.depth_adjustment.as_ref().unwrap();
        assert_eq!(adjustment.adjusted_exterior_depth.inches, 18.75 + 0.75);
        assert_eq!(result.exterior.depth, 19.5);
        assert_eq!(result.input.exterior.depth, 16.0);
        assert_eq!(result.box_dimensions.inside_depth.inches(), 18.75);
        assert!(result.validation.is_valid);
    }

    #[test]
    fn test_auto_adjust_runs_before_depth_feasibility() {
        // Half an inch deep: no box interior at all before adjusting
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 0.5);
        input.drawer_slide_length = Some(SlideLength::In15);
        input.auto_adjust_depth = true;
        let result = calculator().calculate_from_exterior(&input).unwrap();

        assert_eq!(result.exterior.depth, 15.75 + 0.75);
        assert_eq!(result.depth_adjustment.unwrap().original_exterior_depth.inches, 0.5);
        assert!(result.depth_check.unwrap().is_sufficient);

        input.auto_adjust_depth = false;
        let err = calculator().calculate_from_exterior(&input).unwrap_err();
        assert_eq!(err.field(), Some("box.inside_depth"));
    }

    #[test]
    fn test_shortfall_without_auto_adjust_is_reported() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 16.0);
        input.drawer_slide_length = Some(SlideLength::In18);
        let result = calculator().calculate_from_exterior(&input).unwrap();

        assert!(result.depth_adjustment.is_none());
        assert_eq!(result.exterior.depth, 16.0);
        assert!(!result.validation.is_valid);
        assert!(!result.depth_check.unwrap().is_sufficient);
    }

    #[test]
    fn test_stretchers_for_matches_full_result() {
        let input = drawer_base();
        let plan = calculator().stretchers_for(&input).unwrap();
        let full = calculator().calculate_from_exterior(&input).unwrap();
        assert_eq!(plan, full.stretchers);
        assert!(!plan.stretchers.is_empty());
    }

    #[test]
    fn test_calculation_deterministic() {
        let a = calculator().calculate_from_exterior(&drawer_base()).unwrap();
        let b = calculator().calculate_from_exterior(&drawer_base()).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

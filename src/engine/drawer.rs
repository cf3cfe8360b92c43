//! Drawer-box configurator for undermount slides
//!
//! Sizes dovetail drawer boxes for Blum TANDEM style undermount runners:
//!
//! - Slide-side deductions are table driven by side thickness (1/2" or 5/8")
//! - A fixed 13/16" height deduction (1/4" top, 9/16" bottom clearance)
//! - Face-frame style adjusts the outer box after the slide deductions
//! - Box depth is the slide length; the shop adds 1/4" and rounds heights
//!   down to the nearest 1/2"
//!
//! Every function here is pure. Stacks are computed band by band in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{require_feasible, require_positive, CalcError};
use crate::core::fraction::{floor_to_half, round_cents, Measure};
use crate::engine::cut_list::{material, CutListItem};
use crate::entities::cabinet::{DrawerOpening, FaceFrameStyle, SlideLength};

/// Fixed top clearance above the drawer box
pub const TOP_CLEARANCE: f64 = 0.25;
/// Fixed clearance under the drawer box for the runner
pub const BOTTOM_CLEARANCE: f64 = 0.5625;
/// Opening height minus box height
pub const HEIGHT_DEDUCTION: f64 = TOP_CLEARANCE + BOTTOM_CLEARANCE;

/// Drawer-box stock and joinery
pub const BOX_MATERIAL_THICKNESS: f64 = 0.5;
pub const BOX_BOTTOM_THICKNESS: f64 = 0.25;
pub const DADO_DEPTH: f64 = 0.25;
pub const BOTTOM_DADO_HEIGHT: f64 = 0.5;
pub const BOTTOM_CLEARANCE_IN_DADO: f64 = 0.0625;

/// Added to the slide length for the cut depth of the sides
pub const SHOP_DEPTH_ADDITION: f64 = 0.25;
/// Added to the slide length for the shop's minimum inside cabinet depth
pub const SHOP_MIN_DEPTH_ADDITION: f64 = 0.75;

/// Runner mounting, measured from the bottom of the opening (37 mm)
pub const RUNNER_HEIGHT_FROM_BOTTOM: f64 = 1.46875;
pub const RUNNER_SETBACK: f64 = 0.125;
pub const FRONT_HOLE_POSITIONS: [f64; 2] = [0.28125, 1.25];
pub const RUNNER_SCREW: &str = "#6 x 5/8\"";

pub const LOCKING_BORE_DIAMETER: f64 = 0.25;
pub const LOCKING_BORE_DEPTH: f64 = 0.40625;

pub const REAR_HOOK_BORE_DIAMETER: f64 = 0.09375;
pub const REAR_HOOK_FROM_BOTTOM: f64 = 0.28125;
pub const REAR_HOOK_FROM_SIDE: f64 = 0.4375;
pub const MIN_REAR_NOTCH: f64 = 1.375;

/// Boxes under these sizes are flagged, not rejected
pub const MIN_BOX_WIDTH: f64 = 3.0;
pub const MIN_BOX_HEIGHT: f64 = 2.0;

/// Most drawers a single stack or quote may hold
pub const MAX_DRAWERS: usize = 10;

/// Tolerance on a height distribution summing to 1.0
pub const DISTRIBUTION_TOLERANCE: f64 = 0.001;

/// Deductions for one supported drawer-side thickness
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideDeductions {
    pub side_thickness: f64,
    /// Taken off each side of the opening for the outer box width
    pub side_deduction: f64,
    pub inside_width_deduction: f64,
    pub bottom_recess: f64,
}

const SIDE_DEDUCTIONS: [SideDeductions; 2] = [
    SideDeductions {
        side_thickness: 0.5,
        side_deduction: 0.3125,
        inside_width_deduction: 1.65625,
        bottom_recess: 0.5,
    },
    SideDeductions {
        side_thickness: 0.625,
        side_deduction: 0.203125,
        inside_width_deduction: 1.3125,
        bottom_recess: 0.5,
    },
];

impl SideDeductions {
    pub fn for_thickness(thickness: f64) -> Result<Self, CalcError> {
        SIDE_DEDUCTIONS
            .iter()
            .copied()
            .find(|d| (d.side_thickness - thickness).abs() < 1e-9)
            .ok_or_else(|| {
                CalcError::invalid(
                    "slide_side_thickness",
                    format!("unsupported drawer side thickness {} (expected 0.5 or 0.625)", thickness),
                )
            })
    }
}

/// Manufacturer minimum inside cabinet depth per slide length
pub fn blum_minimum_depth(length: SlideLength) -> f64 {
    match length {
        SlideLength::In9 => 10.46875,
        SlideLength::In12 => 12.90625,
        SlideLength::In15 => 15.90625,
        SlideLength::In18 => 18.90625,
        SlideLength::In21 => 21.9375,
    }
}

/// Shop minimum inside cabinet depth per slide length
pub fn shop_minimum_depth(length: SlideLength) -> f64 {
    length.as_f64() + SHOP_MIN_DEPTH_ADDITION
}

/// Cabinet depth needed for a slide length
pub fn required_depth_for(length: SlideLength) -> f64 {
    shop_minimum_depth(length)
}

/// Longest standard slide whose shop minimum fits the depth
pub fn max_slide_for(depth: f64) -> Option<SlideLength> {
    SlideLength::all()
        .iter()
        .rev()
        .copied()
        .find(|l| shop_minimum_depth(*l) <= depth)
}

/// Depth check for one slide length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthSufficiency {
    pub cabinet_depth: f64,
    pub slide_length: SlideLength,
    pub is_sufficient: bool,
    pub shop_minimum: Measure,
    pub blum_minimum: Measure,
    /// How much deeper the cabinet must be (zero when sufficient)
    pub shortfall: Measure,
    pub max_slide: Option<SlideLength>,
    pub recommendation: String,
}

pub fn depth_sufficiency(cabinet_depth: f64, slide_length: SlideLength) -> Result<DepthSufficiency, CalcError> {
    require_positive("cabinet_depth", cabinet_depth)?;

    let shop_minimum = shop_minimum_depth(slide_length);
    let is_sufficient = cabinet_depth >= shop_minimum;
    let shortfall = if is_sufficient { 0.0 } else { shop_minimum - cabinet_depth };
    let max_slide = max_slide_for(cabinet_depth);

    let recommendation = if is_sufficient {
        format!(
            "{} depth is sufficient for {} slides",
            Measure::new(cabinet_depth),
            slide_length
        )
    } else {
        let alternative = match max_slide {
            Some(l) => format!(", or use {} slides", l),
            None => ", no standard slide fits this depth".to_string(),
        };
        format!(
            "increase depth by {} to {}{}",
            Measure::new(shortfall),
            Measure::new(shop_minimum),
            alternative
        )
    };

    Ok(DepthSufficiency {
        cabinet_depth,
        slide_length,
        is_sufficient,
        shop_minimum: Measure::new(shop_minimum),
        blum_minimum: Measure::new(blum_minimum_depth(slide_length)),
        shortfall: Measure::new(shortfall),
        max_slide,
        recommendation,
    })
}

/// One row of the minimum-depth reference table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinDepthRow {
    pub slide_length: SlideLength,
    pub blum_minimum: Measure,
    pub shop_minimum: Measure,
}

pub fn min_cabinet_depths() -> Vec<MinDepthRow> {
    SlideLength::all()
        .iter()
        .map(|l| MinDepthRow {
            slide_length: *l,
            blum_minimum: Measure::new(blum_minimum_depth(*l)),
            shop_minimum: Measure::new(shop_minimum_depth(*l)),
        })
        .collect()
}

/// A reference dimension with its metric source value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefDim {
    pub mm: f64,
    #[serde(flatten)]
    pub value: Measure,
}

impl RefDim {
    fn new(mm: f64, inches: f64) -> Self {
        Self {
            mm,
            value: Measure::new(inches),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerSpec {
    pub height_from_bottom: RefDim,
    pub setback_from_face: RefDim,
    pub front_hole_positions: Vec<RefDim>,
    pub screw: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoreSpec {
    pub diameter: RefDim,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<RefDim>,
    pub per_drawer: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RearHookSpec {
    pub bore: BoreSpec,
    pub from_bottom: RefDim,
    pub from_side: RefDim,
    pub minimum_rear_notch: RefDim,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxConstructionSpec {
    pub material_thickness: Measure,
    pub bottom_thickness: Measure,
    pub dado_depth: Measure,
    pub bottom_dado_height: Measure,
    pub bottom_clearance_in_dado: Measure,
    pub shop_depth_addition: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearanceSpec {
    pub top: RefDim,
    pub bottom: RefDim,
    pub height_deduction: RefDim,
}

/// Published hardware reference geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceSpecs {
    pub side_deductions: Vec<SideDeductions>,
    pub clearances: ClearanceSpec,
    pub runner: RunnerSpec,
    pub locking_device: BoreSpec,
    pub rear_hook: RearHookSpec,
    pub box_construction: BoxConstructionSpec,
    pub min_cabinet_depths: Vec<MinDepthRow>,
}

pub fn reference_specs() -> ReferenceSpecs {
    ReferenceSpecs {
        side_deductions: SIDE_DEDUCTIONS.to_vec(),
        clearances: ClearanceSpec {
            top: RefDim::new(6.0, TOP_CLEARANCE),
            bottom: RefDim::new(14.0, BOTTOM_CLEARANCE),
            height_deduction: RefDim::new(20.0, HEIGHT_DEDUCTION),
        },
        runner: RunnerSpec {
            height_from_bottom: RefDim::new(37.0, RUNNER_HEIGHT_FROM_BOTTOM),
            setback_from_face: RefDim::new(3.0, RUNNER_SETBACK),
            front_hole_positions: vec![
                RefDim::new(7.0, FRONT_HOLE_POSITIONS[0]),
                RefDim::new(32.0, FRONT_HOLE_POSITIONS[1]),
            ],
            screw: RUNNER_SCREW,
        },
        locking_device: BoreSpec {
            diameter: RefDim::new(6.0, LOCKING_BORE_DIAMETER),
            depth: Some(RefDim::new(10.0, LOCKING_BORE_DEPTH)),
            per_drawer: 2,
        },
        rear_hook: RearHookSpec {
            bore: BoreSpec {
                diameter: RefDim::new(2.5, REAR_HOOK_BORE_DIAMETER),
                depth: None,
                per_drawer: 2,
            },
            from_bottom: RefDim::new(7.0, REAR_HOOK_FROM_BOTTOM),
            from_side: RefDim::new(11.0, REAR_HOOK_FROM_SIDE),
            minimum_rear_notch: RefDim::new(35.0, MIN_REAR_NOTCH),
        },
        box_construction: BoxConstructionSpec {
            material_thickness: Measure::new(BOX_MATERIAL_THICKNESS),
            bottom_thickness: Measure::new(BOX_BOTTOM_THICKNESS),
            dado_depth: Measure::new(DADO_DEPTH),
            bottom_dado_height: Measure::new(BOTTOM_DADO_HEIGHT),
            bottom_clearance_in_dado: Measure::new(BOTTOM_CLEARANCE_IN_DADO),
            shop_depth_addition: Measure::new(SHOP_DEPTH_ADDITION),
        },
        min_cabinet_depths: min_cabinet_depths(),
    }
}

/// Catalog entry for a priced hardware item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareProduct {
    pub model: String,
    pub name: String,
    pub unit_price: f64,
}

/// Slide runners and locking devices used for quick quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideCatalog {
    /// Keyed by slide length in inches
    pub slides: BTreeMap<u32, HardwareProduct>,
    pub locking_device: HardwareProduct,
}

impl Default for SlideCatalog {
    fn default() -> Self {
        let runner = |model: &str, length: u32, unit_price: f64| {
            (
                length,
                HardwareProduct {
                    model: model.to_string(),
                    name: format!("Blum TANDEM runner {}\"", length),
                    unit_price,
                },
            )
        };
        Self {
            slides: BTreeMap::from([
                runner("563H2290B", 9, 12.95),
                runner("563H3050B", 12, 13.60),
                runner("563H3810B", 15, 17.50),
                runner("563H4570B", 18, 14.23),
                runner("563H5330B", 21, 32.61),
            ]),
            locking_device: HardwareProduct {
                model: "T51.1901".to_string(),
                name: "Blum TANDEM 563/569 locking device".to_string(),
                unit_price: 0.73,
            },
        }
    }
}

impl SlideCatalog {
    pub fn slide(&self, length: SlideLength) -> Option<&HardwareProduct> {
        self.slides.get(&length.inches())
    }
}

/// Slide chosen for a box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideSelection {
    pub length: SlideLength,
    pub model: Option<String>,
    pub shop_minimum_depth: Measure,
    pub blum_minimum_depth: Measure,
}

/// Deductions and adjustments applied to an opening
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedClearances {
    pub side_deduction_per_side: Measure,
    pub inside_width_deduction: Measure,
    pub top_clearance: Measure,
    pub bottom_clearance: Measure,
    pub height_deduction: Measure,
    pub style_width_adjustment: Measure,
    pub style_height_adjustment: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSize {
    pub width: Measure,
    pub height: Measure,
    pub depth: Measure,
}

/// Bottom panel at its cut size
///
/// Width and depth include the material that runs into the dado on every
/// edge, less a 1/16" fit allowance, so they match the "Bottom" cut-list row
/// rather than the visible floor of the box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BottomPanel {
    pub width: Measure,
    pub depth: Measure,
    pub thickness: Measure,
    pub recess_from_bottom: Measure,
    pub dado_depth: Measure,
    pub formula: String,
}

/// A bore located on a drawer-box piece
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorePosition {
    pub piece: &'static str,
    /// From the left outer face of the box
    pub x: Measure,
    /// From the bottom edge of the box
    pub y: Measure,
    pub diameter: Measure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<Measure>,
}

/// Where the runners and bores go for this box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareMounting {
    /// Runner bottom above the bottom of the opening
    pub runner_height: Measure,
    pub runner_setback: Measure,
    /// From the front end of the runner
    pub front_hole_positions: Vec<Measure>,
    pub screw: &'static str,
    pub locking_device_bores: Vec<BorePosition>,
    pub rear_hook_bores: Vec<BorePosition>,
    pub minimum_rear_notch: Measure,
}

/// Complete drawer-box sizing for one opening
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawerBoxResult {
    pub opening: DrawerOpening,
    pub slide: SlideSelection,
    pub clearances: AppliedClearances,
    /// Theoretical outside dimensions (depth = slide length)
    pub outer: BoxSize,
    pub inner: BoxSize,
    /// Dimensions the shop cuts to
    pub shop: BoxSize,
    pub bottom_panel: BottomPanel,
    pub hardware: HardwareMounting,
    pub cut_list: Vec<CutListItem>,
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// Request to split an opening into a stack of drawers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackRequest {
    pub opening_width: f64,
    pub total_height: f64,
    pub opening_depth: f64,
    pub drawer_count: usize,

    /// Fractions of the total height, top to bottom
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_distribution: Option<Vec<f64>>,

    #[serde(default)]
    pub face_frame_style: FaceFrameStyle,

    #[serde(default = "default_side_thickness")]
    pub slide_side_thickness: f64,
}

/// Request for a drawer quote: one opening size, several identical drawers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickQuoteRequest {
    #[serde(flatten)]
    pub opening: DrawerOpening,

    #[serde(default = "default_drawer_count")]
    pub drawer_count: usize,
}

fn default_side_thickness() -> f64 {
    0.5
}

fn default_drawer_count() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    pub model: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickQuote {
    pub drawer_box: DrawerBoxResult,
    pub drawer_count: usize,
    pub slides: QuoteLine,
    pub locking_devices: QuoteLine,
    pub hardware_total: f64,
}

/// Drawer-box sizing with a hardware price catalog
#[derive(Debug, Clone, Default)]
pub struct DrawerConfigurator {
    catalog: SlideCatalog,
}

impl DrawerConfigurator {
    pub fn new(catalog: SlideCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SlideCatalog {
        &self.catalog
    }

    /// Size a drawer box for one opening
    pub fn compute_box(&self, opening: &DrawerOpening) -> Result<DrawerBoxResult, CalcError> {
        require_positive("opening.width", opening.width)?;
        require_positive("opening.height", opening.height)?;
        require_positive("opening.depth", opening.depth)?;
        let deductions = SideDeductions::for_thickness(opening.slide_side_thickness)?;

        let mut issues = Vec::new();

        let length = match opening.slide_length {
            Some(length) => {
                if opening.depth < shop_minimum_depth(length) {
                    issues.push(format!(
                        "opening depth {} is below the {} shop minimum for {} slides",
                        Measure::new(opening.depth),
                        Measure::new(shop_minimum_depth(length)),
                        length
                    ));
                }
                length
            }
            None => max_slide_for(opening.depth)
                .ok_or_else(|| CalcError::infeasible("slide_length", opening.depth))?,
        };

        // Slide deductions first, then the face-frame adjustment
        let (style_w, style_h) = opening.face_frame_style.box_adjustment();
        let outer_width = require_feasible(
            "drawer.outer_width",
            opening.width - 2.0 * deductions.side_deduction + style_w,
        )?;
        let inner_width = require_feasible(
            "drawer.inner_width",
            opening.width - deductions.inside_width_deduction + style_w,
        )?;
        let outer_height = require_feasible(
            "drawer.outer_height",
            opening.height - HEIGHT_DEDUCTION + style_h,
        )?;
        let shop_height = require_feasible("drawer.shop_height", floor_to_half(outer_height))?;
        let inner_height = require_feasible(
            "drawer.inner_height",
            outer_height - BOTTOM_DADO_HEIGHT - BOX_BOTTOM_THICKNESS,
        )?;

        let depth = length.as_f64();
        let shop_depth = depth + SHOP_DEPTH_ADDITION;
        let inner_depth = depth - 2.0 * BOX_MATERIAL_THICKNESS;

        let front_back_width = require_feasible(
            "drawer.front_back_width",
            outer_width - 2.0 * BOX_MATERIAL_THICKNESS,
        )?;
        let bottom_width = require_feasible(
            "drawer.bottom_width",
            front_back_width + 2.0 * DADO_DEPTH - BOTTOM_CLEARANCE_IN_DADO,
        )?;
        let bottom_depth =
            shop_depth - 2.0 * BOX_MATERIAL_THICKNESS + 2.0 * DADO_DEPTH - BOTTOM_CLEARANCE_IN_DADO;

        if outer_width < MIN_BOX_WIDTH {
            issues.push(format!(
                "box width {} is below the {} minimum",
                Measure::new(outer_width),
                Measure::new(MIN_BOX_WIDTH)
            ));
        }
        if outer_height < MIN_BOX_HEIGHT {
            issues.push(format!(
                "box height {} is below the {} minimum",
                Measure::new(outer_height),
                Measure::new(MIN_BOX_HEIGHT)
            ));
        }

        let cut_list = vec![
            CutListItem::new("Side", shop_depth, shop_height, BOX_MATERIAL_THICKNESS, 2, material::DRAWER_SIDE_PLYWOOD),
            CutListItem::new("Front", front_back_width, shop_height, BOX_MATERIAL_THICKNESS, 1, material::DRAWER_SIDE_PLYWOOD),
            CutListItem::new("Back", front_back_width, shop_height, BOX_MATERIAL_THICKNESS, 1, material::DRAWER_SIDE_PLYWOOD),
            CutListItem::new("Bottom", bottom_width, bottom_depth, BOX_BOTTOM_THICKNESS, 1, material::DRAWER_BOTTOM_PLYWOOD),
        ];

        let hardware = hardware_mounting(outer_width);

        Ok(DrawerBoxResult {
            opening: opening.clone(),
            slide: SlideSelection {
                length,
                model: self.catalog.slide(length).map(|p| p.model.clone()),
                shop_minimum_depth: Measure::new(shop_minimum_depth(length)),
                blum_minimum_depth: Measure::new(blum_minimum_depth(length)),
            },
            clearances: AppliedClearances {
                side_deduction_per_side: Measure::new(deductions.side_deduction),
                inside_width_deduction: Measure::new(deductions.inside_width_deduction),
                top_clearance: Measure::new(TOP_CLEARANCE),
                bottom_clearance: Measure::new(BOTTOM_CLEARANCE),
                height_deduction: Measure::new(HEIGHT_DEDUCTION),
                style_width_adjustment: Measure::new(style_w),
                style_height_adjustment: Measure::new(style_h),
            },
            outer: BoxSize {
                width: Measure::new(outer_width),
                height: Measure::new(outer_height),
                depth: Measure::new(depth),
            },
            inner: BoxSize {
                width: Measure::new(inner_width),
                height: Measure::new(inner_height),
                depth: Measure::new(inner_depth),
            },
            shop: BoxSize {
                width: Measure::new(outer_width),
                height: Measure::new(shop_height),
                depth: Measure::new(shop_depth),
            },
            bottom_panel: BottomPanel {
                width: Measure::new(bottom_width),
                depth: Measure::new(bottom_depth),
                thickness: Measure::new(BOX_BOTTOM_THICKNESS),
                recess_from_bottom: Measure::new(deductions.bottom_recess),
                dado_depth: Measure::new(DADO_DEPTH),
                formula: format!(
                    "cut size: front/back width + 2 x dado - fit = {} + 2 x {} - {} by shop depth - 2 x side + 2 x dado - fit = {} - 2 x {} + 2 x {} - {}",
                    front_back_width,
                    DADO_DEPTH,
                    BOTTOM_CLEARANCE_IN_DADO,
                    shop_depth,
                    BOX_MATERIAL_THICKNESS,
                    DADO_DEPTH,
                    BOTTOM_CLEARANCE_IN_DADO
                ),
            },
            hardware,
            cut_list,
            is_valid: issues.is_empty(),
            issues,
        })
    }

    /// Split a total opening height into drawers and size each one
    pub fn compute_stack(&self, request: &StackRequest) -> Result<Vec<DrawerBoxResult>, CalcError> {
        require_positive("opening_width", request.opening_width)?;
        require_positive("total_height", request.total_height)?;
        require_positive("opening_depth", request.opening_depth)?;
        if request.drawer_count == 0 || request.drawer_count > MAX_DRAWERS {
            return Err(CalcError::invalid(
                "drawer_count",
                format!("must be between 1 and {} (got {})", MAX_DRAWERS, request.drawer_count),
            ));
        }

        let heights = band_heights(
            request.total_height,
            request.drawer_count,
            request.height_distribution.as_deref(),
        )?;

        heights
            .par_iter()
            .map(|height| {
                let opening = DrawerOpening {
                    width: request.opening_width,
                    height: *height,
                    depth: request.opening_depth,
                    slide_side_thickness: request.slide_side_thickness,
                    face_frame_style: request.face_frame_style,
                    slide_length: None,
                };
                self.compute_box(&opening)
            })
            .collect()
    }

    /// Drawer boxes plus slide and locking-device pricing
    pub fn quick_quote(&self, request: &QuickQuoteRequest) -> Result<QuickQuote, CalcError> {
        if request.drawer_count == 0 || request.drawer_count > MAX_DRAWERS {
            return Err(CalcError::invalid(
                "drawer_count",
                format!("must be between 1 and {} (got {})", MAX_DRAWERS, request.drawer_count),
            ));
        }
        let drawer_box = self.compute_box(&request.opening)?;
        let drawers = request.drawer_count as u32;

        let slide = self.catalog.slide(drawer_box.slide.length).ok_or_else(|| CalcError::NotFound {
            kind: "slide catalog entry",
            id: drawer_box.slide.length.to_string(),
        })?;
        let slides = quote_line(slide, drawers * 2);
        let locking_devices = quote_line(&self.catalog.locking_device, drawers);
        let hardware_total = round_cents(slides.total_cost + locking_devices.total_cost);

        Ok(QuickQuote {
            drawer_box,
            drawer_count: request.drawer_count,
            slides,
            locking_devices,
            hardware_total,
        })
    }
}

fn quote_line(product: &HardwareProduct, quantity: u32) -> QuoteLine {
    QuoteLine {
        model: product.model.clone(),
        name: product.name.clone(),
        quantity,
        unit_price: product.unit_price,
        total_cost: round_cents(product.unit_price * f64::from(quantity)),
    }
}

/// Band heights for a stack, top to bottom
fn band_heights(total: f64, count: usize, distribution: Option<&[f64]>) -> Result<Vec<f64>, CalcError> {
    let fractions: Vec<f64> = match distribution {
        None => vec![1.0 / count as f64; count],
        Some(values) => {
            if values.len() != count {
                return Err(CalcError::invalid(
                    "height_distribution",
                    format!("has {} entries but drawer_count is {}", values.len(), count),
                ));
            }
            if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(CalcError::invalid(
                    "height_distribution",
                    format!("entries must be greater than zero (got {})", bad),
                ));
            }
            let sum: f64 = values.iter().sum();
            if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
                return Err(CalcError::invalid(
                    "height_distribution",
                    format!("must sum to 1.0 (got {:.4})", sum),
                ));
            }
            values.to_vec()
        }
    };

    // Last band takes the remainder so the bands add up to the total
    let mut heights: Vec<f64> = fractions.iter().map(|f| total * f).collect();
    let allocated: f64 = heights[..count - 1].iter().sum();
    heights[count - 1] = total - allocated;
    Ok(heights)
}

fn hardware_mounting(outer_width: f64) -> HardwareMounting {
    let side_bore = |x: f64| BorePosition {
        piece: "side",
        x: Measure::new(x),
        y: Measure::new(BOTTOM_DADO_HEIGHT),
        diameter: Measure::new(LOCKING_BORE_DIAMETER),
        depth: Some(Measure::new(LOCKING_BORE_DEPTH)),
    };
    let hook_bore = |x: f64| BorePosition {
        piece: "back",
        x: Measure::new(x),
        y: Measure::new(REAR_HOOK_FROM_BOTTOM),
        diameter: Measure::new(REAR_HOOK_BORE_DIAMETER),
        depth: None,
    };

    HardwareMounting {
        runner_height: Measure::new(RUNNER_HEIGHT_FROM_BOTTOM),
        runner_setback: Measure::new(RUNNER_SETBACK),
        front_hole_positions: FRONT_HOLE_POSITIONS.iter().map(|p| Measure::new(*p)).collect(),
        screw: RUNNER_SCREW,
        locking_device_bores: vec![
            side_bore(BOX_MATERIAL_THICKNESS / 2.0),
            side_bore(outer_width - BOX_MATERIAL_THICKNESS / 2.0),
        ],
        rear_hook_bores: vec![
            hook_bore(REAR_HOOK_FROM_SIDE),
            hook_bore(outer_width - REAR_HOOK_FROM_SIDE),
        ],
        minimum_rear_notch: Measure::new(MIN_REAR_NOTCH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configurator() -> DrawerConfigurator {
        DrawerConfigurator::default()
    }

    #[test]
    fn test_full_overlay_half_inch_sides() {
        let opening = DrawerOpening::new(18.0, 6.0, 21.0);
        let result = configurator().compute_box(&opening).unwrap();

        assert_eq!(result.outer.width.inches, 18.0 - 2.0 * 0.3125);
        assert_eq!(result.inner.width.inches, 16.34375);
        assert_eq!(result.inner.width.fraction, "16 3/8\"");
        assert_eq!(result.outer.height.inches, 6.0 - 0.8125);
        assert_eq!(result.bottom_panel.recess_from_bottom.inches, 0.5);
        assert_eq!(result.slide.length, SlideLength::In18);
        assert_eq!(result.outer.depth.inches, 18.0);
        assert_eq!(result.shop.depth.inches, 18.25);
        assert_eq!(result.shop.height.inches, 5.0);
        assert!(result.is_valid);
    }

    #[test]
    fn test_five_eighths_sides() {
        let mut opening = DrawerOpening::new(18.0, 6.0, 21.0);
        opening.slide_side_thickness = 0.625;
        let result = configurator().compute_box(&opening).unwrap();
        assert_eq!(result.outer.width.inches, 17.59375);
        assert_eq!(result.inner.width.inches, 18.0 - 1.3125);
    }

    #[test]
    fn test_unsupported_thickness_rejected() {
        let mut opening = DrawerOpening::new(18.0, 6.0, 21.0);
        opening.slide_side_thickness = 0.75;
        let err = configurator().compute_box(&opening).unwrap_err();
        assert_eq!(err.field(), Some("slide_side_thickness"));
    }

    #[test]
    fn test_inset_adjusts_after_deductions() {
        let mut opening = DrawerOpening::new(18.0, 6.0, 21.0);
        opening.face_frame_style = FaceFrameStyle::Inset;
        let result = configurator().compute_box(&opening).unwrap();
        assert_eq!(result.outer.width.inches, 18.0 - 0.625 - 0.125);
        assert_eq!(result.outer.height.inches, 6.0 - 0.8125 - 0.125);
        assert_eq!(result.clearances.style_width_adjustment.inches, -0.125);
    }

    #[test]
    fn test_zero_opening_is_invalid_argument() {
        let opening = DrawerOpening::new(0.0, 6.0, 21.0);
        let err = configurator().compute_box(&opening).unwrap_err();
        assert!(matches!(err, CalcError::InvalidArgument { .. }));
    }

    #[test]
    fn test_tiny_opening_is_infeasible() {
        let opening = DrawerOpening::new(18.0, 0.75, 21.0);
        let err = configurator().compute_box(&opening).unwrap_err();
        assert!(matches!(err, CalcError::InfeasibleGeometry { .. }));
        assert_eq!(err.field(), Some("drawer.outer_height"));
    }

    #[test]
    fn test_shallow_opening_is_infeasible() {
        let opening = DrawerOpening::new(18.0, 6.0, 8.0);
        let err = configurator().compute_box(&opening).unwrap_err();
        assert!(matches!(err, CalcError::InfeasibleGeometry { .. }));
        assert_eq!(err.field(), Some("slide_length"));
    }

    #[test]
    fn test_small_box_flagged_not_rejected() {
        let opening = DrawerOpening::new(3.5, 2.5, 12.0);
        let result = configurator().compute_box(&opening).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_pinned_slide_too_long_flagged() {
        let mut opening = DrawerOpening::new(18.0, 6.0, 16.0);
        opening.slide_length = Some(SlideLength::In18);
        let result = configurator().compute_box(&opening).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.slide.length, SlideLength::In18);
    }

    #[test]
    fn test_compute_box_deterministic() {
        let opening = DrawerOpening::new(15.5, 7.25, 22.0);
        let a = configurator().compute_box(&opening).unwrap();
        let b = configurator().compute_box(&opening).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_cut_list_dovetail_pieces() {
        let opening = DrawerOpening::new(18.0, 6.0, 21.0);
        let result = configurator().compute_box(&opening).unwrap();
        let names: Vec<&str> = result.cut_list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Side", "Front", "Back", "Bottom"]);

        let front = &result.cut_list[1];
        assert_eq!(front.width.inches, 17.375 - 1.0);
        let bottom = &result.cut_list[3];
        assert_eq!(bottom.width.inches, 17.375 - 1.0 + 0.5 - 0.0625);
        assert_eq!(bottom.height.inches, 18.25 - 1.0 + 0.5 - 0.0625);
    }

    #[test]
    fn test_bottom_panel_reports_cut_size() {
        let opening = DrawerOpening::new(18.0, 6.0, 21.0);
        let result = configurator().compute_box(&opening).unwrap();
        let panel = &result.bottom_panel;
        let cut = result.cut_list.iter().find(|c| c.name == "Bottom").unwrap();

        assert_eq!(panel.width, cut.width);
        assert_eq!(panel.depth, cut.height);
        // wider than the front it sits behind by the two dado tongues
        let front = result.cut_list.iter().find(|c| c.name == "Front").unwrap();
        assert_eq!(panel.width.inches, front.width.inches + 0.5 - 0.0625);
        assert!(panel.formula.starts_with("cut size:"));
        assert!(panel.formula.contains("2 x 0.25 - 0.0625"));
    }

    #[test]
    fn test_rear_hook_bores_from_each_side() {
        let opening = DrawerOpening::new(18.0, 6.0, 21.0);
        let result = configurator().compute_box(&opening).unwrap();
        let bores = &result.hardware.rear_hook_bores;
        assert_eq!(bores[0].x.inches, 0.4375);
        assert_eq!(bores[1].x.inches, 17.375 - 0.4375);
        assert_eq!(bores[0].y.inches, 0.28125);
    }

    #[test]
    fn test_depth_sufficiency_inverse_of_required_depth() {
        for length in SlideLength::all() {
            let required = required_depth_for(*length);
            assert!(depth_sufficiency(required, *length).unwrap().is_sufficient);
            assert!(!depth_sufficiency(required - 1e-6, *length).unwrap().is_sufficient);
        }
    }

    #[test]
    fn test_depth_sufficiency_recommendation() {
        let report = depth_sufficiency(17.0, SlideLength::In18).unwrap();
        assert!(!report.is_sufficient);
        assert_eq!(report.shortfall.inches, 1.75);
        assert_eq!(report.max_slide, Some(SlideLength::In15));
        assert_eq!(report.blum_minimum.inches, 18.90625);
        assert!(report.recommendation.contains("15\""));
    }

    #[test]
    fn test_max_slide_for() {
        assert_eq!(max_slide_for(24.0), Some(SlideLength::In21));
        assert_eq!(max_slide_for(21.75), Some(SlideLength::In21));
        assert_eq!(max_slide_for(21.7), Some(SlideLength::In18));
        assert_eq!(max_slide_for(9.75), Some(SlideLength::In9));
        assert_eq!(max_slide_for(9.0), None);
    }

    #[test]
    fn test_uniform_stack_heights_sum_to_total() {
        for n in 1..=MAX_DRAWERS {
            let request = StackRequest {
                opening_width: 18.0,
                total_height: 30.0,
                opening_depth: 21.0,
                drawer_count: n,
                height_distribution: Some(vec![1.0 / n as f64; n]),
                face_frame_style: FaceFrameStyle::FullOverlay,
                slide_side_thickness: 0.5,
            };
            let results = configurator().compute_stack(&request).unwrap();
            assert_eq!(results.len(), n);
            let sum: f64 = results.iter().map(|r| r.opening.height).sum();
            assert!((sum - 30.0).abs() < 1e-9, "n={} sum={}", n, sum);
        }
    }

    #[test]
    fn test_stack_distribution_order_top_to_bottom() {
        let request = StackRequest {
            opening_width: 18.0,
            total_height: 24.0,
            opening_depth: 21.0,
            drawer_count: 3,
            height_distribution: Some(vec![0.25, 0.25, 0.5]),
            face_frame_style: FaceFrameStyle::FullOverlay,
            slide_side_thickness: 0.5,
        };
        let results = configurator().compute_stack(&request).unwrap();
        assert_eq!(results[0].opening.height, 6.0);
        assert_eq!(results[2].opening.height, 12.0);
    }

    #[test]
    fn test_stack_distribution_mismatch_rejected() {
        let mut request = StackRequest {
            opening_width: 18.0,
            total_height: 24.0,
            opening_depth: 21.0,
            drawer_count: 3,
            height_distribution: Some(vec![0.5, 0.5]),
            face_frame_style: FaceFrameStyle::FullOverlay,
            slide_side_thickness: 0.5,
        };
        let err = configurator().compute_stack(&request).unwrap_err();
        assert_eq!(err.field(), Some("height_distribution"));

        request.height_distribution = Some(vec![0.3, 0.3, 0.3]);
        assert!(configurator().compute_stack(&request).is_err());
    }

    #[test]
    fn test_quick_quote_rollup() {
        let request = QuickQuoteRequest {
            opening: DrawerOpening::new(18.0, 6.0, 21.0),
            drawer_count: 3,
        };
        let quote = configurator().quick_quote(&request).unwrap();
        assert_eq!(quote.slides.model, "563H4570B");
        assert_eq!(quote.slides.quantity, 6);
        assert_eq!(quote.slides.total_cost, 85.38);
        assert_eq!(quote.locking_devices.quantity, 3);
        assert_eq!(quote.locking_devices.total_cost, 2.19);
        assert_eq!(quote.hardware_total, 87.57);
    }

    #[test]
    fn test_reference_specs_values() {
        let specs = reference_specs();
        assert_eq!(specs.runner.height_from_bottom.mm, 37.0);
        assert_eq!(specs.runner.height_from_bottom.value.inches, 1.46875);
        assert_eq!(specs.rear_hook.minimum_rear_notch.value.inches, 1.375);
        assert_eq!(specs.min_cabinet_depths.len(), 5);
        assert_eq!(specs.side_deductions.len(), 2);
    }
}

//! Cabinet input model: exterior dimensions, type, vertical components

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{require_positive, CalcError};

/// Cabinet type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinetType {
    Base,
    SinkBase,
    Wall,
    Upper,
    VanitySink,
    KitchenSink,
    DrawerBase,
    Pantry,
}

/// How the top of the carcass is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopConstruction {
    /// Front and back stretchers under the countertop
    Stretchers,
    /// Full top panel
    Panel,
    /// Open top for sink and plumbing
    Open,
}

impl CabinetType {
    pub fn all() -> &'static [CabinetType] {
        &[
            CabinetType::Base,
            CabinetType::SinkBase,
            CabinetType::Wall,
            CabinetType::Upper,
            CabinetType::VanitySink,
            CabinetType::KitchenSink,
            CabinetType::DrawerBase,
            CabinetType::Pantry,
        ]
    }

    pub fn is_sink(&self) -> bool {
        matches!(
            self,
            CabinetType::SinkBase | CabinetType::VanitySink | CabinetType::KitchenSink
        )
    }

    /// Wall-hung cabinets have no toe kick
    pub fn is_wall_hung(&self) -> bool {
        matches!(self, CabinetType::Wall | CabinetType::Upper)
    }

    pub fn top_construction(&self) -> TopConstruction {
        match self {
            CabinetType::Base | CabinetType::DrawerBase => TopConstruction::Stretchers,
            CabinetType::Wall | CabinetType::Upper | CabinetType::Pantry => TopConstruction::Panel,
            CabinetType::SinkBase | CabinetType::VanitySink | CabinetType::KitchenSink => {
                TopConstruction::Open
            }
        }
    }
}

impl fmt::Display for CabinetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CabinetType::Base => "base",
            CabinetType::SinkBase => "sink_base",
            CabinetType::Wall => "wall",
            CabinetType::Upper => "upper",
            CabinetType::VanitySink => "vanity_sink",
            CabinetType::KitchenSink => "kitchen_sink",
            CabinetType::DrawerBase => "drawer_base",
            CabinetType::Pantry => "pantry",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CabinetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CabinetType::all()
            .iter()
            .copied()
            .find(|t| t.to_string() == s.to_lowercase().replace('-', "_"))
            .ok_or_else(|| format!("Invalid cabinet type: {}", s))
    }
}

/// Kind of vertical component in the cabinet elevation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Drawer,
    FalseFront,
    Door,
    Shelf,
}

impl ComponentKind {
    /// Whether the component itself braces the carcass at its seams
    pub fn is_rigid(&self) -> bool {
        matches!(self, ComponentKind::FalseFront | ComponentKind::Shelf)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentKind::Drawer => "drawer",
            ComponentKind::FalseFront => "false_front",
            ComponentKind::Door => "door",
            ComponentKind::Shelf => "shelf",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentShape {
    #[default]
    Standard,
    /// Cut out around sink plumbing
    UShaped,
}

/// One vertical component, listed top to bottom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub height: f64,
    #[serde(default)]
    pub shape: ComponentShape,
}

impl Component {
    pub fn new(kind: ComponentKind, height: f64) -> Self {
        Self {
            kind,
            height,
            shape: ComponentShape::Standard,
        }
    }

    pub fn u_shaped(mut self) -> Self {
        self.shape = ComponentShape::UShaped;
        self
    }
}

/// Face-frame construction style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceFrameStyle {
    #[default]
    FullOverlay,
    Inset,
    PartialOverlay,
    Frameless,
}

impl FaceFrameStyle {
    pub fn all() -> &'static [FaceFrameStyle] {
        &[
            FaceFrameStyle::FullOverlay,
            FaceFrameStyle::Inset,
            FaceFrameStyle::PartialOverlay,
            FaceFrameStyle::Frameless,
        ]
    }

    pub fn has_frame(&self) -> bool {
        !matches!(self, FaceFrameStyle::Frameless)
    }

    /// Inset and partial-overlay frames carry a mid-rail at every seam
    pub fn rails_at_every_seam(&self) -> bool {
        matches!(self, FaceFrameStyle::Inset | FaceFrameStyle::PartialOverlay)
    }

    /// Outer drawer-box (width, height) adjustment applied after slide deductions
    pub fn box_adjustment(&self) -> (f64, f64) {
        match self {
            FaceFrameStyle::FullOverlay | FaceFrameStyle::PartialOverlay => (0.0, 0.0),
            // 1/16" reveal on every side of an inset front
            FaceFrameStyle::Inset => (-0.125, -0.125),
            FaceFrameStyle::Frameless => (0.0, -0.125),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FaceFrameStyle::FullOverlay => "Doors and drawer fronts cover the frame; mid-rails only where the gap allows",
            FaceFrameStyle::Inset => "Fronts sit inside the frame opening; rails at every seam",
            FaceFrameStyle::PartialOverlay => "Fronts partially cover the frame; rails at every seam",
            FaceFrameStyle::Frameless => "No face frame; fronts mount to the box edges",
        }
    }
}

impl fmt::Display for FaceFrameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaceFrameStyle::FullOverlay => "full_overlay",
            FaceFrameStyle::Inset => "inset",
            FaceFrameStyle::PartialOverlay => "partial_overlay",
            FaceFrameStyle::Frameless => "frameless",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for FaceFrameStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "full_overlay" => Ok(FaceFrameStyle::FullOverlay),
            "inset" => Ok(FaceFrameStyle::Inset),
            "partial_overlay" => Ok(FaceFrameStyle::PartialOverlay),
            "frameless" => Ok(FaceFrameStyle::Frameless),
            _ => Err(format!("Invalid face frame style: {}", s)),
        }
    }
}

/// Standard drawer-slide lengths in inches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SlideLength {
    In9,
    In12,
    In15,
    In18,
    In21,
}

impl SlideLength {
    /// All lengths, shortest first
    pub fn all() -> &'static [SlideLength] {
        &[
            SlideLength::In9,
            SlideLength::In12,
            SlideLength::In15,
            SlideLength::In18,
            SlideLength::In21,
        ]
    }

    pub fn inches(&self) -> u32 {
        match self {
            SlideLength::In9 => 9,
            SlideLength::In12 => 12,
            SlideLength::In15 => 15,
            SlideLength::In18 => 18,
            SlideLength::In21 => 21,
        }
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.inches())
    }
}

impl TryFrom<u32> for SlideLength {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        SlideLength::all()
            .iter()
            .copied()
            .find(|l| l.inches() == value)
            .ok_or_else(|| format!("unsupported slide length {} (expected 9, 12, 15, 18 or 21)", value))
    }
}

impl From<SlideLength> for u32 {
    fn from(length: SlideLength) -> Self {
        length.inches()
    }
}

impl fmt::Display for SlideLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\"", self.inches())
    }
}

impl FromStr for SlideLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u32 = s
            .trim()
            .trim_end_matches('"')
            .parse()
            .map_err(|_| format!("Invalid slide length: {}", s))?;
        SlideLength::try_from(n)
    }
}

/// Outside dimensions of a cabinet in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exterior {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// Everything needed to size one cabinet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabinetInput {
    pub exterior: Exterior,

    /// Omitted means the standards default (0 for wall-hung types)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toe_kick_height: Option<f64>,

    pub cabinet_type: CabinetType,

    /// Top to bottom
    #[serde(default)]
    pub components: Vec<Component>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_standards_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawer_slide_length: Option<SlideLength>,

    #[serde(default)]
    pub auto_adjust_depth: bool,

    #[serde(default)]
    pub face_frame_style: FaceFrameStyle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_frame_stile_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_frame_rail_width: Option<f64>,
}

impl CabinetInput {
    pub fn new(cabinet_type: CabinetType, width: f64, height: f64, depth: f64) -> Self {
        Self {
            exterior: Exterior {
                width,
                height,
                depth,
            },
            toe_kick_height: None,
            cabinet_type,
            components: Vec::new(),
            construction_standards_id: None,
            drawer_slide_length: None,
            auto_adjust_depth: false,
            face_frame_style: FaceFrameStyle::default(),
            face_frame_stile_width: None,
            face_frame_rail_width: None,
        }
    }

    /// Reject malformed input before any derivation runs
    pub fn validate(&self) -> Result<(), CalcError> {
        require_positive("exterior.width", self.exterior.width)?;
        require_positive("exterior.height", self.exterior.height)?;
        require_positive("exterior.depth", self.exterior.depth)?;

        if let Some(toe) = self.toe_kick_height {
            if !toe.is_finite() || toe < 0.0 {
                return Err(CalcError::invalid(
                    "toe_kick_height",
                    format!("must be zero or greater (got {})", toe),
                ));
            }
        }
        if let Some(stile) = self.face_frame_stile_width {
            require_positive("face_frame_stile_width", stile)?;
        }
        if let Some(rail) = self.face_frame_rail_width {
            require_positive("face_frame_rail_width", rail)?;
        }
        for (i, component) in self.components.iter().enumerate() {
            require_positive(&format!("components[{}].height", i), component.height)?;
        }
        Ok(())
    }

    pub fn drawer_count(&self) -> usize {
        self.count_of(ComponentKind::Drawer)
    }

    pub fn count_of(&self, kind: ComponentKind) -> usize {
        self.components.iter().filter(|c| c.kind == kind).count()
    }
}

/// Drawer opening handed to the drawer configurator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawerOpening {
    pub width: f64,
    pub height: f64,
    pub depth: f64,

    #[serde(default = "default_side_thickness")]
    pub slide_side_thickness: f64,

    #[serde(default)]
    pub face_frame_style: FaceFrameStyle,

    /// Pin a slide length instead of taking the longest that fits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_length: Option<SlideLength>,
}

fn default_side_thickness() -> f64 {
    0.5
}

impl DrawerOpening {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
            slide_side_thickness: default_side_thickness(),
            face_frame_style: FaceFrameStyle::default(),
            slide_length: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cabinet_type_roundtrip() {
        for t in CabinetType::all() {
            assert_eq!(t.to_string().parse::<CabinetType>().unwrap(), *t);
        }
        assert!("credenza".parse::<CabinetType>().is_err());
    }

    #[test]
    fn test_top_construction_by_type() {
        assert_eq!(CabinetType::Base.top_construction(), TopConstruction::Stretchers);
        assert_eq!(CabinetType::Wall.top_construction(), TopConstruction::Panel);
        assert_eq!(CabinetType::KitchenSink.top_construction(), TopConstruction::Open);
        assert!(CabinetType::VanitySink.is_sink());
        assert!(CabinetType::Upper.is_wall_hung());
    }

    #[test]
    fn test_slide_length_serde() {
        let l: SlideLength = serde_json::from_str("18").unwrap();
        assert_eq!(l, SlideLength::In18);
        assert_eq!(serde_json::to_string(&SlideLength::In21).unwrap(), "21");
        assert!(serde_json::from_str::<SlideLength>("16").is_err());
        assert_eq!("12\"".parse::<SlideLength>().unwrap(), SlideLength::In12);
    }

    #[test]
    fn test_component_yaml() {
        let yaml = "type: false_front\nheight: 6.0\nshape: u_shaped\n";
        let c: Component = serde_yml::from_str(yaml).unwrap();
        assert_eq!(c.kind, ComponentKind::FalseFront);
        assert_eq!(c.shape, ComponentShape::UShaped);

        let c: Component = serde_yml::from_str("type: drawer\nheight: 6\n").unwrap();
        assert_eq!(c.shape, ComponentShape::Standard);
    }

    #[test]
    fn test_unknown_component_type_rejected() {
        let result: Result<Component, _> = serde_yml::from_str("type: hamper\nheight: 6\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let input = CabinetInput::new(CabinetType::Base, 30.0, 0.0, 24.0);
        let err = input.validate().unwrap_err();
        assert_eq!(err.field(), Some("exterior.height"));
    }

    #[test]
    fn test_validate_rejects_negative_toe_kick() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 24.0);
        input.toe_kick_height = Some(-1.0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_component_height() {
        let mut input = CabinetInput::new(CabinetType::Base, 30.0, 34.5, 24.0);
        input.components.push(Component::new(ComponentKind::Drawer, 6.0));
        input.components.push(Component::new(ComponentKind::Door, 0.0));
        let err = input.validate().unwrap_err();
        assert_eq!(err.field(), Some("components[1].height"));
    }

    #[test]
    fn test_face_frame_style_parse() {
        assert_eq!("full-overlay".parse::<FaceFrameStyle>().unwrap(), FaceFrameStyle::FullOverlay);
        assert_eq!(FaceFrameStyle::default(), FaceFrameStyle::FullOverlay);
        assert!(!FaceFrameStyle::Frameless.has_frame());
        assert!(FaceFrameStyle::Inset.rails_at_every_seam());
    }
}

//! Construction standards: the named constant tables every calculation uses
//!
//! The shop default ("TCS defaults") is compiled in. Additional templates
//! ship embedded from `standards/*.yaml`, and a workspace may add its own
//! under `.cabkit/standards/`. Once loaded, a registry is read-only.

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::error::CalcError;
use crate::engine::drawer::SideDeductions;

/// Id of the compiled-in standards set
pub const DEFAULT_STANDARDS_ID: &str = "default";

#[derive(Embed)]
#[folder = "standards/"]
struct BuiltinTemplates;

/// One named, versioned set of construction constants (inches)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionStandards {
    pub id: String,
    pub name: String,
    pub version: u32,

    /// Box sides, bottom and top stock
    pub panel_thickness: f64,
    pub back_panel_thickness: f64,

    pub face_frame_stile_width: f64,
    pub face_frame_rail_width: f64,

    /// Gap left around each door or drawer front
    pub reveal: f64,
    /// Vertical gap between stacked components on full-overlay frames
    pub component_gap: f64,

    pub toe_kick_default: f64,
    pub toe_kick_recess: f64,

    pub stretcher_depth: f64,
    pub stretcher_thickness: f64,

    /// Clearance between the back panel and the wall
    pub min_box_depth_margin: f64,

    /// Sink cabinet sides run past the box to carry the countertop
    pub sink_side_extension: f64,
    pub false_front_backing_overhang: f64,
    pub drawer_side_thickness: f64,

    /// Smallest vertical gap that gets its own mid-rail on full-overlay frames
    pub face_frame_rail_gap_min: f64,
}

impl Default for ConstructionStandards {
    fn default() -> Self {
        Self {
            id: DEFAULT_STANDARDS_ID.to_string(),
            name: "TCS defaults".to_string(),
            version: 1,
            panel_thickness: 0.75,
            back_panel_thickness: 0.25,
            face_frame_stile_width: 1.5,
            face_frame_rail_width: 1.5,
            reveal: 0.125,
            component_gap: 0.125,
            toe_kick_default: 4.5,
            toe_kick_recess: 3.0,
            stretcher_depth: 3.0,
            stretcher_thickness: 0.75,
            min_box_depth_margin: 0.5,
            sink_side_extension: 0.75,
            false_front_backing_overhang: 1.0,
            drawer_side_thickness: 0.5,
            face_frame_rail_gap_min: 0.75,
        }
    }
}

impl ConstructionStandards {
    /// Exterior depth minus box inside depth
    pub fn box_depth_margin(&self) -> f64 {
        self.back_panel_thickness + self.min_box_depth_margin
    }

    pub fn validate(&self) -> Result<(), CalcError> {
        let positive = [
            ("panel_thickness", self.panel_thickness),
            ("back_panel_thickness", self.back_panel_thickness),
            ("face_frame_stile_width", self.face_frame_stile_width),
            ("face_frame_rail_width", self.face_frame_rail_width),
            ("reveal", self.reveal),
            ("component_gap", self.component_gap),
            ("stretcher_depth", self.stretcher_depth),
            ("stretcher_thickness", self.stretcher_thickness),
            ("drawer_side_thickness", self.drawer_side_thickness),
            ("face_frame_rail_gap_min", self.face_frame_rail_gap_min),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid(
                    format!("standards.{}", field),
                    format!("must be greater than zero (got {})", value),
                ));
            }
        }

        let non_negative = [
            ("toe_kick_default", self.toe_kick_default),
            ("toe_kick_recess", self.toe_kick_recess),
            ("min_box_depth_margin", self.min_box_depth_margin),
            ("sink_side_extension", self.sink_side_extension),
            ("false_front_backing_overhang", self.false_front_backing_overhang),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid(
                    format!("standards.{}", field),
                    format!("must be zero or greater (got {})", value),
                ));
            }
        }

        if self.back_panel_thickness >= self.panel_thickness {
            return Err(CalcError::invalid(
                "standards.back_panel_thickness",
                "back panel must be thinner than the box panels",
            ));
        }

        // Drawer boxes inside cabinets take their deductions from this value
        SideDeductions::for_thickness(self.drawer_side_thickness).map_err(|e| match e {
            CalcError::InvalidArgument { message, .. } => {
                CalcError::invalid("standards.drawer_side_thickness", message)
            }
            other => other,
        })?;
        Ok(())
    }

    fn from_yaml(id: &str, contents: &str) -> Result<Self, CalcError> {
        let mut standards: ConstructionStandards = serde_yml::from_str(contents)
            .map_err(|e| CalcError::invalid(format!("standards.{}", id), e.to_string()))?;
        standards.id = id.to_string();
        standards.validate()?;
        Ok(standards)
    }
}

/// Lookup table of standards sets by id
#[derive(Debug, Clone)]
pub struct StandardsRegistry {
    templates: BTreeMap<String, ConstructionStandards>,
    default_id: String,
}

impl StandardsRegistry {
    /// Compiled-in default plus the embedded templates
    pub fn builtin() -> Result<Self, CalcError> {
        let mut templates = BTreeMap::new();
        templates.insert(
            DEFAULT_STANDARDS_ID.to_string(),
            ConstructionStandards::default(),
        );

        for file in BuiltinTemplates::iter() {
            let Some(id) = file.strip_suffix(".yaml") else {
                continue;
            };
            if let Some(embedded) = BuiltinTemplates::get(&file) {
                let contents = String::from_utf8_lossy(&embedded.data);
                let standards = ConstructionStandards::from_yaml(id, &contents)?;
                templates.insert(id.to_string(), standards);
            }
        }

        Ok(Self {
            templates,
            default_id: DEFAULT_STANDARDS_ID.to_string(),
        })
    }

    /// Add every `<id>.yaml` template found in a directory
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, CalcError> {
        if !dir.is_dir() {
            return Ok(0);
        }
        let mut loaded = 0;
        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let contents = std::fs::read_to_string(path)
                .map_err(|e| CalcError::Storage(format!("{}: {}", path.display(), e)))?;
            let standards = ConstructionStandards::from_yaml(id, &contents)?;
            self.templates.insert(id.to_string(), standards);
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Change which set `resolve(None)` returns
    pub fn set_default(&mut self, id: &str) -> Result<(), CalcError> {
        if !self.templates.contains_key(id) {
            return Err(CalcError::NotFound {
                kind: "construction standards",
                id: id.to_string(),
            });
        }
        self.default_id = id.to_string();
        Ok(())
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Explicit id must exist; no id falls back to the default set
    pub fn resolve(&self, id: Option<&str>) -> Result<&ConstructionStandards, CalcError> {
        let key = id.unwrap_or(&self.default_id);
        self.templates.get(key).ok_or_else(|| CalcError::NotFound {
            kind: "construction standards",
            id: key.to_string(),
        })
    }

    pub fn list(&self) -> impl Iterator<Item = &ConstructionStandards> {
        self.templates.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_values_valid() {
        let standards = ConstructionStandards::default();
        assert!(standards.validate().is_ok());
        assert_eq!(standards.box_depth_margin(), 0.75);
    }

    #[test]
    fn test_builtin_registry_has_templates() {
        let registry = StandardsRegistry::builtin().unwrap();
        let ids: Vec<&str> = registry.list().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&"default"));
        assert!(ids.contains(&"frameless"));
        assert!(ids.contains(&"inset"));
        assert_eq!(registry.resolve(Some("inset")).unwrap().face_frame_stile_width, 2.0);
    }

    #[test]
    fn test_resolve_without_id_uses_default() {
        let registry = StandardsRegistry::builtin().unwrap();
        let standards = registry.resolve(None).unwrap();
        assert_eq!(standards.id, "default");
        assert_eq!(standards.toe_kick_default, 4.5);
    }

    #[test]
    fn test_resolve_unknown_id_is_not_found() {
        let registry = StandardsRegistry::builtin().unwrap();
        let err = registry.resolve(Some("euro-32")).unwrap_err();
        assert!(matches!(err, CalcError::NotFound { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_thickness() {
        let standards = ConstructionStandards {
            panel_thickness: 0.0,
            ..Default::default()
        };
        let err = standards.validate().unwrap_err();
        assert_eq!(err.field(), Some("standards.panel_thickness"));
    }

    #[test]
    fn test_validate_rejects_thick_back() {
        let standards = ConstructionStandards {
            back_panel_thickness: 0.75,
            ..Default::default()
        };
        assert!(standards.validate().is_err());
    }

    #[test]
    fn test_load_dir_and_set_default() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("shop-b.yaml"),
            "name: Shop B\nface_frame_stile_width: 1.75\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = StandardsRegistry::builtin().unwrap();
        assert_eq!(registry.load_dir(tmp.path()).unwrap(), 1);
        registry.set_default("shop-b").unwrap();

        let standards = registry.resolve(None).unwrap();
        assert_eq!(standards.id, "shop-b");
        assert_eq!(standards.face_frame_stile_width, 1.75);
        // unspecified values keep the shop defaults
        assert_eq!(standards.panel_thickness, 0.75);
    }

    #[test]
    fn test_validate_rejects_unsupported_drawer_side() {
        let standards = ConstructionStandards {
            drawer_side_thickness: 0.75,
            ..Default::default()
        };
        let err = standards.validate().unwrap_err();
        assert_eq!(err.field(), Some("standards.drawer_side_thickness"));

        let five_eighths = ConstructionStandards {
            drawer_side_thickness: 0.625,
            ..Default::default()
        };
        assert!(five_eighths.validate().is_ok());
    }

    #[test]
    fn test_load_dir_rejects_unsupported_drawer_side() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("thick.yaml"), "drawer_side_thickness: 0.75\n").unwrap();
        let mut registry = StandardsRegistry::builtin().unwrap();
        let err = registry.load_dir(tmp.path()).unwrap_err();
        assert_eq!(err.field(), Some("standards.drawer_side_thickness"));
        assert!(matches!(registry.resolve(Some("thick")), Err(CalcError::NotFound { .. })));
    }

    #[test]
    fn test_load_dir_rejects_invalid_template() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("bad.yaml"), "reveal: -0.1\n").unwrap();
        let mut registry = StandardsRegistry::builtin().unwrap();
        assert!(registry.load_dir(tmp.path()).is_err());
    }
}

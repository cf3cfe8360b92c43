//! Cut-list pieces

use serde::{Deserialize, Serialize};

use crate::core::fraction::Measure;

/// Material hints used on generated pieces
pub mod material {
    pub const BOX_PLYWOOD: &str = "3/4\" Plywood";
    pub const BACK_PLYWOOD: &str = "1/4\" Plywood";
    pub const DRAWER_SIDE_PLYWOOD: &str = "1/2\" Plywood";
    pub const DRAWER_BOTTOM_PLYWOOD: &str = "1/4\" Plywood";
    pub const FACE_FRAME_HARDWOOD: &str = "3/4\" Hardwood";
}

/// A named piece to cut, with exact dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutListItem {
    pub name: String,
    pub width: Measure,
    pub height: Measure,
    pub thickness: Measure,
    pub quantity: u32,
    pub material_hint: String,
}

impl CutListItem {
    pub fn new(
        name: impl Into<String>,
        width: f64,
        height: f64,
        thickness: f64,
        quantity: u32,
        material_hint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            width: Measure::new(width),
            height: Measure::new(height),
            thickness: Measure::new(thickness),
            quantity,
            material_hint: material_hint.into(),
        }
    }

    /// Same piece under a prefixed name, e.g. "Drawer 2 Side"
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self {
            name: format!("{} {}", prefix, self.name),
            ..self.clone()
        }
    }

    /// Face area of all pieces in square feet
    pub fn area_sqft(&self) -> f64 {
        self.width.inches * self.height.inches * f64::from(self.quantity) / 144.0
    }
}

/// Total square feet of a cut list, optionally limited to one material
pub fn total_area_sqft(items: &[CutListItem], material_hint: Option<&str>) -> f64 {
    items
        .iter()
        .filter(|i| material_hint.map_or(true, |m| i.material_hint == m))
        .map(CutListItem::area_sqft)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_fractions() {
        let item = CutListItem::new("Side", 23.25, 29.25, 0.75, 2, material::BOX_PLYWOOD);
        assert_eq!(item.width.fraction, "23 1/4\"");
        assert_eq!(item.thickness.fraction, "3/4\"");
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_prefixed_keeps_dimensions() {
        let item = CutListItem::new("Side", 18.25, 5.0, 0.5, 2, material::DRAWER_SIDE_PLYWOOD);
        let named = item.prefixed("Drawer 1");
        assert_eq!(named.name, "Drawer 1 Side");
        assert_eq!(named.width, item.width);
    }

    #[test]
    fn test_total_area() {
        let items = vec![
            CutListItem::new("Side", 12.0, 12.0, 0.75, 2, material::BOX_PLYWOOD),
            CutListItem::new("Back", 12.0, 12.0, 0.25, 1, material::BACK_PLYWOOD),
        ];
        assert_eq!(total_area_sqft(&items, None), 3.0);
        assert_eq!(total_area_sqft(&items, Some(material::BOX_PLYWOOD)), 2.0);
    }
}

//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::project::Project;
use crate::engine::bom::UnitCosts;

/// Per-field unit-cost overrides; unset fields keep the built-in price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub cabinet_box_plywood: Option<f64>,
    pub back_panel_plywood: Option<f64>,
    pub drawer_slide_pair: Option<f64>,
    pub hinge: Option<f64>,
    pub edge_banding: Option<f64>,
}

impl PricingConfig {
    fn merge(&mut self, other: PricingConfig) {
        if other.cabinet_box_plywood.is_some() {
            self.cabinet_box_plywood = other.cabinet_box_plywood;
        }
        if other.back_panel_plywood.is_some() {
            self.back_panel_plywood = other.back_panel_plywood;
        }
        if other.drawer_slide_pair.is_some() {
            self.drawer_slide_pair = other.drawer_slide_pair;
        }
        if other.hinge.is_some() {
            self.hinge = other.hinge;
        }
        if other.edge_banding.is_some() {
            self.edge_banding = other.edge_banding;
        }
    }

    pub fn unit_costs(&self) -> UnitCosts {
        let defaults = UnitCosts::default();
        UnitCosts {
            cabinet_box_plywood: self.cabinet_box_plywood.unwrap_or(defaults.cabinet_box_plywood),
            back_panel_plywood: self.back_panel_plywood.unwrap_or(defaults.back_panel_plywood),
            drawer_slide_pair: self.drawer_slide_pair.unwrap_or(defaults.drawer_slide_pair),
            hinge: self.hinge.unwrap_or(defaults.hinge),
            edge_banding: self.edge_banding.unwrap_or(defaults.edge_banding),
        }
    }
}

/// cabkit configuration with layered hierarchy
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format
    pub default_format: Option<String>,

    /// Construction standards id used when a cabinet names none
    pub standards: Option<String>,

    pub pricing: PricingConfig,

    /// BOM database path, relative to the workspace root
    pub database: Option<PathBuf>,
}

impl Config {
    /// Load configuration for the workspace found from the current directory
    pub fn load() -> Self {
        Self::load_for(Project::discover().ok().as_ref())
    }

    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/cabkit/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Workspace config (.cabkit/config.yaml)
        if let Some(project) = project {
            if let Some(local) = Self::read_file(&Self::project_config_path(project)) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        if let Ok(format) = std::env::var("CABKIT_FORMAT") {
            config.default_format = Some(format);
        }
        if let Ok(standards) = std::env::var("CABKIT_STANDARDS") {
            config.standards = Some(standards);
        }
        if let Ok(db) = std::env::var("CABKIT_DB") {
            config.database = Some(PathBuf::from(db));
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cabkit")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn project_config_path(project: &Project) -> PathBuf {
        project.cabkit_dir().join("config.yaml")
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.standards.is_some() {
            self.standards = other.standards;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        self.pricing.merge(other.pricing);
    }

    pub fn unit_costs(&self) -> UnitCosts {
        self.pricing.unit_costs()
    }

    /// Database file for a workspace
    pub fn database_path(&self, project: &Project) -> PathBuf {
        match &self.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => project.root().join(path),
            None => project.cabkit_dir().join(crate::core::store::STORE_FILE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base: Config = serde_yml::from_str("standards: inset\npricing:\n  hinge: 4.25\n").unwrap();
        let local: Config =
            serde_yml::from_str("standards: frameless\npricing:\n  drawer_slide_pair: 40\n").unwrap();
        base.merge(local);

        assert_eq!(base.standards.as_deref(), Some("frameless"));
        let costs = base.unit_costs();
        assert_eq!(costs.hinge, 4.25);
        assert_eq!(costs.drawer_slide_pair, 40.0);
        assert_eq!(costs.cabinet_box_plywood, 3.50);
    }

    #[test]
    fn test_database_path_relative_to_root() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let config = Config::default();
        assert!(config.database_path(&project).ends_with(".cabkit/shop.db"));

        let config = Config {
            database: Some(PathBuf::from("data/bom.db")),
            ..Default::default()
        };
        assert_eq!(config.database_path(&project), project.root().join("data/bom.db"));
    }

    #[test]
    fn test_workspace_config_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(
            Config::project_config_path(&project),
            "default_format: json\npricing:\n  edge_banding: 0.75\n",
        )
        .unwrap();

        let config = Config::load_for(Some(&project));
        assert_eq!(config.unit_costs().edge_banding, 0.75);
    }
}

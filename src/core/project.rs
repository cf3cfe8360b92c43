//! Workspace discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::EntityId;

/// Marker directory at the workspace root
pub const WORKSPACE_DIR: &str = ".cabkit";

/// Extension of project tree files under `projects/`
pub const PROJECT_FILE_SUFFIX: &str = ".cab.yaml";

/// A cabkit workspace
#[derive(Debug)]
pub struct Project {
    /// Root directory of the workspace (parent of .cabkit/)
    root: PathBuf,
}

impl Project {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// `--project` if given, otherwise discover from the current directory
    pub fn locate(explicit: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(WORKSPACE_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::create_structure(root)
    }

    /// Initialize even if .cabkit/ exists; the BOM store is left untouched
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let workspace = root.join(WORKSPACE_DIR);
        for dir in [workspace.join("standards"), root.join("projects")] {
            std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        std::fs::write(workspace.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# cabkit workspace configuration

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Construction standards used when a cabinet names none
# standards: default

# Unit costs used by `cabkit bom generate` (US dollars)
# pricing:
#   cabinet_box_plywood: 3.50   # per sq ft
#   back_panel_plywood: 1.50    # per sq ft
#   drawer_slide_pair: 35.00
#   hinge: 5.00
#   edge_banding: 0.50          # per linear ft

# BOM database location (default: .cabkit/shop.db)
# database: .cabkit/shop.db
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The .cabkit configuration directory
    pub fn cabkit_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Workspace construction-standards templates
    pub fn standards_dir(&self) -> PathBuf {
        self.cabkit_dir().join("standards")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// File holding a project tree
    pub fn project_path(&self, id: &EntityId) -> PathBuf {
        self.projects_dir()
            .join(format!("{}{}", id, PROJECT_FILE_SUFFIX))
    }

    /// Every project tree file in the workspace
    pub fn iter_project_files(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.projects_dir())
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(PROJECT_FILE_SUFFIX))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a cabkit workspace (searched from {searched_from:?}). Run 'cabkit init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("cabkit workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.cabkit_dir().join("config.yaml").exists());
        assert!(project.standards_dir().is_dir());
        assert!(project.projects_dir().is_dir());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
        assert!(Project::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("projects/archive/2024");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_discover_fails_without_workspace() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_project_files() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = EntityId::new(EntityPrefix::Prj);
        let path = project.project_path(&id);
        assert!(path.to_string_lossy().ends_with(".cab.yaml"));

        std::fs::write(&path, "id: x\n").unwrap();
        std::fs::write(project.projects_dir().join("notes.md"), "").unwrap();
        let files: Vec<PathBuf> = project.iter_project_files().collect();
        assert_eq!(files, vec![path]);
    }
}

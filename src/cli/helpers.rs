//! Shared helper functions for CLI commands

use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

use crate::cli::args::GlobalOpts;
use crate::core::config::Config;
use crate::core::error::CalcError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::engine::{CabinetDimensionCalculator, DrawerConfigurator, StandardsRegistry};

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Read a request body from a file, or stdin when the path is `-`
///
/// JSON and YAML are both accepted.
pub fn read_input<T: DeserializeOwned>(path: &Path) -> Result<T, CalcError> {
    let (source, contents) = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CalcError::Storage(format!("stdin: {}", e)))?;
        ("stdin".to_string(), buf)
    } else {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CalcError::NotFound {
                    kind: "input file",
                    id: path.display().to_string(),
                }
            } else {
                CalcError::Storage(format!("{}: {}", path.display(), e))
            }
        })?;
        (path.display().to_string(), contents)
    };

    parse_body(&contents).map_err(|message| CalcError::invalid(source, message))
}

fn parse_body<T: DeserializeOwned>(contents: &str) -> Result<T, String> {
    if contents.trim_start().starts_with('{') {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_yml::from_str(contents).map_err(|e| e.to_string())
    }
}

/// Parse an id argument of a known type
pub fn parse_id(field: &str, value: &str, prefix: EntityPrefix) -> Result<EntityId, CalcError> {
    EntityId::parse_with(value, prefix).map_err(|e| CalcError::invalid(field, e.to_string()))
}

/// Workspace for commands that need one
pub fn require_project(global: &GlobalOpts) -> miette::Result<Project> {
    Project::locate(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// Workspace if there is one; calculations also run outside a workspace
pub fn optional_project(global: &GlobalOpts) -> Option<Project> {
    Project::locate(global.project.as_deref()).ok()
}

/// Built-in standards plus workspace templates, with the configured default
pub fn load_registry(project: Option<&Project>, config: &Config) -> Result<StandardsRegistry, CalcError> {
    let mut registry = StandardsRegistry::builtin()?;
    if let Some(project) = project {
        let loaded = registry.load_dir(&project.standards_dir())?;
        if loaded > 0 {
            tracing::debug!(count = loaded, "loaded workspace standards");
        }
    }
    if let Some(id) = &config.standards {
        registry.set_default(id)?;
    }
    Ok(registry)
}

pub fn build_calculator(
    project: Option<&Project>,
    config: &Config,
) -> Result<CabinetDimensionCalculator, CalcError> {
    Ok(CabinetDimensionCalculator::new(
        load_registry(project, config)?,
        DrawerConfigurator::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::cabinet::DrawerOpening;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Bom);
        let formatted = format_short_id(&id);
        assert!(formatted.len() <= 16);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_parse_body_json_and_yaml() {
        let json: DrawerOpening =
            parse_body(r#"{"width": 18, "height": 6, "depth": 21}"#).unwrap();
        let yaml: DrawerOpening = parse_body("width: 18\nheight: 6\ndepth: 21\n").unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input::<DrawerOpening>(Path::new("/nonexistent/opening.yaml")).unwrap_err();
        assert!(matches!(err, CalcError::NotFound { kind: "input file", .. }));
    }

    #[test]
    fn test_parse_id_checks_prefix() {
        let cab = EntityId::new(EntityPrefix::Cab).to_string();
        assert!(parse_id("project_id", &cab, EntityPrefix::Prj).is_err());
        assert!(parse_id("cabinet_id", &cab, EntityPrefix::Cab).is_ok());
    }
}

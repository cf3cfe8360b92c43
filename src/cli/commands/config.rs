//! `cabkit config` command - Configuration management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::{optional_project, require_project};
use crate::cli::output::{print_document, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., standards, pricing.hinge)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("default_format", "Default output format (yaml, json, tsv, csv, md)"),
    ("standards", "Construction standards used when a cabinet names none"),
    ("database", "BOM database path, relative to the workspace root"),
    ("pricing.cabinet_box_plywood", "3/4\" box plywood, $ per sq ft"),
    ("pricing.back_panel_plywood", "1/4\" back plywood, $ per sq ft"),
    ("pricing.drawer_slide_pair", "Drawer slides, $ per pair"),
    ("pricing.hinge", "Concealed hinge, $ each"),
    ("pricing.edge_banding", "Edge banding, $ per linear ft"),
];

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = optional_project(global);
    let config = Config::load_for(project.as_ref());

    if let Some(key) = &args.key {
        let value = get_config_value(&config, key)
            .ok_or_else(|| miette::miette!("Key '{}' is not set", key))?;
        println!("{}", value);
        return Ok(());
    }

    let format = resolve_format(global, &config, OutputFormat::Auto);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        return print_document(&config, format);
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        print_config_value(key, get_config_value(&config, key).as_deref());
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (CABKIT_FORMAT, CABKIT_STANDARDS, CABKIT_DB)");
    println!("  2. Workspace config (.cabkit/config.yaml)");
    println!("  3. Global config (~/.config/cabkit/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    if !VALID_KEYS.iter().any(|(k, _)| *k == args.key) {
        return Err(miette::miette!(
            "Unknown key '{}'. Run 'cabkit config keys' to list valid keys.",
            args.key
        ));
    }

    let value = if args.key.starts_with("pricing.") {
        let price: f64 = args
            .value
            .parse()
            .map_err(|_| miette::miette!("'{}' is not a price", args.value))?;
        if !price.is_finite() || price < 0.0 {
            return Err(miette::miette!("price must be zero or greater"));
        }
        serde_yml::Value::from(price)
    } else {
        serde_yml::Value::String(args.value.clone())
    };

    let config_path = if args.global {
        global_config_path()?
    } else {
        Config::project_config_path(&require_project(global)?)
    };

    let mut config_map: serde_yml::Value = if config_path.exists() {
        let content = fs::read_to_string(&config_path).into_diagnostic()?;
        serde_yml::from_str(&content).into_diagnostic()?
    } else {
        serde_yml::Value::Null
    };
    if !config_map.is_mapping() {
        config_map = serde_yml::Value::Mapping(Default::default());
    }

    set_nested_value(&mut config_map, &args.key, value);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    if !global.quiet {
        let scope = if args.global { "global" } else { "workspace" };
        println!(
            "{} Set {} {} {} in {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            style("→").dim(),
            style(&args.value).yellow(),
            scope
        );
    }

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let global_path = global_config_path()?;

    println!("{}", style("Configuration file paths:").bold());
    println!();
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    if global_path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }

    println!();
    match optional_project(global) {
        Some(project) => {
            let path = Config::project_config_path(&project);
            println!("  {} {}", style("Workspace:").cyan(), path.display());
            if path.exists() {
                println!("            {}", style("(exists)").green());
            } else {
                println!("            {}", style("(not created)").dim());
            }
        }
        None => {
            println!(
                "  {} {}",
                style("Workspace:").cyan(),
                style("(not in a cabkit workspace)").dim()
            );
        }
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<30} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'cabkit config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    let pricing = &config.pricing;
    let price = |v: Option<f64>| v.map(|p| format!("{:.2}", p));
    match key {
        "default_format" => config.default_format.clone(),
        "standards" => config.standards.clone(),
        "database" => config.database.as_ref().map(|p| p.display().to_string()),
        "pricing.cabinet_box_plywood" => price(pricing.cabinet_box_plywood),
        "pricing.back_panel_plywood" => price(pricing.back_panel_plywood),
        "pricing.drawer_slide_pair" => price(pricing.drawer_slide_pair),
        "pricing.hinge" => price(pricing.hinge),
        "pricing.edge_banding" => price(pricing.edge_banding),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

/// Set `a.b.c` style keys, creating intermediate mappings
fn set_nested_value(root: &mut serde_yml::Value, key: &str, value: serde_yml::Value) {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(last) = parts.pop() else {
        return;
    };

    let mut current = root;
    for part in parts {
        let serde_yml::Value::Mapping(map) = current else {
            return;
        };
        let key = serde_yml::Value::String(part.to_string());
        if !map.contains_key(&key) {
            map.insert(key.clone(), serde_yml::Value::Mapping(Default::default()));
        }
        let Some(entry) = map.get_mut(&key) else {
            return;
        };
        if !entry.is_mapping() {
            *entry = serde_yml::Value::Mapping(Default::default());
        }
        current = entry;
    }

    if let serde_yml::Value::Mapping(map) = current {
        map.insert(serde_yml::Value::String(last.to_string()), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_nested_value_creates_parents() {
        let mut root = serde_yml::Value::Mapping(Default::default());
        set_nested_value(&mut root, "pricing.hinge", serde_yml::Value::from(4.5));
        set_nested_value(&mut root, "standards", serde_yml::Value::from("inset"));

        let config: Config = serde_yml::from_value(root).unwrap();
        assert_eq!(config.pricing.hinge, Some(4.5));
        assert_eq!(config.standards.as_deref(), Some("inset"));
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = Config::default();
        for (key, _) in VALID_KEYS {
            assert!(get_config_value(&config, key).is_none());
        }
    }
}

//! `cabkit standards` command - Construction standards templates

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{load_registry, optional_project};
use crate::cli::output::{fail, print_document, resolve_format, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum StandardsCommands {
    /// List available templates
    List,

    /// Show one template (default: the configured default)
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Template id
    pub id: Option<String>,
}

pub fn run(cmd: StandardsCommands, global: &GlobalOpts) -> Result<()> {
    let project = optional_project(global);
    let config = Config::load_for(project.as_ref());
    let registry = load_registry(project.as_ref(), &config).map_err(|e| fail(global, e))?;

    match cmd {
        StandardsCommands::List => {
            let all: Vec<_> = registry.list().collect();

            match resolve_format(global, &config, OutputFormat::Tsv) {
                f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&all, f),
                OutputFormat::Id => {
                    for standards in &all {
                        println!("{}", standards.id);
                    }
                    Ok(())
                }
                f => {
                    let mut table = Table::new(&["id", "name", "version", "stile", "rail", "panel", "default"]);
                    for standards in &all {
                        table.push(vec![
                            standards.id.clone(),
                            standards.name.clone(),
                            standards.version.to_string(),
                            format!("{}", standards.face_frame_stile_width),
                            format!("{}", standards.face_frame_rail_width),
                            format!("{}", standards.panel_thickness),
                            if standards.id == registry.default_id() { "*" } else { "" }.to_string(),
                        ]);
                    }
                    table.print(f)
                }
            }
        }
        StandardsCommands::Show(args) => {
            let standards = registry
                .resolve(args.id.as_deref())
                .map_err(|e| fail(global, e))?;
            let format = resolve_format(global, &config, OutputFormat::Yaml);
            print_document(standards, format)
        }
    }
}

//! `cabkit project` command - Project tree files

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{parse_id, require_project, truncate_str};
use crate::cli::output::{fail, print_document, resolve_format, success, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::error::CalcError;
use crate::core::identity::EntityPrefix;
use crate::core::Config;
use crate::entities::project::ProjectTree;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create an empty project tree file
    New(NewArgs),

    /// List project trees in the workspace
    List,

    /// Show a project tree
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project ID (PRJ-...)
    pub id: String,
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    let project = require_project(global)?;
    let config = Config::load_for(Some(&project));

    match cmd {
        ProjectCommands::New(args) => {
            let tree = ProjectTree::new(args.name);
            let path = project.project_path(&tree.id);
            tree.save(&path).map_err(|e| fail(global, e))?;
            tracing::info!(project = %tree.id, path = %path.display(), "project created");

            if resolve_format(global, &config, OutputFormat::Auto) == OutputFormat::Id {
                println!("{}", tree.id);
            } else {
                success(
                    global,
                    format!(
                        "Created project {} at {}",
                        style(&tree.id).cyan(),
                        style(path.display()).dim()
                    ),
                );
            }
            Ok(())
        }
        ProjectCommands::List => {
            let trees = project
                .iter_project_files()
                .map(|path| ProjectTree::load(&path))
                .collect::<Result<Vec<_>, CalcError>>()
                .map_err(|e| fail(global, e))?;

            match resolve_format(global, &config, OutputFormat::Tsv) {
                f @ (OutputFormat::Json | OutputFormat::Yaml) => {
                    let summaries: Vec<ProjectSummary> = trees.iter().map(ProjectSummary::from).collect();
                    print_document(&summaries, f)
                }
                OutputFormat::Id => {
                    for tree in &trees {
                        println!("{}", tree.id);
                    }
                    Ok(())
                }
                f => {
                    if trees.is_empty() {
                        println!("No projects found.");
                        return Ok(());
                    }
                    let mut table = Table::new(&["id", "name", "rooms", "cabinets", "created"]);
                    for tree in &trees {
                        table.push(vec![
                            tree.id.to_string(),
                            truncate_str(&tree.name, 30),
                            tree.rooms.len().to_string(),
                            tree.cabinets().len().to_string(),
                            tree.created.format("%Y-%m-%d").to_string(),
                        ]);
                    }
                    table.print(f)
                }
            }
        }
        ProjectCommands::Show(args) => {
            let tree = parse_id("id", &args.id, EntityPrefix::Prj)
                .and_then(|id| {
                    let path = project.project_path(&id);
                    if !path.exists() {
                        return Err(CalcError::NotFound {
                            kind: "project",
                            id: id.to_string(),
                        });
                    }
                    ProjectTree::load(&path)
                })
                .map_err(|e| fail(global, e))?;

            let format = resolve_format(global, &config, OutputFormat::Yaml);
            print_document(&tree, format)
        }
    }
}

#[derive(serde::Serialize)]
struct ProjectSummary {
    id: String,
    name: String,
    rooms: usize,
    cabinets: usize,
}

impl From<&ProjectTree> for ProjectSummary {
    fn from(tree: &ProjectTree) -> Self {
        Self {
            id: tree.id.to_string(),
            name: tree.name.clone(),
            rooms: tree.rooms.len(),
            cabinets: tree.cabinets().len(),
        }
    }
}

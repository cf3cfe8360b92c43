//! `cabkit bom` command - Project bill of materials

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{build_calculator, format_short_id, parse_id, require_project, truncate_str};
use crate::cli::output::{fail, print_document, resolve_format, success, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::error::CalcError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::core::store::{BomStore, GenerationSummary};
use crate::core::Config;
use crate::engine::bom::project_fingerprint;
use crate::engine::BomGenerator;
use crate::entities::bom::{BomLineItem, BomStatus};
use crate::entities::project::ProjectTree;

#[derive(Subcommand, Debug)]
pub enum BomCommands {
    /// Generate and store the bill of materials for a project
    Generate(GenerateArgs),

    /// Show a project's bill of materials with totals
    ByProject(ProjectArgs),

    /// Show the lines one cabinet contributed to
    ByCabinet(CabinetArgs),

    /// Set the status of many lines at once
    BulkStatus(BulkStatusArgs),

    /// Advance a single line to a later status
    SetStatus(SetStatusArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Project ID (PRJ-...)
    pub project_id: String,

    /// Replace an existing bill of materials
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(clap::Args, Debug)]
pub struct ProjectArgs {
    /// Project ID (PRJ-...)
    pub project_id: String,
}

#[derive(clap::Args, Debug)]
pub struct CabinetArgs {
    /// Cabinet ID (CAB-...)
    pub cabinet_id: String,
}

#[derive(clap::Args, Debug)]
pub struct BulkStatusArgs {
    /// New status (pending, ordered, received, issued)
    #[arg(long, short = 's')]
    pub status: BomStatus,

    /// BOM line IDs (BOM-...)
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetStatusArgs {
    /// BOM line ID (BOM-...)
    pub id: String,

    /// New status (pending, ordered, received, issued)
    pub status: BomStatus,
}

pub fn run(cmd: BomCommands, global: &GlobalOpts) -> Result<()> {
    let project = require_project(global)?;
    let config = Config::load_for(Some(&project));

    match cmd {
        BomCommands::Generate(args) => run_generate(args, &project, &config, global),
        BomCommands::ByProject(args) => run_by_project(args, &project, &config, global),
        BomCommands::ByCabinet(args) => run_by_cabinet(args, &project, &config, global),
        BomCommands::BulkStatus(args) => run_bulk_status(args, &project, &config, global),
        BomCommands::SetStatus(args) => run_set_status(args, &project, &config, global),
    }
}

fn open_store(project: &Project, config: &Config) -> Result<BomStore, CalcError> {
    let path = config.database_path(project);
    tracing::debug!(path = %path.display(), "opening BOM store");
    BomStore::open_at(&path)
}

fn load_tree(project: &Project, id: &EntityId) -> Result<ProjectTree, CalcError> {
    let path = project.project_path(id);
    if !path.exists() {
        return Err(CalcError::NotFound {
            kind: "project",
            id: id.to_string(),
        });
    }
    let tree = ProjectTree::load(&path)?;
    if &tree.id != id {
        return Err(CalcError::invalid(
            "id",
            format!("{} declares id {}", path.display(), tree.id),
        ));
    }
    Ok(tree)
}

/// Size every cabinet, consolidate, and replace the stored generation
fn generate_bom(
    args: &GenerateArgs,
    project: &Project,
    config: &Config,
) -> Result<GenerationSummary, CalcError> {
    let project_id = parse_id("project_id", &args.project_id, EntityPrefix::Prj)?;
    let tree = load_tree(project, &project_id)?;

    // An existing generation is refused before any cabinet geometry runs
    let mut store = open_store(project, config)?;
    if !args.overwrite && store.has_generation(&project_id)? {
        return Err(CalcError::Conflict(format!(
            "project {} already has a bill of materials; pass --overwrite to replace it",
            project_id
        )));
    }

    let calculator = build_calculator(Some(project), config)?;
    let generator = BomGenerator::new(config.unit_costs(), calculator);
    let lines = generator.generate(&tree)?;
    let fingerprint = project_fingerprint(&tree)?;

    store.generate(&project_id, &lines, &fingerprint, args.overwrite)
}

fn run_generate(args: GenerateArgs, project: &Project, config: &Config, global: &GlobalOpts) -> Result<()> {
    let summary = generate_bom(&args, project, config).map_err(|e| fail(global, e))?;

    match resolve_format(global, config, OutputFormat::Auto) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&summary, f),
        OutputFormat::Id => {
            println!("{}", summary.project_id);
            Ok(())
        }
        _ => {
            success(
                global,
                format!(
                    "Generated {} BOM line(s) for {} (generation {}, total ${:.2})",
                    style(summary.line_count).cyan(),
                    style(&summary.project_id).cyan(),
                    summary.generation,
                    summary.total_cost
                ),
            );
            Ok(())
        }
    }
}

fn run_by_project(args: ProjectArgs, project: &Project, config: &Config, global: &GlobalOpts) -> Result<()> {
    let bom = parse_id("project_id", &args.project_id, EntityPrefix::Prj)
        .and_then(|id| open_store(project, config)?.by_project(&id))
        .map_err(|e| fail(global, e))?;

    match resolve_format(global, config, OutputFormat::Tsv) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&bom, f),
        OutputFormat::Id => {
            print_ids(&bom.items);
            Ok(())
        }
        f => {
            lines_table(&bom.items, f).print(f)?;
            if f == OutputFormat::Csv || global.quiet {
                return Ok(());
            }

            println!();
            let mut totals = Table::new(&["group", "lines", "total"]);
            for group in bom.by_material_type.iter().chain(bom.by_status.iter()) {
                totals.push(vec![
                    group.key.clone(),
                    group.count.to_string(),
                    format!("{:.2}", group.total_cost),
                ]);
            }
            totals.print(f)?;
            println!();
            println!(
                "{} line(s), total {} (generation {})",
                style(bom.items.len()).cyan(),
                style(format!("${:.2}", bom.total_cost)).green(),
                bom.generation.generation
            );
            Ok(())
        }
    }
}

fn run_by_cabinet(args: CabinetArgs, project: &Project, config: &Config, global: &GlobalOpts) -> Result<()> {
    let bom = parse_id("cabinet_id", &args.cabinet_id, EntityPrefix::Cab)
        .and_then(|id| open_store(project, config)?.by_cabinet(&id))
        .map_err(|e| fail(global, e))?;

    match resolve_format(global, config, OutputFormat::Tsv) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&bom, f),
        OutputFormat::Id => {
            print_ids(&bom.items);
            Ok(())
        }
        f => {
            lines_table(&bom.items, f).print(f)?;
            if f != OutputFormat::Csv && !global.quiet {
                println!();
                println!(
                    "{} line(s), total {}",
                    style(bom.items.len()).cyan(),
                    style(format!("${:.2}", bom.total_cost)).green()
                );
            }
            Ok(())
        }
    }
}

fn run_bulk_status(args: BulkStatusArgs, project: &Project, config: &Config, global: &GlobalOpts) -> Result<()> {
    let summary = args
        .ids
        .iter()
        .map(|s| parse_id("ids", s, EntityPrefix::Bom))
        .collect::<Result<Vec<_>, _>>()
        .and_then(|ids| open_store(project, config)?.bulk_update_status(&ids, args.status))
        .map_err(|e| fail(global, e))?;

    match resolve_format(global, config, OutputFormat::Auto) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&summary, f),
        _ => {
            success(
                global,
                format!(
                    "Updated {} of {} line(s) to {}",
                    style(summary.updated).cyan(),
                    summary.requested,
                    style(args.status).yellow()
                ),
            );
            if summary.regressions > 0 && !global.quiet {
                println!(
                    "{} {} line(s) moved back to an earlier status",
                    style("!").yellow(),
                    summary.regressions
                );
            }
            Ok(())
        }
    }
}

fn run_set_status(args: SetStatusArgs, project: &Project, config: &Config, global: &GlobalOpts) -> Result<()> {
    let line = parse_id("id", &args.id, EntityPrefix::Bom)
        .and_then(|id| open_store(project, config)?.set_status(&id, args.status))
        .map_err(|e| fail(global, e))?;

    match resolve_format(global, config, OutputFormat::Auto) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&line, f),
        _ => {
            success(
                global,
                format!(
                    "{} {} is now {}",
                    style(&line.id).cyan(),
                    line.name,
                    style(line.status).yellow()
                ),
            );
            Ok(())
        }
    }
}

fn lines_table(items: &[BomLineItem], format: OutputFormat) -> Table {
    let mut table = Table::new(&[
        "id", "name", "type", "qty", "uom", "unit_cost", "total", "status", "cabinets",
    ]);
    // Machine formats keep full ids and names
    let full = format == OutputFormat::Csv;
    for item in items {
        let cabinets = match (&item.cabinet_id, full) {
            (Some(id), true) => id.to_string(),
            (Some(id), false) => format_short_id(id),
            (None, _) => format!("{} merged", item.source_cabinet_ids.len()),
        };
        table.push(vec![
            if full { item.id.to_string() } else { format_short_id(&item.id) },
            if full { item.name.clone() } else { truncate_str(&item.name, 32) },
            item.material_type.to_string(),
            format!("{}", item.quantity),
            item.uom.to_string(),
            format!("{:.2}", item.unit_cost),
            format!("{:.2}", item.total_cost),
            item.status.to_string(),
            cabinets,
        ]);
    }
    table
}

fn print_ids(items: &[BomLineItem]) {
    for item in items {
        println!("{}", item.id);
    }
}

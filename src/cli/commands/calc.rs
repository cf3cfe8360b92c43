//! `cabkit calc` command - Cabinet, drawer and depth calculations
//!
//! Request bodies are read from a file or stdin (`-`) as JSON or YAML.
//! Results print as YAML by default; table formats show the cut list.

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{build_calculator, optional_project, read_input};
use crate::cli::output::{cut_list_table, fail, print_document, resolve_format, Table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::fraction::Measure;
use crate::core::Config;
use crate::engine::drawer::{
    depth_sufficiency, max_slide_for, min_cabinet_depths, reference_specs, required_depth_for,
    DrawerBoxResult, QuickQuote,
};
use crate::engine::stretcher::StretcherPlan;
use crate::engine::{QuickQuoteRequest, StackRequest};
use crate::entities::cabinet::{CabinetInput, DrawerOpening, FaceFrameStyle, SlideLength};

#[derive(Subcommand, Debug)]
pub enum CalcCommands {
    /// Size a cabinet from its exterior dimensions
    Cabinet(InputArgs),

    /// Stretcher plan for a cabinet exterior
    Stretcher(InputArgs),

    /// Face-frame styles and the default
    FaceFrameStyles,

    /// Size one drawer box for an opening
    Drawer(InputArgs),

    /// Split an opening into a stack of drawer boxes
    DrawerStack(InputArgs),

    /// Check whether a cabinet is deep enough for a slide
    Depth(DepthArgs),

    /// Minimum cabinet depth for every slide length
    MinDepths,

    /// Slide hardware reference dimensions
    BlumSpecs,

    /// Drawer boxes plus a hardware price rollup
    QuickQuote(InputArgs),

    /// Longest slide that fits a cabinet depth
    MaxSlide(MaxSlideArgs),

    /// Cabinet depth needed for a slide length
    RequiredDepth(RequiredDepthArgs),
}

#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Request file (JSON or YAML), or - for stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct DepthArgs {
    /// Exterior cabinet depth in inches
    #[arg(long)]
    pub depth: f64,

    /// Slide length (9, 12, 15, 18 or 21)
    #[arg(long)]
    pub slide: SlideLength,
}

#[derive(clap::Args, Debug)]
pub struct MaxSlideArgs {
    /// Exterior cabinet depth in inches
    #[arg(long)]
    pub depth: f64,
}

#[derive(clap::Args, Debug)]
pub struct RequiredDepthArgs {
    /// Slide length (9, 12, 15, 18 or 21)
    #[arg(long)]
    pub slide: SlideLength,
}

pub fn run(cmd: CalcCommands, global: &GlobalOpts) -> Result<()> {
    let project = optional_project(global);
    let config = Config::load_for(project.as_ref());

    match cmd {
        CalcCommands::Cabinet(args) => {
            let input: CabinetInput = read_input(&args.input).map_err(|e| fail(global, e))?;
            let calculator =
                build_calculator(project.as_ref(), &config).map_err(|e| fail(global, e))?;
            let result = calculator
                .calculate_from_exterior(&input)
                .map_err(|e| fail(global, e))?;

            tracing::debug!(
                cabinet_type = %input.cabinet_type,
                pieces = result.cut_list.len(),
                valid = result.validation.is_valid,
                "cabinet calculated"
            );

            match resolve_format(global, &config, OutputFormat::Yaml) {
                f @ (OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md) => {
                    cut_list_table(&result.cut_list).print(f)?;
                    print_warnings(global, &result.validation.warnings);
                    Ok(())
                }
                f => print_document(&result, f),
            }
        }
        CalcCommands::Stretcher(args) => {
            let input: CabinetInput = read_input(&args.input).map_err(|e| fail(global, e))?;
            let calculator =
                build_calculator(project.as_ref(), &config).map_err(|e| fail(global, e))?;
            let plan = calculator.stretchers_for(&input).map_err(|e| fail(global, e))?;

            tracing::debug!(
                stretchers = plan.stretchers.len(),
                conflicts = plan.conflicts.len(),
                "stretcher plan calculated"
            );

            match resolve_format(global, &config, OutputFormat::Yaml) {
                f @ (OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md) => {
                    stretcher_table(&plan).print(f)?;
                    print_warnings(global, &plan.warnings);
                    Ok(())
                }
                f => print_document(&plan, f),
            }
        }
        CalcCommands::FaceFrameStyles => {
            let list = FaceFrameStyleList {
                styles: FaceFrameStyle::all()
                    .iter()
                    .map(|style| StyleOption {
                        style: *style,
                        description: style.description(),
                    })
                    .collect(),
                default: FaceFrameStyle::default(),
            };

            match resolve_format(global, &config, OutputFormat::Tsv) {
                f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&list, f),
                f => {
                    let mut table = Table::new(&["style", "description", "default"]);
                    for option in &list.styles {
                        let marker = if option.style == list.default { "*" } else { "" };
                        table.push(vec![
                            option.style.to_string(),
                            option.description.to_string(),
                            marker.to_string(),
                        ]);
                    }
                    table.print(f)
                }
            }
        }
        CalcCommands::Drawer(args) => {
            let opening: DrawerOpening = read_input(&args.input).map_err(|e| fail(global, e))?;
            let calculator =
                build_calculator(project.as_ref(), &config).map_err(|e| fail(global, e))?;
            let result = calculator
                .drawers()
                .compute_box(&opening)
                .map_err(|e| fail(global, e))?;

            match resolve_format(global, &config, OutputFormat::Yaml) {
                f @ (OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md) => {
                    cut_list_table(&result.cut_list).print(f)?;
                    print_warnings(global, &result.issues);
                    Ok(())
                }
                f => print_document(&result, f),
            }
        }
        CalcCommands::DrawerStack(args) => {
            let request: StackRequest = read_input(&args.input).map_err(|e| fail(global, e))?;
            let calculator =
                build_calculator(project.as_ref(), &config).map_err(|e| fail(global, e))?;
            let boxes = calculator
                .drawers()
                .compute_stack(&request)
                .map_err(|e| fail(global, e))?;

            match resolve_format(global, &config, OutputFormat::Yaml) {
                f @ (OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md) => {
                    stack_table(&boxes).print(f)
                }
                f => print_document(&boxes, f),
            }
        }
        CalcCommands::Depth(args) => {
            let check = depth_sufficiency(args.depth, args.slide).map_err(|e| fail(global, e))?;

            match resolve_format(global, &config, OutputFormat::Tsv) {
                f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&check, f),
                _ => {
                    let mark = if check.is_sufficient {
                        style("✓").green()
                    } else {
                        style("✗").red()
                    };
                    println!("{} {}", mark, check.recommendation);
                    Ok(())
                }
            }
        }
        CalcCommands::MinDepths => {
            let rows = min_cabinet_depths();

            match resolve_format(global, &config, OutputFormat::Tsv) {
                f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&rows, f),
                f => {
                    let mut table = Table::new(&["slide", "blum_minimum", "shop_minimum"]);
                    for row in &rows {
                        table.push(vec![
                            row.slide_length.to_string(),
                            row.blum_minimum.fraction.clone(),
                            row.shop_minimum.fraction.clone(),
                        ]);
                    }
                    table.print(f)
                }
            }
        }
        CalcCommands::BlumSpecs => {
            let format = resolve_format(global, &config, OutputFormat::Yaml);
            print_document(&reference_specs(), format)
        }
        CalcCommands::QuickQuote(args) => {
            let request: QuickQuoteRequest =
                read_input(&args.input).map_err(|e| fail(global, e))?;
            let calculator =
                build_calculator(project.as_ref(), &config).map_err(|e| fail(global, e))?;
            let quote = calculator
                .drawers()
                .quick_quote(&request)
                .map_err(|e| fail(global, e))?;

            match resolve_format(global, &config, OutputFormat::Yaml) {
                f @ (OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md) => {
                    quote_table(&quote).print(f)
                }
                f => print_document(&quote, f),
            }
        }
        CalcCommands::MaxSlide(args) => {
            if !args.depth.is_finite() || args.depth <= 0.0 {
                return Err(fail(
                    global,
                    crate::core::error::CalcError::invalid("depth", "must be greater than zero"),
                ));
            }
            let answer = MaxSlide {
                depth: Measure::new(args.depth),
                max_slide: max_slide_for(args.depth),
            };

            match resolve_format(global, &config, OutputFormat::Tsv) {
                f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&answer, f),
                _ => {
                    match answer.max_slide {
                        Some(length) => println!("{}", length),
                        None => println!(
                            "{} no standard slide fits {}",
                            style("✗").red(),
                            answer.depth
                        ),
                    }
                    Ok(())
                }
            }
        }
        CalcCommands::RequiredDepth(args) => {
            let answer = RequiredDepth {
                slide_length: args.slide,
                required_depth: Measure::new(required_depth_for(args.slide)),
            };

            match resolve_format(global, &config, OutputFormat::Tsv) {
                f @ (OutputFormat::Json | OutputFormat::Yaml) => print_document(&answer, f),
                _ => {
                    println!("{}", answer.required_depth);
                    Ok(())
                }
            }
        }
    }
}

#[derive(Serialize)]
struct StyleOption {
    style: FaceFrameStyle,
    description: &'static str,
}

#[derive(Serialize)]
struct FaceFrameStyleList {
    styles: Vec<StyleOption>,
    default: FaceFrameStyle,
}

#[derive(Serialize)]
struct MaxSlide {
    depth: Measure,
    max_slide: Option<SlideLength>,
}

#[derive(Serialize)]
struct RequiredDepth {
    slide_length: SlideLength,
    required_depth: Measure,
}

fn stretcher_table(plan: &StretcherPlan) -> Table {
    let mut table = Table::new(&["name", "location", "position", "width", "height", "depth"]);
    for s in &plan.stretchers {
        table.push(vec![
            s.name.clone(),
            s.location.to_string(),
            s.position.fraction.clone(),
            s.width.fraction.clone(),
            s.height.fraction.clone(),
            s.depth.fraction.clone(),
        ]);
    }
    table
}

fn stack_table(boxes: &[DrawerBoxResult]) -> Table {
    let mut table = Table::new(&[
        "drawer",
        "opening_height",
        "outer_width",
        "outer_height",
        "shop_height",
        "depth",
        "slide",
        "valid",
    ]);
    for (i, b) in boxes.iter().enumerate() {
        table.push(vec![
            (i + 1).to_string(),
            Measure::new(b.opening.height).fraction,
            b.outer.width.fraction.clone(),
            b.outer.height.fraction.clone(),
            b.shop.height.fraction.clone(),
            b.shop.depth.fraction.clone(),
            b.slide.model.clone().unwrap_or_else(|| b.slide.length.to_string()),
            if b.is_valid { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

fn quote_table(quote: &QuickQuote) -> Table {
    let mut table = Table::new(&["model", "item", "qty", "unit_price", "total"]);
    for line in [&quote.slides, &quote.locking_devices] {
        table.push(vec![
            line.model.clone(),
            line.name.clone(),
            line.quantity.to_string(),
            format!("{:.2}", line.unit_price),
            format!("{:.2}", line.total_cost),
        ]);
    }
    table.push(vec![
        String::new(),
        "Hardware total".to_string(),
        String::new(),
        String::new(),
        format!("{:.2}", quote.hardware_total),
    ]);
    table
}

fn print_warnings(global: &GlobalOpts, warnings: &[String]) {
    if global.quiet {
        return;
    }
    for warning in warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }
}

//! `cabkit init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the workspace config even if .cabkit/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            tracing::info!(root = %project.root().display(), "workspace initialized");
            if global.quiet {
                return Ok(());
            }
            println!(
                "{} Initialized cabkit workspace at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created workspace structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Create a project tree",
                style("cabkit project new \"Kitchen\"").yellow()
            );
            println!(
                "  {} Size a cabinet",
                style("cabkit calc cabinet cabinet.yaml").yellow()
            );
            println!(
                "  {} Price a project",
                style("cabkit bom generate PRJ-...").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} cabkit workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("cabkit init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let entries = [
        ".cabkit/",
        ".cabkit/config.yaml",
        ".cabkit/standards/",
        "projects/",
    ];

    for entry in entries {
        if root.join(entry).exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}

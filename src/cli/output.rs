//! Output rendering shared by commands

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::error::CalcError;
use crate::engine::cut_list::CutListItem;

/// Pick the effective format: explicit flag, then configured default, then `auto`
pub fn resolve_format(global: &GlobalOpts, config: &Config, auto: OutputFormat) -> OutputFormat {
    let configured = config
        .default_format
        .as_deref()
        .and_then(|s| s.parse::<OutputFormat>().ok());

    match (global.format, configured) {
        (OutputFormat::Auto, Some(f)) if f != OutputFormat::Auto => f,
        (OutputFormat::Auto, _) => auto,
        (f, _) => f,
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

pub fn print_yaml<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let yaml = serde_yml::to_string(value).into_diagnostic()?;
    print!("{}", yaml);
    Ok(())
}

/// JSON when asked for, YAML for everything else
pub fn print_document<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(value),
        _ => print_yaml(value),
    }
}

/// A header row plus data rows, rendered per output format
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn markdown(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.clone());
        for row in &self.rows {
            builder.push_record(row.clone());
        }
        builder.build().with(Style::markdown()).to_string()
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(std::io::stdout());
                writer.write_record(&self.headers).into_diagnostic()?;
                for row in &self.rows {
                    writer.write_record(row).into_diagnostic()?;
                }
                writer.flush().into_diagnostic()?;
            }
            OutputFormat::Md => {
                println!("{}", self.markdown());
            }
            _ => {
                let header: Vec<String> = self
                    .headers
                    .iter()
                    .map(|h| style(h.to_uppercase()).bold().to_string())
                    .collect();
                println!("{}", header.join("\t"));
                for row in &self.rows {
                    println!("{}", row.join("\t"));
                }
            }
        }
        Ok(())
    }
}

/// Cut list as a table of shop fractions
pub fn cut_list_table(items: &[CutListItem]) -> Table {
    let mut table = Table::new(&["piece", "qty", "width", "height", "thickness", "material"]);
    for item in items {
        table.push(vec![
            item.name.clone(),
            item.quantity.to_string(),
            item.width.fraction.clone(),
            item.height.fraction.clone(),
            item.thickness.fraction.clone(),
            item.material_hint.clone(),
        ]);
    }
    table
}

/// Turn an engine or store error into a report, echoing it as JSON when asked
pub fn fail(global: &GlobalOpts, err: CalcError) -> miette::Report {
    if global.format == OutputFormat::Json {
        if let Ok(json) = serde_json::to_string_pretty(&err.report()) {
            println!("{}", json);
        }
    }
    tracing::debug!(kind = %err.kind(), "command failed");
    miette::Report::new(err)
}

/// Success line in the style used across commands
pub fn success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            format,
            quiet: false,
            verbose: false,
            project: None,
        }
    }

    #[test]
    fn test_resolve_format_prefers_flag() {
        let config = Config {
            default_format: Some("json".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_format(&global(OutputFormat::Md), &config, OutputFormat::Yaml),
            OutputFormat::Md
        );
        assert_eq!(
            resolve_format(&global(OutputFormat::Auto), &config, OutputFormat::Yaml),
            OutputFormat::Json
        );
        assert_eq!(
            resolve_format(&global(OutputFormat::Auto), &Config::default(), OutputFormat::Tsv),
            OutputFormat::Tsv
        );
    }

    #[test]
    fn test_markdown_table() {
        let items = vec![CutListItem::new("Left Side", 23.25, 30.0, 0.75, 1, "3/4\" Plywood")];
        let md = cut_list_table(&items).markdown();
        assert!(md.contains("| piece"));
        assert!(md.contains("23 1/4\""));
    }
}

//! `aikit resolve`

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{CommandContext, OutputFormat};
use crate::core::AikitError;
use crate::synthesis::{Resolution, SynthesisOptions, Synthesizer};

/// Show the resolved module set in dependency order.
///
/// Exits with an error when the set has conflicts or missing requirements, after
/// printing them.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ResolvedModule {
    name: String,
    category: String,
    version: String,
    description: String,
    requires: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
    requested: Vec<String>,
    modules: Vec<ResolvedModule>,
    missing: Vec<String>,
    conflicts: Vec<String>,
}

impl From<&Resolution> for ResolveOutput {
    fn from(resolution: &Resolution) -> Self {
        Self {
            requested: resolution.requested.clone(),
            modules: resolution
                .modules
                .iter()
                .map(|m| ResolvedModule {
                    name: m.name.clone(),
                    category: m.category.clone(),
                    version: m.version().to_string(),
                    description: m.description().to_string(),
                    requires: m.requires().to_vec(),
                })
                .collect(),
            missing: resolution.missing.clone(),
            conflicts: resolution.conflicts.clone(),
        }
    }
}

impl ResolveCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns configuration errors, or [`AikitError::ModuleConflicts`] when the
    /// resolved set is not usable.
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut synthesizer =
            Synthesizer::from_project(&ctx.project_dir, ctx.toolkit(), SynthesisOptions::default())?;
        let resolution = synthesizer.resolve_modules()?;
        let output = ResolveOutput::from(&resolution);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
            OutputFormat::Text if !ctx.quiet => print_text(&output),
            OutputFormat::Text => {}
        }

        if resolution.conflicts.is_empty() {
            Ok(())
        } else {
            Err(AikitError::ModuleConflicts {
                messages: resolution.conflicts,
            }
            .into())
        }
    }
}

fn print_text(output: &ResolveOutput) {
    if output.modules.is_empty() {
        println!("No modules resolved.");
    } else {
        println!("{}", "Modules (dependencies first):".bold());
        for (index, module) in output.modules.iter().enumerate() {
            let version = if module.version.is_empty() { String::new() } else { format!(" v{}", module.version) };
            print!("  {:>2}. {}{} {}", index + 1, module.name.cyan(), version, format!("[{}]", module.category).dimmed());
            if !module.requires.is_empty() {
                print!(" requires {}", module.requires.join(", "));
            }
            println!();
        }
    }

    for name in &output.missing {
        println!("{} Module '{}' not found", "⚠".yellow(), name);
    }
    for message in &output.conflicts {
        println!("{} {}", "✗".red(), message);
    }
}

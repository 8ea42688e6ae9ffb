//! `aikit validate`
//!
//! Runs every check `generate` runs before it renders: configuration, module
//! resolution and conflicts, project rules, and static validation of every selected
//! template. Nothing is written.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{CommandContext, OutputFormat};
use crate::synthesis::{SynthesisOptions, SynthesisPlan, Synthesizer};

/// Check configuration, modules and templates without writing anything.
///
/// ```bash
/// aikit validate
/// aikit validate --format json
/// ```
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// JSON shape of `aikit validate --format json`
///
/// ```json
/// {
///   "valid": true,
///   "editors": ["claude"],
///   "modules": ["base", "tailwind"],
///   "agents": [],
///   "templates": ["claude.md"],
///   "errors": [],
///   "warnings": ["customInstructions"]
/// }
/// ```
#[derive(Debug, Default, Serialize)]
pub struct ValidationResults {
    pub valid: bool,
    pub editors: Vec<String>,
    pub modules: Vec<String>,
    pub agents: Vec<String>,
    pub templates: Vec<String>,
    pub errors: Vec<String>,
    /// Optional template variables that are not set
    pub warnings: Vec<String>,
}

impl ValidateCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns the first fatal problem found; in JSON mode the results are printed
    /// before the error is returned.
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let outcome = Synthesizer::from_project(&ctx.project_dir, ctx.toolkit(), SynthesisOptions::default())
            .and_then(|mut synthesizer| {
                let plan = synthesizer.prepare()?;
                let editors: Vec<String> = synthesizer.loaded().config.editors.iter().map(|e| e.id().to_string()).collect();
                Ok((plan, editors))
            });

        match (self.format, outcome) {
            (OutputFormat::Json, Ok((plan, editors))) => {
                println!("{}", serde_json::to_string_pretty(&results(&plan, editors))?);
                Ok(())
            }
            (OutputFormat::Json, Err(e)) => {
                let failed = ValidationResults {
                    valid: false,
                    errors: vec![format!("{e:#}")],
                    ..Default::default()
                };
                println!("{}", serde_json::to_string_pretty(&failed)?);
                Err(e)
            }
            (OutputFormat::Text, Ok((plan, editors))) => {
                if !ctx.quiet {
                    print_text(&results(&plan, editors));
                }
                Ok(())
            }
            (OutputFormat::Text, Err(e)) => Err(e),
        }
    }
}

fn results(plan: &SynthesisPlan, editors: Vec<String>) -> ValidationResults {
    ValidationResults {
        valid: true,
        editors,
        modules: plan.resolution.modules.iter().map(|m| m.name.clone()).collect(),
        agents: plan.agents.iter().map(|a| a.name.clone()).collect(),
        templates: plan.templates.iter().map(|(_, t)| t.name().to_string()).collect(),
        errors: Vec::new(),
        warnings: plan.warnings.clone(),
    }
}

fn print_text(results: &ValidationResults) {
    println!("{} Configuration is valid", "✓".green());
    println!("  editors:   {}", join_or_none(&results.editors));
    println!("  modules:   {}", join_or_none(&results.modules));
    println!("  agents:    {}", join_or_none(&results.agents));
    println!("  templates: {}", join_or_none(&results.templates));

    for warning in &results.warnings {
        println!("{} Optional variable '{}' is not set", "⚠".yellow(), warning);
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() { "(none)".dimmed().to_string() } else { items.join(", ") }
}

//! `aikit generate`

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::outputs::Editor;
use crate::synthesis::{SynthesisOptions, SynthesisReport, Synthesizer};

/// Run the full pipeline and write the editor files.
///
/// ```bash
/// aikit generate
/// aikit generate --editor claude --editor codex
/// aikit generate --dry-run
/// ```
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Generate only for this editor; repeat for several. Replaces the configured editors.
    #[arg(long = "editor", value_name = "ID")]
    pub editors: Vec<String>,

    /// Show what would change without writing or removing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns any pipeline error.
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let editors = self.editors.iter().map(|id| Editor::parse(id)).collect::<Result<Vec<_>, _>>()?;

        let options = SynthesisOptions {
            editors,
            dry_run: self.dry_run,
        };
        let mut synthesizer = Synthesizer::from_project(&ctx.project_dir, ctx.toolkit(), options)?;
        let report = synthesizer.run()?;

        if !ctx.quiet {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &SynthesisReport) {
    let stats = &report.stats;

    if report.dry_run {
        println!("{}", "Dry run, nothing was changed".yellow());
        for dir in &report.removed_dirs {
            println!("  would remove {}", dir.display());
        }
        for path in &stats.written_paths {
            println!("  would write  {}", path.display());
        }
        println!(
            "{} file(s) would be written, {} unchanged",
            stats.written, stats.skipped
        );
        return;
    }

    for dir in &report.removed_dirs {
        println!("  {} {}", "removed".red(), dir.display());
    }
    for path in &stats.written_paths {
        println!("  {} {}", "wrote".green(), path.display());
    }
    println!(
        "{} {} written, {} unchanged, {} failed ({} module(s), {} agent(s))",
        "✓".green(),
        stats.written,
        stats.skipped,
        stats.failed,
        report.modules.len(),
        report.agents.len()
    );
}

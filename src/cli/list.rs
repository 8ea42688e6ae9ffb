//! `aikit list`
//!
//! Lists what the toolkit (and the project's `.aikit` overrides) offer. Works without a
//! project configuration; `toolkit.path` is honoured when one exists.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use super::{CommandContext, OutputFormat};
use crate::cache::ArtifactCache;
use crate::config::{find_document, parse_document, resolve_toolkit_dir};
use crate::constants::PROJECT_CONFIG_FILES;
use crate::core::ArtifactKind;
use crate::loader::ArtifactLoader;

/// Which artifacts to list
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    Modules,
    Agents,
}

impl From<ListKind> for ArtifactKind {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Modules => Self::Module,
            ListKind::Agents => Self::Agent,
        }
    }
}

/// List available modules and agents.
///
/// ```bash
/// aikit list
/// aikit list agents --format json
/// ```
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Only list this kind
    #[arg(value_enum)]
    pub kind: Option<ListKind>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ListItem {
    kind: &'static str,
    name: String,
    category: String,
    version: String,
    description: String,
    path: String,
}

impl ListCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the toolkit cannot be located or an artifact cannot be read.
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let project_layer = match find_document(&ctx.project_dir, PROJECT_CONFIG_FILES) {
            Some(path) => parse_document(&path)?,
            None => Value::Null,
        };
        let toolkit = resolve_toolkit_dir(ctx.toolkit(), &ctx.project_dir, &project_layer)?;

        let loader = ArtifactLoader::new(&ctx.project_dir, &toolkit);
        let mut cache = ArtifactCache::new();

        let kinds = match self.kind {
            Some(kind) => vec![ArtifactKind::from(kind)],
            None => vec![ArtifactKind::Module, ArtifactKind::Agent],
        };

        let mut items = Vec::new();
        for kind in kinds {
            for reference in loader.list_available(kind) {
                let Some(artifact) = loader.load(&mut cache, kind, &reference.name)? else {
                    continue;
                };
                items.push(ListItem {
                    kind: kind.as_str(),
                    name: artifact.name.clone(),
                    category: artifact.category.clone(),
                    version: artifact.version().to_string(),
                    description: artifact.description().to_string(),
                    path: reference.path.display().to_string(),
                });
            }
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
            OutputFormat::Text if !ctx.quiet => print_table(&items),
            OutputFormat::Text => {}
        }

        Ok(())
    }
}

fn print_table(items: &[ListItem]) {
    if items.is_empty() {
        println!("No modules or agents found.");
        return;
    }

    let name_width = items.iter().map(|i| i.name.len()).max().unwrap_or(4).max(4);
    let category_width = items.iter().map(|i| i.category.len()).max().unwrap_or(8).max(8);

    let mut current_kind = "";
    for item in items {
        if item.kind != current_kind {
            if !current_kind.is_empty() {
                println!();
            }
            current_kind = item.kind;
            println!("{}", format!("{}s", item.kind).bold());
        }

        let version = if item.version.is_empty() { "-" } else { item.version.as_str() };
        println!(
            "  {:<name_width$}  {:<category_width$}  {:<8}  {}",
            item.name.cyan(),
            item.category,
            version,
            item.description.dimmed()
        );
    }
}

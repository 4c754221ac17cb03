//! FlowSketch CLI: manage saved diagrams and convert them to and from text notation.
//!
//! Usage:
//!   flowsketch [--config file] [--store dir] list
//!   flowsketch export <id>
//!   flowsketch import <file> [--name N] [--id ID]

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use flowsketch_core::notation;
use flowsketch_core::{Diagram, DiagramGateway, DiagramId, EditorConfig, FileStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "flowsketch", version, about = "Flowchart diagrams from the command line")]
struct Cli {
    /// Path to a JSON editor config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding saved diagrams
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved diagrams, newest first
    List,
    /// Show a summary of a diagram
    Show {
        id: String,
    },
    /// Print a diagram as text notation
    Export {
        id: String,
    },
    /// Create or replace a diagram from a notation file
    Import {
        /// Notation file
        file: PathBuf,
        /// Diagram name
        #[arg(long)]
        name: Option<String>,
        /// Replace the diagram with this id instead of creating a new one
        #[arg(long)]
        id: Option<String>,
    },
    /// Create an empty diagram
    New {
        name: String,
    },
    /// Delete a diagram
    Delete {
        id: String,
    },
}

fn open_gateway(config: &EditorConfig, store: Option<PathBuf>) -> Result<DiagramGateway<FileStore>> {
    let dir = match store {
        Some(dir) => dir,
        None => config.storage_dir().context("Could not determine storage directory")?,
    };
    log::debug!("Using diagram store at {}", dir.display());
    let store = FileStore::new(&dir).with_context(|| format!("Failed to open store at {}", dir.display()))?;
    Ok(DiagramGateway::new(Arc::new(store)))
}

fn load(gateway: &DiagramGateway<FileStore>, id: &str) -> Result<Diagram> {
    let record = gateway
        .fetch(&DiagramId::from(id))
        .with_context(|| format!("Failed to load diagram '{}'", id))?;
    Ok(Diagram::from_record(record))
}

/// Delete a diagram the store knows about, even if its record no longer parses.
fn delete(gateway: &DiagramGateway<FileStore>, id: &DiagramId) -> Result<()> {
    if !gateway.contains(id) {
        bail!("Diagram '{}' not found", id);
    }
    gateway.delete(id)?;
    log::info!("Deleted diagram {}", id);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let gateway = open_gateway(&config, cli.store)?;

    match cli.command {
        Commands::List => {
            let diagrams = gateway.list();
            if diagrams.is_empty() {
                println!("No saved diagrams");
            }
            for meta in diagrams {
                println!("{}  {}  {}", meta.id, meta.last_modified.to_rfc3339(), meta.name);
            }
        }
        Commands::Show { id } => {
            let diagram = load(&gateway, &id)?;
            let graph = &diagram.graph;
            println!("{} ({})", diagram.name, diagram.id);
            if let Some(modified) = diagram.last_modified {
                println!("Last modified: {}", modified.to_rfc3339());
            }
            println!("{} nodes, {} edges", graph.node_count(), graph.edge_count());
            for node in graph.nodes() {
                match node.score_value() {
                    Some(score) => println!("  {} [{}] {} (score {:.1})", node.id(), node.kind, node.label, score),
                    None => println!("  {} [{}] {}", node.id(), node.kind, node.label),
                }
            }
            let dangling = graph.dangling_edges().count();
            if dangling > 0 {
                println!("{} dangling edges", dangling);
            }
        }
        Commands::Export { id } => {
            let diagram = load(&gateway, &id)?;
            print!("{}", notation::generate(&diagram.graph));
        }
        Commands::Import { file, name, id } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let parsed = notation::parse_with_layout(&text, config.import_layout());
            if parsed.report.is_empty() && !text.trim().is_empty() {
                bail!("{} contains no recognizable nodes or edges", file.display());
            }
            let id = id.map(DiagramId::from).unwrap_or_else(DiagramId::generate);
            let name = name.unwrap_or_else(|| {
                file.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Imported Diagram")
                    .to_string()
            });
            if parsed.report.skipped > 0 {
                log::warn!("Skipped {} unrecognized lines in {}", parsed.report.skipped, file.display());
            }
            let graph = parsed.graph;
            gateway.save(&id, &name, graph.nodes(), graph.edges())?;
            println!(
                "Imported {} nodes and {} edges into '{}' ({}), {} lines skipped",
                parsed.report.nodes, parsed.report.edges, name, id, parsed.report.skipped
            );
        }
        Commands::New { name } => {
            let mut diagram = Diagram::new();
            diagram.name = name;
            gateway.save(&diagram.id, &diagram.name, &[], &[])?;
            println!("{}", diagram.id);
        }
        Commands::Delete { id } => {
            let id = DiagramId::from(id);
            delete(&gateway, &id)?;
            println!("Deleted {}", id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsketch_core::KeyValueStore;
    use flowsketch_core::storage::RECORD_KEY_PREFIX;

    #[test]
    fn test_delete_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = open_gateway(&EditorConfig::default(), Some(dir.path().to_path_buf())).unwrap();
        let id = DiagramId::from("broken");
        gateway.save(&id, "Broken", &[], &[]).unwrap();
        gateway
            .store()
            .set(&format!("{}{}", RECORD_KEY_PREFIX, id), "{broken")
            .unwrap();

        assert!(load(&gateway, "broken").is_err());
        delete(&gateway, &id).unwrap();
        assert!(gateway.list().is_empty());
        assert!(delete(&gateway, &id).is_err());
    }
}

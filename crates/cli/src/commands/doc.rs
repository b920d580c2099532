//! Document management commands.
//!
//! The write path of the knowledge store: ingest files (or directories of
//! files) into an agent's partition, list what an agent knows, and delete
//! documents with their chunk cascade.

use crate::runtime::{build_registry, build_store};
use clap::{Args, Subcommand};
use quorum_agents::AgentRegistry;
use quorum_core::{config::AppConfig, AppError, AppResult};
use std::path::{Path, PathBuf};

/// File extensions ingested when a directory is given.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Manage an agent's documents
#[derive(Args, Debug)]
pub struct DocCommand {
    #[command(subcommand)]
    command: DocSubcommand,
}

#[derive(Subcommand, Debug)]
enum DocSubcommand {
    /// Ingest a file or a directory of text files into an agent's partition
    Add {
        /// Agent id
        agent_id: String,

        /// File or directory to ingest
        path: PathBuf,
    },

    /// List an agent's documents
    List {
        /// Agent id
        agent_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a document and every chunk derived from it
    Delete {
        /// Agent id
        agent_id: String,

        /// Document id
        document_id: String,
    },
}

impl DocCommand {
    /// Execute the doc command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = build_store(config)?;

        match &self.command {
            DocSubcommand::Add { agent_id, path } => {
                // The partition must belong to a registered agent
                let registry = build_registry(config)?;
                if registry.get_agent(agent_id).await?.is_none() {
                    return Err(AppError::Registry(format!(
                        "No agent with id '{}'",
                        agent_id
                    )));
                }

                let files = collect_files(path)?;
                if files.is_empty() {
                    return Err(AppError::Knowledge(format!(
                        "No ingestible files found at {:?}",
                        path
                    )));
                }

                for file in files {
                    let raw_text = std::fs::read_to_string(&file)?;
                    let filename = file
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                        .to_string();
                    let document_id = uuid::Uuid::new_v4().to_string();

                    let record = store
                        .ingest(agent_id, &document_id, &raw_text, &filename)
                        .await?;

                    println!(
                        "Ingested '{}' as {} ({} chunks)",
                        record.filename, record.id, record.chunk_count
                    );
                }
                Ok(())
            }

            DocSubcommand::List { agent_id, json } => {
                let documents = store.documents(agent_id)?;

                if *json {
                    let output = serde_json::to_string_pretty(&documents)
                        .map_err(|e| AppError::Serialization(e.to_string()))?;
                    println!("{}", output);
                } else if documents.is_empty() {
                    println!("No documents in partition '{}'.", agent_id);
                } else {
                    for doc in documents {
                        println!(
                            "{}  {}  {} chunks, {} bytes, {}",
                            doc.id, doc.filename, doc.chunk_count, doc.size_bytes, doc.ingested_at
                        );
                    }
                }
                Ok(())
            }

            DocSubcommand::Delete {
                agent_id,
                document_id,
            } => {
                let removed = store.delete(agent_id, document_id)?;
                if removed > 0 {
                    println!("Deleted document '{}' ({} chunks)", document_id, removed);
                } else {
                    println!("Document '{}' was not present", document_id);
                }
                Ok(())
            }
        }
    }
}

/// Collect ingestible files from a path: the file itself, or text files
/// found under a directory.
fn collect_files(path: &Path) -> AppResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        return Err(AppError::Knowledge(format!("Path not found: {:?}", path)));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let entry_path = entry.path();
        if entry_path.is_file() {
            let extension = entry_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if TEXT_EXTENSIONS.contains(&extension) {
                files.push(entry_path.to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

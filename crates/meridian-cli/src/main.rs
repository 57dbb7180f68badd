// Operator tooling over directory snapshot files

use clap::{Parser, Subcommand};
use meridian_core::{NamespaceId, NodeId};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "meridian")]
#[command(about = "Meridian - replicated namespace metadata tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every namespace with all current field versions
    Show {
        /// Directory snapshot (JSON)
        file: PathBuf,
    },

    /// Resolve a namespace name
    Lookup {
        /// Directory snapshot (JSON)
        file: PathBuf,
        /// Namespace name
        name: String,
    },

    /// List unresolved conflicts
    Conflicts {
        /// Directory snapshot (JSON)
        file: PathBuf,
    },

    /// Join two snapshots
    Merge {
        /// First snapshot
        a: PathBuf,
        /// Second snapshot
        b: PathBuf,
        /// Where to write the joined snapshot
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Create a namespace, starting a new snapshot if the file is missing
    Create {
        /// Directory snapshot (JSON)
        file: PathBuf,
        /// Writing node (UUID)
        #[arg(long)]
        node: NodeId,
        /// Namespace name
        #[arg(long)]
        name: String,
        /// Client port
        #[arg(long, default_value = "0")]
        port: u16,
        /// Primary key column
        #[arg(long, default_value = "id")]
        primary_key: String,
    },

    /// Write one field of a namespace
    Set {
        /// Directory snapshot (JSON)
        file: PathBuf,
        /// Writing node (UUID)
        #[arg(long)]
        node: NodeId,
        /// Namespace (UUID)
        #[arg(long)]
        namespace: NamespaceId,
        /// Field name, e.g. `name` or `primary_uuid`
        field: String,
        /// New value as JSON
        value: String,
    },

    /// Delete a namespace
    Delete {
        /// Directory snapshot (JSON)
        file: PathBuf,
        /// Writing node (UUID)
        #[arg(long)]
        node: NodeId,
        /// Namespace (UUID)
        #[arg(long)]
        namespace: NamespaceId,
    },

    /// Undo a deletion or settle a delete/restore conflict
    Restore {
        /// Directory snapshot (JSON)
        file: PathBuf,
        /// Writing node (UUID)
        #[arg(long)]
        node: NodeId,
        /// Namespace (UUID)
        #[arg(long)]
        namespace: NamespaceId,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Show { file } => {
            let dir = commands::load(&file)?;
            println!("{}", commands::show(&dir)?);
        }
        Commands::Lookup { file, name } => {
            let dir = commands::load(&file)?;
            println!("{}", commands::lookup(&dir, &name));
        }
        Commands::Conflicts { file } => {
            let dir = commands::load(&file)?;
            println!("{}", commands::conflicts(&dir));
        }
        Commands::Merge { a, b, output } => {
            let merged = commands::merge(&commands::load(&a)?, &commands::load(&b)?);
            commands::save(&output, &merged)?;
            println!("merged {} namespaces into {}", merged.len(), output.display());
        }
        Commands::Create {
            file,
            node,
            name,
            port,
            primary_key,
        } => {
            let dir = commands::load_or_empty(&file)?;
            let (id, dir) = commands::create(&dir, node, &name, port, &primary_key);
            commands::save(&file, &dir)?;
            println!("{id}");
        }
        Commands::Set {
            file,
            node,
            namespace,
            field,
            value,
        } => {
            let dir = commands::load(&file)?;
            let dir = commands::set(&dir, node, namespace, &field, &value)?;
            commands::save(&file, &dir)?;
        }
        Commands::Delete {
            file,
            node,
            namespace,
        } => {
            let dir = commands::load(&file)?.delete_namespace(namespace, node)?;
            commands::save(&file, &dir)?;
        }
        Commands::Restore {
            file,
            node,
            namespace,
        } => {
            let dir = commands::load(&file)?.restore_namespace(namespace, node)?;
            commands::save(&file, &dir)?;
        }
    }

    Ok(())
}

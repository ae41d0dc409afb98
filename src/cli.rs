use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about = "Streaming catalog server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Create an admin account
    CreateAdmin {
        username: String,
        password: String,
    },

    /// Generate a bcrypt password hash
    HashPassword {
        /// Password to hash
        password: String,
    },

    /// Import catalog records from a JSON file
    Seed {
        /// JSON array of catalog records
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

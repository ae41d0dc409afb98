mod cli;

use marquee::{
    config, seed,
    server::{self, auth},
};
use marquee_db::pool::{get_conn, init_pool, DbPool};
use marquee_db::queries::admins;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn open_database(config: &config::Config) -> Result<DbPool> {
    let db_path = config::database_path(config);
    let db_path_str = db_path.to_string_lossy();
    tracing::info!("Opening database at {}", db_path_str);
    init_pool(&db_path_str).with_context(|| format!("Failed to open database {}", db_path_str))
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags (and PORT) win over the config file
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting Marquee server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let db_pool = open_database(&config)?;
    server::start_server(config, db_pool).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "marquee=trace,marquee_db=debug,marquee_player=trace,marquee_common=debug,tower_http=debug".to_string()
        } else {
            "marquee=debug,marquee_db=info,marquee_player=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::CreateAdmin { username, password } => {
            create_admin(cli.config.as_deref(), &username, &password)
        }
        Commands::HashPassword { password } => hash_password(&password),
        Commands::Seed { file } => seed_catalog(cli.config.as_deref(), &file),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("marquee {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn create_admin(config_path: Option<&Path>, username: &str, password: &str) -> Result<()> {
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let config = config::load_config_or_default(config_path)?;
    let pool = open_database(&config)?;
    let conn = get_conn(&pool)?;

    let hash = auth::hash_password(password)?;
    let admin = admins::create_admin(&conn, username, &hash)?;
    println!("Created admin '{}' ({})", admin.username, admin.id);
    Ok(())
}

fn seed_catalog(config_path: Option<&Path>, file: &Path) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Seed file does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let pool = open_database(&config)?;
    let conn = get_conn(&pool)?;

    let report = seed::import_file(&conn, file)?;
    println!("Imported {} records", report.imported);
    for (index, reason) in &report.skipped {
        println!("  skipped entry {}: {}", index, reason);
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Database: {}", config::database_path(&config).display());
            println!(
                "  Admin sessions required: {}",
                config.auth.require_admin_session
            );
            println!("  Session timeout: {}h", config.auth.session_timeout_hours);
            println!("  Player idle timeout: {}ms", config.player.idle_timeout_ms);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}

fn hash_password(password: &str) -> Result<()> {
    let hash = auth::hash_password(password)?;
    println!("{}", hash);
    Ok(())
}

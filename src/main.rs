use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use pattoo_shared::config::{
    Config, ConfigDocument, ConfigError, Paths, agent_required_keys, check_config, expand_user,
    server_required_keys,
};
use pattoo_shared::install::{self, Role};

/// Configuration provisioning for the pattoo monitoring platform
#[derive(Parser, Debug)]
#[command(name = "pattoo-setup", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create or update a configuration file and provision its directories
    Configure {
        /// Configure the server instead of an agent
        #[arg(long)]
        server: bool,
        /// Configuration directory (defaults to $PATTOO_CONFIGDIR)
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
    /// Validate required configuration keys
    Check {
        /// Check the server configuration instead of an agent's
        #[arg(long)]
        server: bool,
        /// Configuration directory (defaults to $PATTOO_CONFIGDIR)
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
    /// Print the resolved configuration as YAML
    Show {
        /// Configuration directory (defaults to $PATTOO_CONFIGDIR)
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!(code = err.code(), "{err}");
        process::exit(2);
    }
}

fn run(cli: Cli) -> Result<(), ConfigError> {
    match cli.command {
        Commands::Configure { server, config_dir } => {
            let directory = resolve_config_dir(config_dir)?;
            let (defaults, role) = if server {
                (install::default_server_config(), Role::Server)
            } else {
                (install::default_agent_config(), Role::Agent)
            };
            let path = install::configure(&directory, &defaults, role)?;
            println!("Configuration written to {}", path.display());
            Ok(())
        }
        Commands::Check { server, config_dir } => {
            let directory = resolve_config_dir(config_dir)?;
            let role = if server { Role::Server } else { Role::Agent };
            let path = directory.join(role.config_filename());

            println!("??: Checking configuration parameters.");
            let document = ConfigDocument::read(&path)?;
            let required = if server {
                server_required_keys()
            } else {
                agent_required_keys()
            };
            check_config(&document, &required)?;
            if role == Role::Agent {
                Config::from_document(&document)?;
            }
            println!("OK: Configuration parameter check passed.");
            Ok(())
        }
        Commands::Show { config_dir } => {
            let directory = resolve_config_dir(config_dir)?;
            let config = Config::from_file(&directory.join("pattoo.yaml"))?;
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

fn resolve_config_dir(overridden: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match overridden {
        Some(directory) => Ok(expand_user(&directory)),
        None => Paths::config_dir(),
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info, warn};
use zt_routes::{
    config::{self, routes_file_path, ConfigFormat},
    constants::{
        API_URL_ENV_VAR, DEFAULT_API_URL, DEFAULT_GROUP, DEFAULT_NETWORK_CONFIG_PATH,
        DEFAULT_ROUTES_DIR, LOG_FORMAT_ENV_VAR, TOKEN_ENV_VAR,
    },
    controller::ControllerClient,
    errors::RoutesError,
    metrics,
    reconcile::{Reconciler, RunOptions},
    resolver::HickoryResolver,
};

/// Keep a virtual network's route table in step with a list of domains.
///
/// Without a subcommand, reconciles the network file given by --config.
#[derive(Parser, Debug)]
#[command(name = "zt-routes", version, about, long_about = None)]
struct Cli {
    /// Network file, or the directory holding <NETWORK>.routes.json files for subcommands
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Resolve and persist without contacting the controller; print the result
    #[arg(long, global = true)]
    debug: bool,

    /// Controller API token
    #[arg(short = 't', long, env = TOKEN_ENV_VAR, hide_env_values = true, global = true)]
    token: Option<String>,

    /// Controller API base URL
    #[arg(long, env = API_URL_ENV_VAR, default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Configuration file encoding [default: relaxed for the network file, json for routes files]
    #[arg(long, value_enum, global = true)]
    format: Option<ConfigFormat>,

    /// Write Prometheus text-format run metrics to this file
    #[arg(long, global = true)]
    metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Resolve a network's routes file and sync it to the controller
    Lookup {
        /// Network ID
        network: String,
    },
    /// Add domains to a group of a network's routes file
    Add {
        /// Network ID
        network: String,
        /// Domains to add
        #[arg(required = true)]
        domains: Vec<String>,
        /// Group to add the domains to
        #[arg(short = 'g', long, default_value = DEFAULT_GROUP)]
        group: String,
    },
    /// Remove domains from a network's routes file
    Rm {
        /// Network ID
        network: Option<String>,
        /// Domains to remove
        domains: Vec<String>,
    },
    /// Copy one network's routes file over another's
    Clone {
        /// Source network ID
        src: String,
        /// Destination network ID
        dest: String,
    },
    /// Re-run lookup periodically
    Watch {
        /// Network IDs
        networks: Vec<String>,
        /// Hours between runs
        #[arg(long, required = true, value_name = "HOURS")]
        interval: u64,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Lookup { .. } => "lookup",
            Self::Add { .. } => "add",
            Self::Rm { .. } => "rm",
            Self::Clone { .. } => "clone",
            Self::Watch { .. } => "watch",
            Self::Completions { .. } => "completions",
        }
    }
}

impl Cli {
    fn command_name(&self) -> &'static str {
        self.command.as_ref().map_or("sync", Command::name)
    }

    /// Network file for the root run, routes directory for subcommands.
    fn config_path(&self) -> PathBuf {
        let default = if self.command.is_some() {
            DEFAULT_ROUTES_DIR
        } else {
            DEFAULT_NETWORK_CONFIG_PATH
        };
        self.config.clone().unwrap_or_else(|| PathBuf::from(default))
    }

    fn config_format(&self) -> ConfigFormat {
        self.format.unwrap_or(if self.command.is_some() {
            ConfigFormat::Json
        } else {
            ConfigFormat::Relaxed
        })
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            debug: self.debug,
            token: self.token.clone(),
            format: self.config_format(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Command::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "zt-routes", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_logging();

    // One run is strictly sequential, a single thread is enough
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    // Logs go to stderr; stdout is reserved for debug output and completions.
    //
    // Respects RUST_LOG, defaulting to INFO, and RUST_LOG_FORMAT=json for JSON output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var(LOG_FORMAT_ENV_VAR).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    debug!("Logging initialized with file and line number tracking");
}

async fn async_main(cli: Cli) -> Result<()> {
    let command = cli.command_name();
    let started = Instant::now();

    let result = execute(&cli).await;

    match &result {
        Ok(routes) => metrics::record_run_success(command, started.elapsed(), *routes),
        Err(e) => metrics::record_run_error(command, started.elapsed(), e.kind()),
    }

    if let Some(path) = &cli.metrics_file {
        if let Err(e) = metrics::write_metrics_file(path).await {
            warn!(path = %path.display(), error = %e, "Failed to write metrics file");
        }
    }

    let routes = result.with_context(|| format!("{command} failed"))?;
    info!(command = %command, routes = routes, elapsed = ?started.elapsed(), "Run complete");
    Ok(())
}

/// Run the selected command. Returns the number of routes it produced.
async fn execute(cli: &Cli) -> Result<usize, RoutesError> {
    let config_path = cli.config_path();
    let format = cli.config_format();

    match &cli.command {
        None => {
            let (resolver, controller) = clients(cli)?;
            let report = Reconciler::new(&resolver, &controller)
                .sync_network(&config_path, &cli.run_options(), &mut io::stdout())
                .await?;
            Ok(report.routes)
        }
        Some(Command::Lookup { network }) => {
            let (resolver, controller) = clients(cli)?;
            let path = routes_file_path(&config_path, network);
            let report = Reconciler::new(&resolver, &controller)
                .lookup(network, &path, &cli.run_options(), &mut io::stdout())
                .await?;
            Ok(report.routes)
        }
        Some(Command::Add {
            network,
            domains,
            group,
        }) => {
            if network.trim().is_empty() {
                return Err(RoutesError::Config {
                    operation: "add",
                    reason: "argument can not be empty: NETWORK".to_string(),
                });
            }
            let path = routes_file_path(&config_path, network);
            let added = config::add_to_routes_file(&path, group, domains, format).await?;
            info!(network = %network, group = %group, added = added, "Added domains");
            Ok(added)
        }
        Some(Command::Clone { src, dest }) => {
            let groups = config::clone_routes_file(&config_path, src, dest, format).await?;
            Ok(groups.iter().map(|group| group.routes.len()).sum())
        }
        Some(Command::Rm { .. }) => Err(RoutesError::NotImplemented { command: "rm" }),
        Some(Command::Watch { .. }) => Err(RoutesError::NotImplemented { command: "watch" }),
        Some(Command::Completions { .. }) => Ok(0),
    }
}

fn clients(cli: &Cli) -> Result<(HickoryResolver, ControllerClient), RoutesError> {
    let controller = ControllerClient::new(&cli.api_url)?;
    debug!(api_url = %controller.base_url(), "Controller client created");
    Ok((HickoryResolver::from_system_conf(), controller))
}

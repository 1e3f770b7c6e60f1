//! Sundial CLI: run the forecast tool host, or call one.

mod demo;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use sundial_client::McpHttpClient;
use sundial_config::{CliOverrides, SundialConfig};
use sundial_host::{Dispatcher, ServerInfo, ToolRegistry};
use sundial_types::ToolOutput;

#[derive(Parser)]
#[command(name = "sundial", version, about = "Stateless JSON-RPC tool host and client")]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Directory holding config.toml (overrides SUNDIAL_CONFIG_DIR)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the tool host
    Serve {
        /// Address to bind (overrides SUNDIAL_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// List the tools a host publishes
    Tools {
        /// Host endpoint (overrides SUNDIAL_URL)
        #[arg(long)]
        url: Option<String>,
    },
    /// Invoke one tool and print its text output
    Call {
        /// Tool name
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Host endpoint (overrides SUNDIAL_URL)
        #[arg(long)]
        url: Option<String>,
    },
    /// Walk through discovery and invocation step by step
    Demo {
        /// City to forecast; repeat for several
        #[arg(long = "city", default_value = "New York")]
        cities: Vec<String>,
        /// Host endpoint (overrides SUNDIAL_URL)
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut overrides = CliOverrides {
        config_dir: cli.config_dir,
        ..Default::default()
    };
    match &cli.command {
        Command::Serve { bind } => overrides.bind = bind.clone(),
        Command::Tools { url } | Command::Call { url, .. } | Command::Demo { url, .. } => {
            overrides.url = url.clone()
        }
    }
    let config = SundialConfig::load(overrides).map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::debug!("Config resolved from {}", config.config_dir.display());

    match cli.command {
        Command::Serve { .. } => {
            let dispatcher = Dispatcher::new(
                ToolRegistry::with_builtins(),
                ServerInfo::new(config.server.name.clone()),
            );
            eprintln!(
                "sundial v{} serving on http://{}{}",
                env!("CARGO_PKG_VERSION"),
                config.server.bind,
                config.server.path
            );
            sundial_host::serve(dispatcher, &config.server)
                .await
                .context("Host stopped")?;
        }
        Command::Tools { .. } => {
            let client = connect(&config)?;
            let tools = client.list_tools().await?;
            for tool in tools {
                println!("{}: {}", tool.name, tool.description.trim());
            }
        }
        Command::Call { name, args, .. } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            anyhow::ensure!(arguments.is_object(), "--args must be a JSON object");
            let client = connect(&config)?;
            let output = client.call_tool(&name, arguments).await?;
            print_output(&output);
            anyhow::ensure!(!output.is_error, "Tool '{name}' reported an error");
        }
        Command::Demo { cities, .. } => {
            let client = connect(&config)?;
            demo::run(&client, &cities).await?;
        }
    }

    Ok(())
}

fn connect(config: &SundialConfig) -> Result<McpHttpClient> {
    McpHttpClient::from_config(&config.client).context("Failed to create client")
}

fn print_output(output: &ToolOutput) {
    for text in output.texts() {
        println!("{text}");
    }
}

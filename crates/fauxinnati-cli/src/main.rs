use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use fauxinnati_api::Server;
use fauxinnati_core::{ConfigManager, Settings, Version};
use fauxinnati_graph::{generate_graph, render_graph, Channel, Highlight};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fauxinnati")]
#[command(about = "Mock Cincinnati update graph server", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Configuration directory
    #[arg(long, global = true, env = "FAUXINNATI_CONFIG_DIR")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Debug, Default)]
struct ServeArgs {
    /// Address to bind, overrides server.host
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides server.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Print the graph a channel serves for a version
    Graph {
        /// Channel name
        #[arg(short, long)]
        channel: String,

        /// Queried version
        #[arg(long = "version", value_name = "VERSION")]
        queried: String,

        /// Architecture recorded in node metadata
        #[arg(short, long)]
        arch: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        output: OutputFormat,
    },

    /// List the available channels
    Channels {
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Serialize)]
struct ChannelSummary {
    name: &'static str,
    description: &'static str,
    contains_queried_version: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::new(cli.config.clone()).context("Failed to load configuration")?;
    let config_dir = config.config_dir().to_path_buf();
    let settings = config.into_settings();
    init_tracing(&settings, cli.verbose);
    info!(config_dir = %config_dir.display(), env = %settings.env, "Loaded configuration");

    if let Err(e) = execute_command(cli, settings).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(settings: &Settings, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        settings.logging.level.as_str()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fauxinnati={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute_command(cli: Cli, settings: Settings) -> Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => serve(settings, args).await,
        None => serve(settings, cli.serve).await,
        Some(Commands::Graph {
            channel,
            queried,
            arch,
            output,
        }) => print_graph(&channel, &queried, arch.as_deref(), output),
        Some(Commands::Channels { output }) => print_channels(output),
    }
}

fn apply_overrides(mut settings: Settings, args: ServeArgs) -> Result<Settings> {
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    settings.validate()?;
    Ok(settings)
}

async fn serve(settings: Settings, args: ServeArgs) -> Result<()> {
    let settings = apply_overrides(settings, args)?;
    let server = Server::new(settings).await?;
    server.run().await
}

fn print_graph(channel: &str, queried: &str, arch: Option<&str>, output: OutputFormat) -> Result<()> {
    let version =
        Version::parse(queried).with_context(|| format!("Invalid version format: {queried}"))?;
    let graph = generate_graph(channel, &version, arch)?;
    match output {
        OutputFormat::Json => println!("{}", graph.to_json_pretty()?),
        OutputFormat::Pretty => println!("{}", render_graph(&graph, &Highlight::bold(&version))?),
    }
    Ok(())
}

fn channel_summaries() -> Vec<ChannelSummary> {
    Channel::ALL
        .into_iter()
        .map(|channel| ChannelSummary {
            name: channel.name(),
            description: channel.description(),
            contains_queried_version: channel.includes_queried_version(),
        })
        .collect()
}

fn print_channels(output: OutputFormat) -> Result<()> {
    let summaries = channel_summaries();
    if let OutputFormat::Json = output {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for summary in summaries {
        let marker = if summary.contains_queried_version {
            "contains queried version".green()
        } else {
            "excludes queried version".yellow()
        };
        println!("{} ({})", summary.name.cyan().bold(), marker);
        println!("  {}", summary.description);
    }
    Ok(())
}

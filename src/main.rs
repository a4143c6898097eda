#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::needless_pass_by_value,
    clippy::too_many_lines,
    clippy::uninlined_format_args
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use linehook::channels::LineClient;
use linehook::config::{Config, ConfigIssueSeverity};
use linehook::dispatch::create_dispatcher;
use linehook::echo::echo_registry;
use linehook::gateway::{run_gateway, AppState};
use linehook::handlers::HandlerSlot;
use linehook::reply::{create_logging_sink, ReplySink};

/// `linehook` - receive chat-platform webhooks and answer every event.
#[derive(Parser, Debug)]
#[command(name = "linehook")]
#[command(version)]
#[command(about = "Webhook event dispatcher for LINE bots.", long_about = None)]
struct Cli {
    /// Path to config.toml (default: ~/.linehook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook gateway with the built-in echo bot
    #[command(long_about = "\
Start the webhook gateway with the built-in echo bot.

Verifies each incoming batch with the channel secret, dispatches every \
event to its handler concurrently and sends the replies through the \
Messaging API. Bind address defaults to gateway.host / gateway.port.

Examples:
  linehook serve                    # use config defaults
  linehook serve -p 9000            # listen on port 9000
  linehook serve --host 0.0.0.0     # bind to all interfaces
  linehook serve --dry-run          # log replies instead of sending them")]
    Serve {
        /// Port to listen on (use 0 for random available port); defaults to config gateway.port
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to; defaults to config gateway.host
        #[arg(long)]
        host: Option<String>,

        /// Log replies instead of calling the reply API; no access token needed
        #[arg(long)]
        dry_run: bool,
    },

    /// Show resolved configuration and validation issues
    Status,

    /// List handler slots and whether the echo bot answers them
    Routes,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging - respects RUST_LOG env var, defaults to INFO
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let mut config = Config::load(cli.config.as_deref()).await?;
    config.apply_env_overrides();

    match cli.command {
        Commands::Serve {
            port,
            host,
            dry_run,
        } => serve(config, host, port, dry_run).await,
        Commands::Status => {
            print_status(&config);
            Ok(())
        }
        Commands::Routes => {
            print_routes();
            Ok(())
        }
    }
}

async fn serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    dry_run: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.gateway.host = host;
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }

    let mut errors = 0;
    for issue in config.validate() {
        // Dry runs never call the reply API.
        if dry_run && issue.field == "line.channel_access_token" {
            continue;
        }
        match issue.severity {
            ConfigIssueSeverity::Warning => tracing::warn!(field = %issue.field, "{}", issue.message),
            ConfigIssueSeverity::Error => {
                tracing::error!(field = %issue.field, "{}", issue.message);
                errors += 1;
            }
        }
    }
    if errors > 0 {
        bail!(
            "refusing to serve with {errors} configuration error(s); see `linehook status` ({})",
            config.config_path.display()
        );
    }

    let client = Arc::new(LineClient::from_config(&config.line)?);
    let sink: Arc<dyn ReplySink> = if dry_run {
        create_logging_sink()
    } else {
        client.clone()
    };
    let registry = Arc::new(echo_registry());

    info!(
        handlers = registry.len(),
        sink = sink.name(),
        missing_handler = %config.dispatch.missing_handler,
        "starting linehook"
    );

    let state = AppState {
        parser: client,
        dispatcher: create_dispatcher(registry, sink, config.dispatch.missing_handler),
    };
    run_gateway(&config.gateway, state).await
}

fn print_status(config: &Config) {
    let set = |value: &Option<String>| {
        if value.as_deref().is_some_and(|v| !v.is_empty()) {
            "set"
        } else {
            "not set"
        }
    };

    println!("linehook status");
    println!();
    println!(
        "  Config:          {}{}",
        config.config_path.display(),
        if config.config_path.exists() {
            ""
        } else {
            " (not found, using defaults)"
        }
    );
    println!(
        "  Gateway:         http://{}:{}{}",
        config.gateway.host, config.gateway.port, config.gateway.webhook_path
    );
    println!("  Max body:        {} bytes", config.gateway.max_body_bytes);
    println!("  API base URL:    {}", config.line.api_base_url);
    println!("  Channel secret:  {}", set(&config.line.channel_secret));
    println!("  Access token:    {}", set(&config.line.channel_access_token));
    println!("  Missing handler: {}", config.dispatch.missing_handler);

    let issues = config.validate();
    println!();
    if issues.is_empty() {
        println!("  No configuration issues.");
    } else {
        for issue in issues {
            println!("  {issue}");
        }
    }
}

fn print_routes() {
    let registry = echo_registry();
    for slot in HandlerSlot::ALL {
        let marker = if registry.contains(slot) { "*" } else { " " };
        println!("  {marker} {slot}");
    }
    println!();
    println!("  * answered by the built-in echo bot");
}

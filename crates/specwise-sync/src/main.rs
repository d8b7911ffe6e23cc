/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Task/file commands against the Specwise API, live status polling
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or shutdown handling
*/

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use specwise_client::TaskStatus;
use specwise_sync::{ChannelNotifier, Notification, NotificationLevel, SyncConfig, SyncContext};

/// How long pending notifications may take to print after a command ends
const NOTIFICATION_FLUSH_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "specwise-sync", version, about = "Specwise task and file synchronizer")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load existing tasks and poll until interrupted
    Watch,
    /// List tasks known to the server
    Tasks,
    /// List files, optionally filtered by customer or task
    Files {
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        task: Option<String>,
    },
    /// Upload documents and follow their tasks to completion
    Upload {
        #[arg(long = "customer-id")]
        customer_id: String,
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Generate XML from a file's items (default: high-confidence items)
    GenerateXml {
        file_id: String,
        #[arg(long = "item", value_name = "KEY")]
        items: Vec<String>,
    },
    /// Save a file's generated XML
    DownloadXml {
        file_id: String,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    DeleteTask {
        task_id: String,
    },
    DeleteFile {
        file_id: String,
    },
    /// Override a task's status on the server
    SetStatus {
        task_id: String,
        status: TaskStatus,
        #[arg(long)]
        info: Option<String>,
    },
    /// Interactively write a configuration file
    InitConfig {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let command = match args.command {
        Command::InitConfig { output } => return cli::init::run_init(output),
        command => command,
    };

    let config = SyncConfig::load(args.config_path.as_deref()).context("load config")?;
    info!(
        base_url = %config.api.base_url,
        poll_interval_ms = config.poll.interval_ms,
        "configuration loaded"
    );

    let (notifier, notifications) = ChannelNotifier::new();
    let printer = tokio::spawn(print_notifications(notifications));

    let ctx = SyncContext::new(config, Arc::new(notifier)).context("create API client")?;

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let result = run_command(&ctx, command, shutdown).await;

    // closes the notification channel once detached poll passes finish
    drop(ctx);
    if tokio::time::timeout(NOTIFICATION_FLUSH_TIMEOUT, printer)
        .await
        .is_err()
    {
        warn!("notification printer did not drain in time");
    }

    result
}

async fn run_command(ctx: &SyncContext, command: Command, shutdown: CancellationToken) -> Result<()> {
    match command {
        Command::Watch => cli::commands::watch(ctx, shutdown).await,
        Command::Tasks => cli::commands::list_tasks(ctx).await,
        Command::Files { customer, task } => cli::commands::list_files(ctx, customer, task).await,
        Command::Upload { customer_id, files } => {
            cli::commands::upload(ctx, customer_id, files, shutdown).await
        }
        Command::GenerateXml { file_id, items } => {
            cli::commands::generate_xml(ctx, &file_id, items).await
        }
        Command::DownloadXml { file_id, out } => {
            cli::commands::download_xml(ctx, &file_id, out).await
        }
        Command::DeleteTask { task_id } => cli::commands::delete_task(ctx, &task_id).await,
        Command::DeleteFile { file_id } => cli::commands::delete_file(ctx, &file_id).await,
        Command::SetStatus {
            task_id,
            status,
            info,
        } => cli::commands::set_status(ctx, &task_id, status, info).await,
        Command::InitConfig { .. } => Err(anyhow!("init-config is handled before loading config")),
    }
}

async fn print_notifications(mut notifications: UnboundedReceiver<Notification>) {
    while let Some(notification) = notifications.recv().await {
        let title = match notification.level {
            NotificationLevel::Success => style(notification.title.as_str()).bold().green(),
            NotificationLevel::Destructive => style(notification.title.as_str()).bold().red(),
            NotificationLevel::Info => style(notification.title.as_str()).bold().cyan(),
        };
        println!("{title}: {}", notification.description);
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}

/*
[INPUT]:  SyncContext, subcommand arguments, shutdown token
[OUTPUT]: Console output for one subcommand run
[POS]:    CLI command handlers
[UPDATE]: When adding subcommands or changing their output
*/

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use console::style;
use specwise_client::{FileRecord, Task, TaskStatus, UploadFile, UploadRequest};
use specwise_sync::{ItemSelection, SyncContext};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Seed the store, then keep polling until shutdown
pub async fn watch(ctx: &SyncContext, shutdown: CancellationToken) -> Result<()> {
    let outcome = ctx.initializer().run().await;
    info!(?outcome, "task store initialized");
    print_tasks(&ctx.store().snapshot());

    let poller = ctx.poller().start();
    let mut updates = ctx.store().subscribe();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!(pending = ctx.store().pending_count(), "task store changed");
            }
        }
    }

    poller.stop().await;
    Ok(())
}

pub async fn list_tasks(ctx: &SyncContext) -> Result<()> {
    let tasks = ctx.client().list_tasks().await.context("list tasks")?;
    print_tasks(&tasks);
    Ok(())
}

pub async fn list_files(
    ctx: &SyncContext,
    customer: Option<String>,
    task: Option<String>,
) -> Result<()> {
    let client = ctx.client();
    let response = match (task, customer) {
        (Some(task_id), _) => client.list_files_by_task(&task_id).await,
        (None, Some(customer)) => client.list_files_by_customer(&customer).await,
        (None, None) => client.list_files().await,
    }
    .context("list files")?;

    if response.files.is_empty() {
        println!("{}", style("No files").dim());
        return Ok(());
    }
    for file in &response.files {
        print_file(file);
    }
    Ok(())
}

/// Upload, then follow the new tasks until each one finishes
pub async fn upload(
    ctx: &SyncContext,
    customer_id: String,
    paths: Vec<PathBuf>,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut request = UploadRequest::new(customer_id);
    for path in &paths {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        request = request.with_file(file);
    }

    let tasks = ctx.actions().upload(&request).await?;
    print_tasks(&tasks);
    let ids: Vec<String> = tasks.into_iter().map(|task| task.id).collect();

    let poller = ctx.poller().start();
    let mut updates = ctx.store().subscribe();
    loop {
        let finished = ids.iter().all(|id| {
            ctx.store()
                .get(id)
                .is_none_or(|task| task.is_terminal())
        });
        if finished {
            break;
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    poller.stop().await;

    let tracked: Vec<Task> = ids.iter().filter_map(|id| ctx.store().get(id)).collect();
    print_tasks(&tracked);
    Ok(())
}

/// Explicit `items` replace the default high-confidence selection
pub async fn generate_xml(ctx: &SyncContext, file_id: &str, items: Vec<String>) -> Result<()> {
    let file = fetch_file(ctx, file_id).await?;
    let mut selection = ItemSelection::for_file(&file);

    if !items.is_empty() {
        selection.set_all_high_confidence(false);
        for key in &items {
            if !selection.set(key, true) {
                return Err(anyhow!("file {file_id} has no item {key:?}"));
            }
        }
    }
    println!(
        "Generating XML from {} of {} items",
        style(selection.selected_count()).bold(),
        selection.total()
    );

    let updated = ctx.actions().generate_xml(&file, &selection).await?;
    print_file(&updated);
    Ok(())
}

pub async fn download_xml(ctx: &SyncContext, file_id: &str, out: Option<PathBuf>) -> Result<()> {
    let file = fetch_file(ctx, file_id).await?;
    let dir = out.unwrap_or_else(|| ctx.config().download_dir());
    let path = ctx.actions().download_xml(&file, &dir).await?;
    println!("Saved {}", style(path.display()).cyan());
    Ok(())
}

pub async fn delete_task(ctx: &SyncContext, task_id: &str) -> Result<()> {
    ctx.actions().delete_task(task_id).await?;
    Ok(())
}

pub async fn delete_file(ctx: &SyncContext, file_id: &str) -> Result<()> {
    let file = fetch_file(ctx, file_id).await?;
    ctx.actions().delete_file(&file).await?;
    Ok(())
}

pub async fn set_status(
    ctx: &SyncContext,
    task_id: &str,
    status: TaskStatus,
    info: Option<String>,
) -> Result<()> {
    let task = ctx
        .actions()
        .set_task_status(task_id, status, info.as_deref())
        .await?;
    print_tasks(std::slice::from_ref(&task));
    Ok(())
}

async fn fetch_file(ctx: &SyncContext, file_id: &str) -> Result<FileRecord> {
    let response = ctx
        .client()
        .get_file(file_id)
        .await
        .with_context(|| format!("fetch file {file_id}"))?;
    Ok(response.file)
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("{}", style("No tasks").dim());
        return;
    }
    for task in tasks {
        let created = task
            .created_at_utc()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:<38} {:<12} {:<16} {}",
            task.id,
            styled_status(task.status),
            created,
            task.label()
        );
    }
}

fn styled_status(status: TaskStatus) -> console::StyledObject<&'static str> {
    let text = style(status.as_str());
    match status {
        TaskStatus::Completed => text.green(),
        TaskStatus::Failed => text.red(),
        TaskStatus::Canceled => text.dim(),
        TaskStatus::Pending | TaskStatus::InProgress | TaskStatus::Updating => text.yellow(),
    }
}

fn print_file(file: &FileRecord) {
    let xml = if file.is_xml_generated {
        style("xml").green()
    } else {
        style("-").dim()
    };
    println!(
        "{:<38} {:<32} {:<10} {:>4} items {}",
        file.id,
        file.filename,
        file.customer_number,
        file.items.len(),
        xml
    );
}

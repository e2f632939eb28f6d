//! Default command – download every URL with the live dashboard.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use vdl_core::control::RunControl;
use vdl_core::dashboard::DashboardOutput;
use vdl_core::logging::TracingSink;
use vdl_core::retry::RetryPolicy;
use vdl_core::runner::{DownloaderCommand, JobContext, JobOptions};
use vdl_core::scheduler::{self, BatchOptions, BatchOutcome};
use vdl_core::sources;

use crate::cli::signal::shutdown_signal;
use crate::cli::{RunStatus, Settings, UrlSource};

fn load_urls(source: &UrlSource) -> Result<Vec<String>> {
    let urls = match source {
        UrlSource::Args(urls) => sources::from_args(urls),
        UrlSource::TextFile(path) => sources::from_text_file(path)?,
        UrlSource::CsvFile(path) => sources::from_csv_file(path)?,
    };
    Ok(urls)
}

fn batch_options(settings: &Settings, command: DownloaderCommand) -> BatchOptions {
    BatchOptions {
        threads: settings.threads,
        retry: RetryPolicy::from_config(settings.retries, &settings.retry),
        refresh_interval: settings.refresh_interval,
        output: if settings.dashboard {
            DashboardOutput::Terminal
        } else {
            DashboardOutput::Silent
        },
        job: JobContext {
            command,
            options: JobOptions::in_dir(&settings.output_dir, settings.quality, settings.audio_only),
            log: Arc::new(TracingSink),
        },
    }
}

pub async fn run_downloads(
    source: &UrlSource,
    settings: &Settings,
    log_path: Option<&Path>,
) -> Result<RunStatus> {
    let command = DownloaderCommand::from(&settings.tool);
    if let Err(e) = command.check_available().await {
        tracing::error!("{}", e);
        bail!("{e}. Install it with: pip install yt-dlp");
    }

    let urls = load_urls(source).context("read URL list")?;
    if urls.is_empty() {
        tracing::error!("No URLs found");
        bail!("no URLs found");
    }
    tracing::info!(
        threads = settings.threads,
        quality = %settings.quality,
        audio_only = settings.audio_only,
        "starting {} download(s)",
        urls.len()
    );

    let control = Arc::new(RunControl::new());
    let listener = {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match shutdown_signal().await {
                Ok(()) => control.interrupt(),
                Err(e) => tracing::warn!("interrupt handling disabled: {:#}", e),
            }
        })
    };

    let outcome =
        scheduler::run_batch(&urls, batch_options(settings, command), Arc::clone(&control)).await;
    listener.abort();

    match outcome? {
        BatchOutcome::Finished(result) => {
            if !settings.dashboard {
                println!("{}", result.summary_line());
            }
            if let Some(path) = log_path {
                println!("Check '{}' for details.", path.display());
            }
            Ok(RunStatus::Finished)
        }
        BatchOutcome::Interrupted => {
            println!("\nDownload interrupted by user");
            Ok(RunStatus::Interrupted)
        }
    }
}

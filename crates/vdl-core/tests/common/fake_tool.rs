//! Fake downloader built from `sh -c <script>` plus batch option helpers.
//!
//! Inside the script `$url` holds the last argument (the task URL).

use std::sync::Arc;
use std::time::Duration;

use vdl_core::config::Quality;
use vdl_core::dashboard::{DashboardOutput, SharedBuffer};
use vdl_core::logging::MemorySink;
use vdl_core::retry::RetryPolicy;
use vdl_core::runner::{DownloaderCommand, JobContext, JobOptions};
use vdl_core::scheduler::BatchOptions;

pub fn command(script: &str) -> DownloaderCommand {
    let script = format!("for a; do url=$a; done\n{script}");
    DownloaderCommand {
        program: "sh".into(),
        prefix_args: vec!["-c".into(), script, "fake-dl".into()],
    }
}

pub fn no_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    }
}

pub fn immediate_retries(retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts: retries + 1,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    }
}

pub struct Harness {
    pub opts: BatchOptions,
    pub log: Arc<MemorySink>,
    pub screen: SharedBuffer,
}

pub fn harness(script: &str, threads: usize, retry: RetryPolicy) -> Harness {
    let log = Arc::new(MemorySink::new());
    let screen = SharedBuffer::new();
    let opts = BatchOptions {
        threads,
        retry,
        refresh_interval: Duration::from_millis(20),
        output: DashboardOutput::Buffer(screen.clone()),
        job: JobContext {
            command: command(script),
            options: JobOptions {
                output_template: "%(title)s.%(ext)s".into(),
                quality: Quality::Best,
                audio_only: false,
            },
            log: log.clone(),
        },
    };
    Harness { opts, log, screen }
}

pub fn urls(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("https://videos.example/{i}")).collect()
}

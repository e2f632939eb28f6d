//! Live terminal dashboard.
//!
//! Redraws every task on a fixed cadence until told to stop, then prints the
//! final summary. Only reads the progress board.

mod render;

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::control::RunControl;
use crate::progress::ProgressBoard;

pub use render::{render_live, render_summary, shorten, tally};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// In-memory frame sink that can be cloned and read back.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where the dashboard and the end-of-run summary go.
#[derive(Debug, Clone, Default)]
pub enum DashboardOutput {
    #[default]
    Terminal,
    /// Discard all frames (non-interactive runs).
    Silent,
    /// Keep frames in memory.
    Buffer(SharedBuffer),
}

impl DashboardOutput {
    pub fn writer(&self) -> Box<dyn Write + Send> {
        match self {
            DashboardOutput::Terminal => Box::new(io::stdout()),
            DashboardOutput::Silent => Box::new(io::sink()),
            DashboardOutput::Buffer(buf) => Box::new(buf.clone()),
        }
    }
}

/// Redraw loop. Returns after the final summary has been written.
pub async fn run_dashboard<W: Write + Send>(
    board: Arc<ProgressBoard>,
    control: Arc<RunControl>,
    interval: Duration,
    mut out: W,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !control.is_dashboard_stopped() {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = render_live(&board.views());
                draw(&mut out, &frame);
            }
            _ = control.dashboard_stop_requested() => break,
        }
    }

    let summary = render_summary(&board.views());
    draw(&mut out, &summary);
}

fn draw<W: Write>(out: &mut W, frame: &str) {
    let res = write!(out, "{CLEAR_SCREEN}{frame}").and_then(|_| out.flush());
    if let Err(e) = res {
        tracing::debug!("dashboard write failed: {}", e);
    }
}

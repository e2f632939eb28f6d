//! Operator interrupt: Ctrl-C, plus SIGTERM and SIGHUP on unix.

use anyhow::{Context, Result};

pub(crate) async fn shutdown_signal() -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term =
            signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        let mut hup = signal(SignalKind::hangup()).context("failed to install SIGHUP handler")?;
        tokio::select! {
            res = &mut ctrl_c => res.context("failed to listen for Ctrl-C")?,
            _ = term.recv() => {},
            _ = hup.recv() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.context("failed to listen for Ctrl-C")
    }
}

//! # Process termination signals.
//!
//! Unix: `SIGINT`, `SIGTERM`, `SIGQUIT`. Elsewhere: Ctrl-C only.

/// Which signal ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Termination {
    Interrupt,
    Terminate,
    Quit,
}

impl Termination {
    pub(crate) fn as_label(self) -> &'static str {
        match self {
            Termination::Interrupt => "interrupt",
            Termination::Terminate => "terminate",
            Termination::Quit => "quit",
        }
    }
}

/// Completes on the first termination signal.
///
/// Fails only if the signal handlers cannot be installed.
#[cfg(unix)]
pub(crate) async fn termination() -> std::io::Result<Termination> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let received = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            Termination::Interrupt
        }
        _ = terminate.recv() => Termination::Terminate,
        _ = quit.recv() => Termination::Quit,
    };
    Ok(received)
}

/// Completes on the first termination signal.
///
/// Fails only if the signal handler cannot be installed.
#[cfg(not(unix))]
pub(crate) async fn termination() -> std::io::Result<Termination> {
    tokio::signal::ctrl_c().await?;
    Ok(Termination::Interrupt)
}

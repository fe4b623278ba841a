#[cfg(unix)]
use tokio::signal::unix::signal;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interrupted {
    /// SIGINT / Ctrl-C
    OsSigInt,
    /// The operator typed a line on the server's stdin
    UserInt,
}

/// [Terminator] posts stop requests to whoever holds the matching receiver.
/// It never touches sockets itself.
#[derive(Debug, Clone)]
pub struct Terminator {
    interrupt_tx: broadcast::Sender<Interrupted>,
}

impl Terminator {
    pub fn new(interrupt_tx: broadcast::Sender<Interrupted>) -> Self {
        Self { interrupt_tx }
    }

    pub fn stop(&self, interrupted: Interrupted) -> anyhow::Result<()> {
        self.interrupt_tx.send(interrupted)?;

        Ok(())
    }
}

#[cfg(unix)]
async fn terminate_by_unix_signal(terminator: Terminator) {
    let mut interrupt_signal = match signal(tokio::signal::unix::SignalKind::interrupt()) {
        Ok(interrupt_signal) => interrupt_signal,
        Err(e) => {
            warn!(error = ?e, "failed to create interrupt signal stream");
            return;
        }
    };

    interrupt_signal.recv().await;

    if let Err(e) = terminator.stop(Interrupted::OsSigInt) {
        warn!(error = ?e, "failed to send interrupt signal");
    }
}

#[cfg(not(unix))]
async fn terminate_by_ctrl_c(terminator: Terminator) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "failed to install ctrl-c handler");
        return;
    }

    if let Err(e) = terminator.stop(Interrupted::OsSigInt) {
        warn!(error = ?e, "failed to send interrupt signal");
    }
}

/// A line typed on stdin is an operator request to stop.
/// Stdin is read on a plain thread so a pending read never holds the runtime open.
pub fn terminate_by_operator_input(terminator: Terminator) {
    std::thread::spawn(move || {
        let mut line = String::new();

        match std::io::stdin().read_line(&mut line) {
            Ok(0) => debug!("stdin closed, operator input disabled"),
            Ok(_) => {
                info!("operator requested shutdown");
                if let Err(e) = terminator.stop(Interrupted::UserInt) {
                    warn!(error = ?e, "failed to send interrupt signal");
                }
            }
            Err(e) => warn!(error = ?e, "could not read operator input"),
        }
    });
}

// create a broadcast channel for retrieving the application kill signal
pub fn create_termination() -> (Terminator, broadcast::Receiver<Interrupted>) {
    let (tx, rx) = broadcast::channel(1);
    let terminator = Terminator::new(tx);

    #[cfg(unix)]
    tokio::spawn(terminate_by_unix_signal(terminator.clone()));
    #[cfg(not(unix))]
    tokio::spawn(terminate_by_ctrl_c(terminator.clone()));

    (terminator, rx)
}

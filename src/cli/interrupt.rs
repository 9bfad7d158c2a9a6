//! Ctrl-C handling around LLM work.
//!
//! Once tokio listens for SIGINT the default handler is gone for the rest of
//! the process, so every path here ends in either cancellation or exit.

use crate::refine::CancelFlag;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::warn;

/// Exit status used when the user interrupts twice.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// What to do after the interrupt watcher returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// The signal source closed; nothing to do.
    Ignore,
    /// A second interrupt arrived after cancellation was requested.
    Exit,
}

/// First interrupt cancels, second asks for exit.
///
/// `interrupted` resolves to `true` for each interrupt received and `false`
/// if the signal source fails.
pub async fn route_interrupts<F, Fut>(mut interrupted: F, cancel: CancelFlag) -> InterruptAction
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if !interrupted().await {
        return InterruptAction::Ignore;
    }
    warn!("Interrupt received, cancelling refinement (press Ctrl-C again to quit)");
    cancel.cancel();

    if interrupted().await {
        InterruptAction::Exit
    } else {
        InterruptAction::Ignore
    }
}

/// Routes Ctrl-C to a cancel flag while alive.
///
/// Dropping the guard stops cancellation routing; later interrupts exit the
/// process immediately.
pub struct InterruptGuard {
    watcher: JoinHandle<()>,
}

impl InterruptGuard {
    pub fn cancel_on_interrupt(cancel: CancelFlag) -> Self {
        let watcher = tokio::spawn(async move {
            let action =
                route_interrupts(|| async { tokio::signal::ctrl_c().await.is_ok() }, cancel).await;
            if action == InterruptAction::Exit {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        });
        Self { watcher }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.watcher.abort();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            });
        }
    }
}

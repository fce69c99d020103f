//! SIGINT/SIGTERM handling: both signals raise a shared stop flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::foundation::error::{SpecterError, SpecterResult};

/// Owns the signal listener thread. Dropping it stops listening.
#[derive(Debug)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl StopSignal {
    pub fn install() -> SpecterResult<Self> {
        let flag = Arc::new(AtomicBool::new(false));
        let mut signals = Signals::new([SIGINT, SIGTERM])
            .map_err(|e| SpecterError::validation(format!("failed to install signal handlers: {e}")))?;
        let handle = signals.handle();
        let raised = Arc::clone(&flag);
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                tracing::info!(signal, "termination signal received, stopping");
                raised.store(true, Ordering::SeqCst);
            }
        });
        Ok(Self {
            flag,
            handle,
            thread: Some(thread),
        })
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag without a signal (fatal error elsewhere).
    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Drop for StopSignal {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/shutdown.rs"]
mod tests;

use crate::errors::Cancelled;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rusqlite::InterruptHandle;

const WATCH_INTERVAL: Duration = Duration::from_millis(20);

/// Cooperative cancellation shared between a batch and whoever schedules it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(Cancelled::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Runs `f` while a watcher thread interrupts the connection's running statement once
    /// this token trips. The watcher is joined before returning.
    pub fn interrupt_on_cancel<T>(&self, handle: InterruptHandle, f: impl FnOnce() -> T) -> T {
        let done = &AtomicBool::new(false);
        std::thread::scope(|s| {
            s.spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    if self.check().is_err() {
                        handle.interrupt();
                        return;
                    }
                    std::thread::sleep(WATCH_INTERVAL);
                }
            });
            // set on unwind too, otherwise the scope would wait on the watcher forever
            let _stop = StopOnDrop(done);
            f()
        })
    }
}

struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

//! Coalesced background writes.
//!
//! Each store has a slot holding at most one queued ticket. Scheduling while a
//! ticket is queued joins it; scheduling while a write is running queues the
//! next one. The write task empties the slot before it encodes, so any
//! mutation that happened while a ticket was queued is part of that write.
//!
//! Writes normally run one at a time on the worker, but after the worker shuts
//! down they run inline and may overlap, so running writes are counted.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dotconf_core::Error;

use crate::store::{ConfigStore, StoreInner};
use crate::sync::lock;
use crate::worker::{PersistHandle, PersistJob, Ticket};

#[derive(Default)]
pub(crate) struct PersistSlot {
    queued: Option<Arc<Ticket>>,
    running: usize,
}

impl PersistSlot {
    pub(crate) fn is_pending(&self) -> bool {
        self.queued.is_some() || self.running > 0
    }
}

/// Counts of finished background writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistStats {
    pub writes: u64,
    pub failures: u64,
}

#[derive(Default)]
pub(crate) struct StatsCounters {
    writes: AtomicU64,
    failures: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn snapshot(&self) -> PersistStats {
        PersistStats {
            writes: self.writes.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
        }
    }
}

impl ConfigStore {
    /// Queue a write of the current document, or join the one already queued.
    pub fn schedule_persist(&self) -> PersistHandle {
        let ticket = {
            let mut slot = lock(&self.inner.slot);
            if let Some(ticket) = &slot.queued {
                return PersistHandle::new(self.inner.file.clone(), ticket.clone());
            }
            let ticket = Ticket::new();
            slot.queued = Some(ticket.clone());
            ticket
        };

        self.inner.worker.submit(self.inner.clone());
        PersistHandle::new(self.inner.file.clone(), ticket)
    }

    /// True while a write is queued or running.
    pub fn is_persist_pending(&self) -> bool {
        lock(&self.inner.slot).is_pending()
    }
}

impl PersistJob for StoreInner {
    fn run(&self) {
        let ticket = {
            let mut slot = lock(&self.slot);
            slot.running += 1;
            slot.queued.take()
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.write_to_disk()))
            .unwrap_or_else(|_| {
                Err(Error::Other {
                    message: "write task panicked".to_string(),
                })
            });

        {
            let mut slot = lock(&self.slot);
            slot.running = slot.running.saturating_sub(1);
        }

        match &result {
            Ok(()) => {
                self.stats.writes.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::SeqCst);
                log::error!("failed to save {}: {}", self.file.display(), e);
            }
        }

        if let Some(ticket) = ticket {
            ticket.complete(result);
        }
    }

    fn describe(&self) -> String {
        self.file.display().to_string()
    }
}

impl StoreInner {
    fn write_to_disk(&self) -> Result<(), Error> {
        let _file_guard = lock(&self.file_lock);

        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let text = self.save_to_string()?;

        if !self.file.exists() {
            log::info!("creating empty config {}", self.file.display());
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.file)
            .map_err(|e| Error::io(&self.file, e))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| Error::io(&self.file, e))?;

        log::debug!("wrote {} bytes to {}", text.len(), self.file.display());
        Ok(())
    }
}

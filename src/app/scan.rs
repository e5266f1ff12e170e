use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::vault::{VaultSnapshot, scan_vault};

pub(super) type ScanResult = Result<VaultSnapshot, String>;

pub(super) enum ScanPoll {
    Idle,
    Pending,
    Finished(ScanResult),
}

struct PendingScan {
    generation: u64,
    rx: Receiver<(u64, ScanResult)>,
}

/// Runs vault scans on a worker thread, one at a time.
///
/// Each scan is tagged with a generation; starting a new scan supersedes the
/// previous one and its result is dropped when it arrives.
pub(super) struct VaultScanner {
    vault_path: PathBuf,
    generation: u64,
    pending: Option<PendingScan>,
}

impl VaultScanner {
    pub(super) fn new(vault_path: PathBuf) -> Self {
        Self {
            vault_path,
            generation: 0,
            pending: None,
        }
    }

    pub(super) fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    /// Points the scanner at another vault and starts scanning it.
    pub(super) fn open(&mut self, vault_path: PathBuf) -> u64 {
        log::info!("switching vault to {}", vault_path.display());
        self.vault_path = vault_path;
        self.start()
    }

    pub(super) fn is_scanning(&self) -> bool {
        self.pending.is_some()
    }

    pub(super) fn start(&mut self) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let (tx, rx) = mpsc::channel();
        let vault_path = self.vault_path.clone();

        thread::spawn(move || {
            let result = scan_vault(&vault_path).map_err(|error| format!("{error:#}"));
            // The receiver is gone when the scan was superseded.
            let _ = tx.send((generation, result));
        });

        log::debug!("started vault scan #{generation}");
        self.pending = Some(PendingScan { generation, rx });
        generation
    }

    pub(super) fn poll(&mut self) -> ScanPoll {
        let Some(pending) = self.pending.take() else {
            return ScanPoll::Idle;
        };

        match pending.rx.try_recv() {
            Ok((generation, result)) if generation == pending.generation => {
                ScanPoll::Finished(result)
            }
            Ok((generation, _)) => {
                log::debug!("dropping stale vault scan #{generation}");
                self.pending = Some(pending);
                ScanPoll::Pending
            }
            Err(TryRecvError::Empty) => {
                self.pending = Some(pending);
                ScanPoll::Pending
            }
            Err(TryRecvError::Disconnected) => {
                ScanPoll::Finished(Err("vault scan worker disconnected".to_owned()))
            }
        }
    }
}

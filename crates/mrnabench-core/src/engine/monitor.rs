use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;
use sysinfo::{Pid, ProcessStatus, System};
use tracing::trace;

/// Polls the resident memory of one process at a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct MemorySampler {
    interval: Duration,
}

impl MemorySampler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Samples `pid` until it disappears or `stop` fires, returning every reading in bytes.
    ///
    /// The first reading is taken one interval after the call, so a process that exits
    /// sooner yields no samples. A process that vanishes between polls ends the loop
    /// normally.
    pub fn sample(&self, pid: u32, stop: Receiver<()>) -> Vec<u64> {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        let mut samples = Vec::new();
        loop {
            match stop.recv_timeout(self.interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
            if !system.refresh_process(pid) {
                trace!(%pid, "Process is gone; stopping memory sampler.");
                break;
            }
            match system.process(pid) {
                Some(process) if process.status() != ProcessStatus::Zombie => {
                    samples.push(process.memory());
                }
                _ => {
                    trace!(%pid, "Process has exited; stopping memory sampler.");
                    break;
                }
            }
        }
        trace!(%pid, samples = samples.len(), "Memory sampler finished.");
        samples
    }
}

/// Largest reading, or `None` when nothing was sampled.
pub fn peak(samples: &[u64]) -> Option<u64> {
    samples.iter().copied().max()
}

//! [`Pooler`]: the parent process that spawns, supervises, and balances a
//! set of worker processes (§4.4).

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use gemforge_postgres::{QueueStatus, QueueStore};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::ipc::{self, Message};
use crate::{PoolError, PoolResult};

/// How long [`Pooler::stop_worker`] waits for a `Stop` ack before giving up
/// and moving on to the join wait (§4.4).
const STOP_ACK_TIMEOUT: Duration = Duration::from_secs(5);
/// How long [`Pooler::stop_worker`] waits for the process to exit after an
/// ack, before force-killing it (§4.4).
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);
/// Default balance/reap tick period (§4.4: "default 0.01 s").
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(10);
/// Default staleness threshold for the reaper (DESIGN.md OQ-1): a claim
/// whose worker hasn't heartbeat in this long is assumed dead.
pub const DEFAULT_REAP_AFTER_SECS: i64 = 30;

/// Tunables for [`Pooler`].
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub min_workers: usize,
    pub max_workers: usize,
    pub tick_rate: Duration,
    pub reap_after_secs: i64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_workers: 1,
            max_workers: 4,
            tick_rate: DEFAULT_TICK_RATE,
            reap_after_secs: DEFAULT_REAP_AFTER_SECS,
        }
    }
}

/// The outcome of evaluating the balancing algorithm against a snapshot of
/// pool size and queue status (§4.4). Pure and side-effect free so it can
/// be unit-tested without spawning real processes (S6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceDecision {
    /// `worker_count < min_workers`: spawn this many to reach the floor.
    GrowToMin(usize),
    /// High pending ratio and load, under the ceiling: spawn one worker.
    Grow,
    /// Low pending ratio and load, above the floor: stop one worker.
    Shrink,
    /// None of the above conditions hold.
    NoChange,
}

impl BalanceDecision {
    /// Evaluates the four-branch balancing algorithm from §4.4, in the
    /// stated order.
    pub fn evaluate(
        worker_count: usize,
        min_workers: usize,
        max_workers: usize,
        status: QueueStatus,
    ) -> Self {
        if worker_count < min_workers {
            return BalanceDecision::GrowToMin(min_workers - worker_count);
        }

        let load = if worker_count == 0 {
            0.0
        } else {
            status.in_progress as f64 / worker_count as f64
        };
        let ratio = status.pending_ratio();

        if ratio > 0.25 && load >= 0.8 && worker_count < max_workers {
            BalanceDecision::Grow
        } else if ratio < 0.01 && load <= 0.5 && worker_count > min_workers {
            BalanceDecision::Shrink
        } else {
            BalanceDecision::NoChange
        }
    }
}

struct WorkerHandle {
    id: String,
    child: Child,
    outbound: FramedWrite<ChildStdin, LengthDelimitedCodec>,
    inbound: FramedRead<ChildStdout, LengthDelimitedCodec>,
}

/// Spawns, supervises, and balances a pool of worker processes.
///
/// Generic over a `command_factory` rather than owning process-spawn
/// details directly: the caller (the CLI binary) knows how to re-exec
/// itself into worker mode with the right database/config wiring (§9
/// "Dynamic plugin loading" / SPEC_FULL.md §4.4).
pub struct Pooler {
    command_factory: Arc<dyn Fn(&str) -> Command + Send + Sync>,
    queue: QueueStore,
    config: PoolConfig,
    workers: Vec<WorkerHandle>,
    worker_seq: u64,
    size_gauge: Option<Arc<AtomicUsize>>,
}

impl Pooler {
    pub fn new(
        queue: QueueStore,
        config: PoolConfig,
        command_factory: Arc<dyn Fn(&str) -> Command + Send + Sync>,
    ) -> Self {
        Self {
            command_factory,
            queue,
            config,
            workers: Vec::new(),
            worker_seq: 0,
            size_gauge: None,
        }
    }

    /// Publishes `worker_count()` into `gauge` after every tick, so an
    /// observer outside the run loop (e.g. a debug shell) can read the
    /// pool size without needing mutable access to the `Pooler` itself.
    pub fn with_size_gauge(mut self, gauge: Arc<AtomicUsize>) -> Self {
        self.size_gauge = Some(gauge);
        self
    }

    /// Current pool size.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn publish_size(&self) {
        if let Some(gauge) = &self.size_gauge {
            gauge.store(self.workers.len(), Ordering::Relaxed);
        }
    }

    /// Spawns `min_workers`, then ticks `clean_up_dead_workers`,
    /// `reap_stale`, and `balance_workers` at `tick_rate` while `running`
    /// stays set, then stops every remaining worker (§4.4 `start()`).
    ///
    /// `running` uses the same sense as the scheduler crate's `SchedulerRunner`
    /// flag of the same name: `true` means "keep going", cleared to signal
    /// shutdown — the two run loops are meant to share one flag.
    pub async fn run(&mut self, running: Arc<AtomicBool>) -> PoolResult<()> {
        while self.workers.len() < self.config.min_workers {
            self.spawn_worker().await?;
        }
        self.publish_size();

        while running.load(Ordering::SeqCst) {
            tokio::time::sleep(self.config.tick_rate).await;
            self.clean_up_dead_workers();

            if let Err(err) = self.reap_stale().await {
                tracing::error!(%err, "reap_stale failed, suppressing (§7)");
            }
            if let Err(err) = self.balance_workers().await {
                tracing::error!(%err, "balance_workers failed, suppressing (§7)");
            }
            self.publish_size();
        }

        self.stop_all().await;
        Ok(())
    }

    /// Spawns one worker process and adds it to the pool.
    pub async fn spawn_worker(&mut self) -> PoolResult<()> {
        let id = format!("worker-{}", self.worker_seq);
        self.worker_seq += 1;

        let mut command = (self.command_factory)(&id);
        command.stdin(Stdio::piped()).stdout(Stdio::piped());

        let mut child = command.spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ipc_setup_error(&id, "missing stdin handle"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ipc_setup_error(&id, "missing stdout handle"))?;

        tracing::info!(worker_id = %id, "spawned worker process");
        self.workers.push(WorkerHandle {
            id,
            child,
            outbound: ipc::writer(stdin),
            inbound: ipc::reader(stdout),
        });
        Ok(())
    }

    /// Drops workers whose process object reports not-alive (§4.4
    /// `clean_up_dead_workers()`).
    pub fn clean_up_dead_workers(&mut self) {
        self.workers.retain_mut(|worker| match worker.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                tracing::warn!(worker_id = %worker.id, %status, "worker process exited unexpectedly");
                false
            }
            Err(err) => {
                tracing::warn!(worker_id = %worker.id, %err, "failed to poll worker liveness");
                true
            }
        });
    }

    /// Requeues or fails every stale `IN_PROGRESS` claim (DESIGN.md OQ-1,
    /// §8 S2).
    pub async fn reap_stale(&self) -> PoolResult<usize> {
        let stale = self.queue.stale_claims(self.config.reap_after_secs).await?;
        let mut reaped = 0usize;

        for row in stale {
            tracing::warn!(job_id = %row.id, claimed_by = ?row.claimed_by, "reaping stale claim");
            let new_count = self.queue.increment_retries(row.id).await?;
            if new_count <= gemforge_jobs::DEFAULT_MAX_RETRIES {
                self.queue.mark_pending(row.id).await?;
            } else {
                self.queue.mark_failed(row.id).await?;
            }
            reaped += 1;
        }
        Ok(reaped)
    }

    /// Evaluates [`BalanceDecision`] against the current pool size and
    /// queue status, and acts on it.
    pub async fn balance_workers(&mut self) -> PoolResult<()> {
        let status = self.queue.status().await?;
        let decision = BalanceDecision::evaluate(
            self.workers.len(),
            self.config.min_workers,
            self.config.max_workers,
            status,
        );

        match decision {
            BalanceDecision::GrowToMin(n) => {
                for _ in 0..n {
                    self.spawn_worker().await?;
                }
            }
            BalanceDecision::Grow => self.spawn_worker().await?,
            BalanceDecision::Shrink => {
                if let Some(id) = self.workers.first().map(|w| w.id.clone()) {
                    self.stop_worker(&id).await?;
                }
            }
            BalanceDecision::NoChange => {}
        }
        Ok(())
    }

    /// Sends `Stop`, waits up to 5s for an ack, then up to 5s more for the
    /// process to exit; force-kills past that. Removes the worker from the
    /// pool in every case (§4.4 `stop_worker()`).
    pub async fn stop_worker(&mut self, id: &str) -> PoolResult<()> {
        let Some(index) = self.workers.iter().position(|w| w.id == id) else {
            return Ok(());
        };
        let mut worker = self.workers.remove(index);

        let stopped = self.send_stop_and_await_ack(&mut worker).await;

        let result = if stopped {
            match tokio::time::timeout(STOP_JOIN_TIMEOUT, worker.child.wait()).await {
                Ok(Ok(_)) => Ok(()),
                _ => force_kill(&mut worker).await,
            }
        } else {
            force_kill(&mut worker).await
        };

        if let Err(err) = &result {
            tracing::error!(worker_id = %worker.id, %err, "worker refused to shut down");
        }
        result
    }

    async fn send_stop_and_await_ack(&self, worker: &mut WorkerHandle) -> bool {
        let Ok(bytes) = ipc::encode(&Message::Stop) else {
            return false;
        };
        if worker.outbound.send(bytes).await.is_err() {
            return false;
        }

        let wait_ack = async {
            while let Some(Ok(frame)) = worker.inbound.next().await {
                if let Ok(Message::Ack { tag, ok }) = ipc::decode(frame) {
                    if tag == "stop" {
                        return ok;
                    }
                }
            }
            false
        };

        tokio::time::timeout(STOP_ACK_TIMEOUT, wait_ack)
            .await
            .unwrap_or(false)
    }

    async fn stop_all(&mut self) {
        let ids: Vec<String> = self.workers.iter().map(|w| w.id.clone()).collect();
        for id in ids {
            if let Err(err) = self.stop_worker(&id).await {
                tracing::error!(%err, "failed to stop worker during shutdown");
            }
        }
    }
}

async fn force_kill(worker: &mut WorkerHandle) -> PoolResult<()> {
    worker.child.kill().await.map_err(|err| PoolError::WorkerShutdownError {
        worker_id: worker.id.clone(),
        message: err.to_string(),
    })
}

fn ipc_setup_error(worker_id: &str, message: &str) -> PoolError {
    PoolError::Ipc {
        worker_id: worker_id.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(pending: u64, in_progress: u64) -> QueueStatus {
        // QueueStatus's fields are crate-public in gemforge_postgres; the
        // constructor isn't exposed, so tests build it via the same shape
        // `status()` returns.
        QueueStatus { pending, in_progress }
    }

    #[test]
    fn grows_to_min_below_floor() {
        let decision = BalanceDecision::evaluate(1, 3, 8, status(0, 0));
        assert_eq!(decision, BalanceDecision::GrowToMin(2));
    }

    #[test]
    fn s6_first_tick_no_change_at_full_pending_zero_in_progress() {
        let decision = BalanceDecision::evaluate(3, 3, 8, status(100, 0));
        assert_eq!(decision, BalanceDecision::NoChange);
    }

    #[test]
    fn s6_second_tick_grows_under_load() {
        let decision = BalanceDecision::evaluate(3, 3, 8, status(90, 10));
        assert_eq!(decision, BalanceDecision::Grow);
    }

    #[test]
    fn does_not_grow_past_max() {
        let decision = BalanceDecision::evaluate(8, 3, 8, status(90, 10));
        assert_eq!(decision, BalanceDecision::NoChange);
    }

    #[test]
    fn shrinks_when_mostly_idle_above_floor() {
        let decision = BalanceDecision::evaluate(5, 3, 8, status(0, 1));
        assert_eq!(decision, BalanceDecision::Shrink);
    }

    #[test]
    fn never_shrinks_below_min() {
        let decision = BalanceDecision::evaluate(3, 3, 8, status(0, 0));
        assert_eq!(decision, BalanceDecision::NoChange);
    }
}

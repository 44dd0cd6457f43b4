//! The worker process side of the pool (§4.4): a run-loop task that claims
//! and executes jobs, paired with an IPC-supervisor task that cooperatively
//! answers the pooler over the process's stdin/stdout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;
use gemforge_jobs::{RunnerContext, RunnerRegistry};
use gemforge_pipeline::PluginRegistry;
use gemforge_postgres::QueueStore;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;

use crate::ipc::{self, Message};
use crate::{PoolError, PoolResult};

/// Default sleep between empty `claim_next` polls (§4.4: "default 0.5 s").
pub const DEFAULT_IDLE_PERIOD: Duration = Duration::from_millis(500);

/// How often the IPC-supervisor task refreshes this worker's heartbeat row
/// (DESIGN.md OQ-1). Tied to the idle period so a worker under constant
/// load still heartbeats at a steady cadence.
const HEARTBEAT_PERIOD: Duration = Duration::from_secs(5);

/// Tunables for a worker's run loop.
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub idle_period: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idle_period: DEFAULT_IDLE_PERIOD,
        }
    }
}

/// State shared between the run loop and the IPC-supervisor task, both
/// running as cooperative tasks within one worker process (§5: "two
/// cooperative threads ... sharing only a small supervisor state object").
#[derive(Default)]
struct SupervisorState {
    current_job: Mutex<Option<String>>,
    running: AtomicBool,
}

/// Runs a worker process to completion: claims and executes jobs against
/// `queue` until told to stop over `ipc_in`/`ipc_out`, then returns once
/// any in-flight job has finished.
///
/// `ipc_in`/`ipc_out` are the worker process's end of the pooler's pipe
/// (typically its own stdin/stdout, piped by the parent `tokio::process
/// ::Command`).
pub async fn run(
    worker_id: String,
    queue: QueueStore,
    runners: RunnerRegistry,
    formatters: PluginRegistry,
    config: WorkerConfig,
    ipc_in: impl AsyncRead + Unpin + Send + 'static,
    ipc_out: impl AsyncWrite + Unpin + Send + 'static,
) -> PoolResult<()> {
    let state = Arc::new(SupervisorState {
        current_job: Mutex::new(None),
        running: AtomicBool::new(true),
    });

    let supervisor = tokio::spawn(supervise(
        worker_id.clone(),
        queue.clone(),
        state.clone(),
        ipc_in,
        ipc_out,
    ));

    run_loop(worker_id, queue, runners, formatters, config, state).await?;

    // Let the supervisor's last heartbeat/ack flush before the process exits.
    let _ = supervisor.await;
    Ok(())
}

async fn run_loop(
    worker_id: String,
    queue: QueueStore,
    runners: RunnerRegistry,
    formatters: PluginRegistry,
    config: WorkerConfig,
    state: Arc<SupervisorState>,
) -> PoolResult<()> {
    loop {
        let claimed = queue.claim_next(&worker_id).await?;

        let Some(claimed) = claimed else {
            if !state.running.load(Ordering::SeqCst) {
                return Ok(());
            }
            tokio::time::sleep(config.idle_period).await;
            continue;
        };

        *state.current_job.lock().await = Some(claimed.id.to_string());
        let outcome = execute(claimed.id, &queue, &runners, &formatters).await;
        *state.current_job.lock().await = None;

        if let Err(err) = outcome {
            tracing::warn!(worker_id, job_id = %claimed.id, %err, "job execution failed");
        }

        if !state.running.load(Ordering::SeqCst) {
            return Ok(());
        }
    }
}

async fn execute(
    job_id: uuid::Uuid,
    queue: &QueueStore,
    runners: &RunnerRegistry,
    formatters: &PluginRegistry,
) -> PoolResult<()> {
    let job = queue.get(job_id).await?;
    let ctx = RunnerContext::new(queue.clone(), formatters.clone());

    let mut runner = match runners.construct(job, ctx).await {
        Ok(runner) => runner,
        Err(err) => {
            // §4.3: unknown job_type is a hard error; route through the
            // same fail path a runner's own retry() would take.
            tracing::error!(%job_id, %err, "no runner registered for job_type");
            queue.mark_failed(job_id).await?;
            return Err(PoolError::Job(err));
        }
    };

    let result: gemforge_jobs::JobResult<()> = async {
        runner.setup().await?;
        runner.run().await?;
        Ok(())
    }
    .await;

    if let Err(err) = result {
        gemforge_jobs::retry(runner.as_mut(), queue, job_id).await?;
        return Err(PoolError::Job(err));
    }

    runner.cleanup().await?;
    Ok(())
}

/// The IPC-supervisor task: polls inbound frames, replies, and refreshes
/// this worker's heartbeat on a steady cadence (§4.4, DESIGN.md OQ-1).
async fn supervise(
    worker_id: String,
    queue: QueueStore,
    state: Arc<SupervisorState>,
    ipc_in: impl AsyncRead + Unpin,
    ipc_out: impl AsyncWrite + Unpin,
) {
    use futures::SinkExt;

    let mut inbound = ipc::reader(ipc_in);
    let mut outbound = ipc::writer(ipc_out);
    let mut heartbeat = tokio::time::interval(HEARTBEAT_PERIOD);

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if let Err(err) = queue.touch_heartbeat(&worker_id).await {
                    tracing::warn!(worker_id, %err, "failed to write heartbeat");
                }
            }
            frame = inbound.next() => {
                let Some(frame) = frame else { break };
                let Ok(frame) = frame else { break };
                let Ok(message) = ipc::decode(frame) else { continue };

                let reply = match message {
                    Message::Stop => {
                        state.running.store(false, Ordering::SeqCst);
                        Message::Ack { tag: "stop".to_string(), ok: true }
                    }
                    Message::Status => {
                        let current_job = state.current_job.lock().await.clone();
                        Message::StatusReply {
                            current_job,
                            running: state.running.load(Ordering::SeqCst),
                        }
                    }
                    Message::StatusReply { .. } | Message::Ack { .. } => {
                        Message::unrecognized_ack("unexpected")
                    }
                };

                if let Ok(bytes) = ipc::encode(&reply) {
                    if outbound.send(bytes).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    let _ = queue.forget_heartbeat(&worker_id).await;
}

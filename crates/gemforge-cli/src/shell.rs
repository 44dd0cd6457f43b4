//! Interactive debug shell (§6 "Debug shell"): a minimal, line-oriented
//! stdin REPL started alongside `run-pooler`/`run-config` when `--shell`
//! is passed. Deliberately thin — no line editor, no history, no
//! completion — this is an auxiliary operator surface, not a product
//! feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gemforge_postgres::QueueStore;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Runs the debug shell to completion (on `quit` or stdin EOF), reading
/// commands from `stdin` and printing responses to stdout.
///
/// - `status` — prints the queue's pending/in-progress counters.
/// - `pool` — prints the current worker pool size.
/// - `quit` — exits the shell (the rest of the process keeps running).
pub async fn run(queue: QueueStore, pool_size: Arc<AtomicUsize>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("gemforge debug shell — commands: status, pool, quit");

    loop {
        print!("> ");
        use std::io::Write;
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(%err, "debug shell stdin read failed");
                break;
            }
        };

        match line.trim() {
            "status" => match queue.status().await {
                Ok(status) => println!(
                    "pending={} in_progress={} pending_ratio={:.3}",
                    status.pending,
                    status.in_progress,
                    status.pending_ratio()
                ),
                Err(err) => println!("error: {err}"),
            },
            "pool" => println!("workers={}", pool_size.load(Ordering::Relaxed)),
            "quit" | "exit" => break,
            "" => {}
            other => println!("unrecognized command: '{other}' (try: status, pool, quit)"),
        }
    }
}

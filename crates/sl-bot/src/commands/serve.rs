use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::adapter::{Adapter, Reaction, TimerKind, Timing};
use crate::protocol::Inbound;

use super::GameArgs;

pub fn run(args: &GameArgs, timing: Timing) -> Result<(), String> {
    let registry = super::build_registry(args)?;
    let adapter = Adapter::new(registry, timing);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;
    runtime.block_on(event_loop(adapter))
}

/// Read chat events from stdin until EOF, one JSON object per line, and
/// write payloads to stdout. Timers feed back into the same loop, so every
/// session is only ever touched from here.
async fn event_loop(mut adapter: Adapter) -> Result<(), String> {
    let (timer_tx, mut timer_rx) = mpsc::unbounded_channel::<TimerKind>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    info!("Serving on stdin/stdout");
    loop {
        let reaction = tokio::select! {
            line = lines.next_line() => {
                match line.map_err(|e| format!("failed to read stdin: {e}"))? {
                    Some(line) => dispatch(&mut adapter, &line),
                    None => break,
                }
            }
            Some(kind) = timer_rx.recv() => adapter.on_timer(kind),
        };

        for timer in reaction.timers {
            let tx = timer_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timer.after).await;
                // The loop may have exited already.
                let _ = tx.send(timer.kind);
            });
        }

        for payload in &reaction.payloads {
            let mut line = payload
                .to_line()
                .map_err(|e| format!("failed to encode payload: {e}"))?;
            line.push('\n');
            stdout
                .write_all(line.as_bytes())
                .await
                .map_err(|e| format!("failed to write stdout: {e}"))?;
        }
        stdout
            .flush()
            .await
            .map_err(|e| format!("failed to write stdout: {e}"))?;
    }

    info!(
        "Input closed with {} live session(s), {} finished",
        adapter.registry().len(),
        adapter.registry().finished_count()
    );
    Ok(())
}

fn dispatch(adapter: &mut Adapter, line: &str) -> Reaction {
    let line = line.trim();
    if line.is_empty() {
        return Reaction::default();
    }
    match Inbound::parse(line) {
        Ok(inbound) => adapter.handle(inbound),
        Err(e) => {
            warn!("Skipping malformed input line: {e}");
            Reaction::default()
        }
    }
}

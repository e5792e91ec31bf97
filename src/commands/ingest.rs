// Ingest command - replay an engine event stream through the execution listener

use anyhow::{Context, Result};
use futures::stream::StreamExt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::cli::args::IngestArgs;
use crate::cli::{Cli, ProgressMode, render_formats};
use crate::config::{Config, ReportPaths};
use crate::listener::{EngineEvent, ExecutionListener, Handled, Phase};
use crate::report::{ConsoleReporter, DataReportWriter, Status, StreamingJsonReporter};

/// Outcome of an ingest, used for the exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestOutcome {
    pub recorded: usize,
    pub rejected: usize,
    pub unsuccessful: usize,
}

impl IngestOutcome {
    pub fn all_passed(&self) -> bool {
        self.rejected == 0 && self.unsuccessful == 0
    }
}

/// Parse NDJSON events; blank lines and `//` comments are skipped
pub fn parse_events(content: &str) -> Result<Vec<EngineEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("//")
        })
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid event on line {}", idx + 1))
        })
        .collect()
}

fn read_events(path: &Path) -> Result<Vec<EngineEvent>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read events from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read events file: {}", path.display()))?
    };
    parse_events(&content)
}

pub async fn handle_ingest(
    cli: &Cli,
    args: &IngestArgs,
    config: &Config,
    paths: &ReportPaths,
) -> Result<IngestOutcome> {
    let events = read_events(&args.events)?;
    let parallel_jobs = args.parallel_jobs();
    info!(
        "Ingesting {} event(s) into {} (base directory from {}, jobs: {})",
        events.len(),
        paths.data.display(),
        paths.source,
        parallel_jobs
    );

    let formats = if args.format.is_empty() {
        render_formats(&config.report.formats)
    } else {
        render_formats(&args.format)
    };

    let expected = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::CaseFinished { .. }))
        .count() as u64;

    let mut listener = ExecutionListener::new(DataReportWriter::from_paths(paths));
    if args.stream {
        listener = listener.with_reporter(Arc::new(StreamingJsonReporter::new()));
    } else {
        let mode = if config.report.console {
            cli.progress_mode(&args.progress)
        } else {
            ProgressMode::None
        };
        listener = listener.with_reporter(Arc::new(ConsoleReporter::new(mode, Some(expected))));
    }
    for reporter in super::file_reporters(&formats, &paths.report) {
        listener = listener.with_reporter(reporter);
    }
    let listener = Arc::new(listener);

    let replay = replay(Arc::clone(&listener), events, parallel_jobs);
    let outcome = if args.timeout > 0 {
        match tokio::time::timeout(Duration::from_secs(args.timeout), replay).await {
            Ok(outcome) => outcome?,
            Err(_) => {
                if args.flush_partial {
                    let listener = Arc::clone(&listener);
                    let report = tokio::task::spawn_blocking(move || listener.flush_partial())
                        .await
                        .context("Partial flush task panicked")??;
                    warn!(
                        "Partial report with {} test(s) written to {}",
                        report.index.summary.tests,
                        paths.data.display()
                    );
                }
                anyhow::bail!("Run timed out after {}s", args.timeout);
            }
        }
    } else {
        replay.await?
    };

    Ok(outcome)
}

/// Feed events to the listener in order; consecutive case events fan out to
/// up to `parallel_jobs` blocking workers.
async fn replay(
    listener: Arc<ExecutionListener>,
    events: Vec<EngineEvent>,
    parallel_jobs: usize,
) -> Result<IngestOutcome> {
    let mut outcome = IngestOutcome::default();
    let mut batch = Vec::new();

    for event in events {
        if matches!(event, EngineEvent::CaseFinished { .. }) {
            batch.push(event);
            continue;
        }
        record_cases(&listener, std::mem::take(&mut batch), parallel_jobs, &mut outcome).await;
        if matches!(event, EngineEvent::RunStarted { .. }) && listener.phase() == Phase::Persisted {
            info!("New run in the event stream; resetting after the persisted run");
            listener.reset();
        }
        dispatch(&listener, event).await?;
    }
    record_cases(&listener, batch, parallel_jobs, &mut outcome).await;

    if listener.phase() == Phase::Accumulating {
        warn!("Event stream ended without runFinished; finishing the run");
        dispatch(&listener, EngineEvent::RunFinished { run_id: None }).await?;
    }

    Ok(outcome)
}

async fn dispatch(listener: &Arc<ExecutionListener>, event: EngineEvent) -> Result<Handled> {
    let listener = Arc::clone(listener);
    let name = event.name();
    let handled = tokio::task::spawn_blocking(move || listener.handle(event))
        .await
        .context("Listener task panicked")?
        .with_context(|| format!("Failed to handle {} event", name))?;
    Ok(handled)
}

async fn record_cases(
    listener: &Arc<ExecutionListener>,
    batch: Vec<EngineEvent>,
    parallel_jobs: usize,
    outcome: &mut IngestOutcome,
) {
    if batch.is_empty() {
        return;
    }

    let results: Vec<_> = futures::stream::iter(batch)
        .map(|event| {
            let listener = Arc::clone(listener);
            tokio::task::spawn_blocking(move || listener.handle(event))
        })
        .buffer_unordered(parallel_jobs)
        .collect()
        .await;

    for result in results {
        match result {
            Ok(Ok(Handled::CaseRecorded(status))) => {
                outcome.recorded += 1;
                if matches!(status, Status::Failed | Status::Aborted) {
                    outcome.unsuccessful += 1;
                }
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                error!("Rejected case event: {}", e);
                outcome.rejected += 1;
            }
            Err(e) => {
                error!("Case worker panicked: {}", e);
                outcome.rejected += 1;
            }
        }
    }
}

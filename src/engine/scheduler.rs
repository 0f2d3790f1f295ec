//! Run orchestration
//!
//! One blocking reader task batches the source into chunks and hands them to
//! the dispatcher over a bounded channel. The dispatcher runs each chunk on
//! the blocking pool, holding a semaphore permit for the life of the worker,
//! so at most `workers` chunks are being aggregated at once and the reader
//! stays at most `workers` chunks ahead. Partials are folded in chunk order
//! as they complete, and the result table is derived once the last one is in.
//!
//! A permit is released when its worker returns, not when its partial is
//! folded, so a slow chunk lets finished partials pile up behind it. Before
//! each dispatch the dispatcher waits on running workers while `workers`
//! partials are already held back, which keeps the held partials below
//! twice the worker count.

use super::batch::{Batcher, Chunk};
use super::merge::OrderedMerger;
use super::source::LineSource;
use super::worker::process_chunk;
use super::EngineError;
use crate::config::EngineConfig;
use crate::query::{derive, Aggregate, AggregationSpec, LineStats, ResultTable};
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use futures::FutureExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    /// Chunks are still being read and handed to workers
    Dispatching,
    /// Input exhausted; waiting on the remaining workers
    Collecting,
    Deriving,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Dispatching => "dispatching",
            RunPhase::Collecting => "collecting",
            RunPhase::Deriving => "deriving",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Counters describing a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub chunks: usize,
    pub workers: usize,
    pub lines: LineStats,
    pub elapsed_secs: f64,
}

/// Result of one query run
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub table: ResultTable,
    pub stats: RunStats,
}

/// Chunked parallel aggregation engine
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `spec` over every line of `source`
    pub async fn run(
        &self,
        spec: Arc<AggregationSpec>,
        source: LineSource,
    ) -> Result<QueryOutput, EngineError> {
        let started = Instant::now();
        let workers = self.config.workers;
        let parser = self.config.parser;
        let label = source.label().to_string();
        let mut phase = RunPhase::Idle;

        info!(
            "Running query '{}' over {} (chunk size {}, {} workers, {} parser)",
            spec.name, label, self.config.chunk_size, workers, parser
        );

        let batcher = Batcher::new(source, self.config.chunk_size)?;
        let (tx, mut rx) = mpsc::channel::<io::Result<Chunk>>(workers);
        let reader = tokio::task::spawn_blocking(move || {
            for item in batcher {
                let failed = item.is_err();
                // Receiver gone means the run was abandoned
                if tx.blocking_send(item).is_err() || failed {
                    break;
                }
            }
        });

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut in_flight = FuturesUnordered::new();
        let mut merger = OrderedMerger::new();
        let progress = progress_bar(self.config.progress);
        let mut lines_read: u64 = 0;

        advance(&mut phase, RunPhase::Dispatching);
        while let Some(item) = rx.recv().await {
            let chunk = item.map_err(|source| EngineError::SourceRead {
                source_label: label.clone(),
                lines_read,
                source,
            })?;
            lines_read += chunk.len() as u64;
            let seq = chunk.seq;

            relieve_backlog(&mut merger, &mut in_flight, &progress, workers).await?;
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| EngineError::WorkerFailed {
                    seq,
                    reason: e.to_string(),
                })?;
            let spec = Arc::clone(&spec);
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                process_chunk(chunk, &spec, parser)
            });
            in_flight.push(async move { (seq, handle.await) });
            debug!("Dispatched chunk {} ({} in flight)", seq, in_flight.len());

            while let Some(Some((seq, joined))) = in_flight.next().now_or_never() {
                absorb(&mut merger, &progress, seq, joined)?;
            }
        }

        advance(&mut phase, RunPhase::Collecting);
        while let Some((seq, joined)) = in_flight.next().await {
            absorb(&mut merger, &progress, seq, joined)?;
        }

        reader.await.map_err(|e| EngineError::ReaderFailed {
            reason: e.to_string(),
        })?;
        progress.finish_and_clear();

        advance(&mut phase, RunPhase::Deriving);
        let chunks = merger.merged_chunks();
        let aggregate = merger.finish()?;
        let lines = aggregate.stats;
        let table = derive(&spec, aggregate)?;
        advance(&mut phase, RunPhase::Done);

        if lines.skipped > 0 {
            warn!(
                "{} of {} lines could not be read for query '{}' and were skipped",
                lines.skipped, lines.lines, spec.name
            );
        }

        let stats = RunStats {
            chunks,
            workers,
            lines,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        info!(
            "Query '{}' finished: {} chunks, {} lines, {} matched, {} groups in {:.2}s",
            spec.name,
            stats.chunks,
            lines.lines,
            lines.matched,
            table.rows.len(),
            stats.elapsed_secs
        );

        Ok(QueryOutput { table, stats })
    }
}

fn advance(phase: &mut RunPhase, next: RunPhase) {
    debug!("Run phase {} -> {}", phase, next);
    *phase = next;
}

fn absorb(
    merger: &mut OrderedMerger,
    progress: &ProgressBar,
    seq: usize,
    joined: Result<Aggregate, JoinError>,
) -> Result<(), EngineError> {
    let partial = joined.map_err(|e| EngineError::WorkerFailed {
        seq,
        reason: e.to_string(),
    })?;
    let folded = merger.accept(seq, partial);
    progress.inc(folded as u64);
    Ok(())
}

/// Fold finished partials until fewer than `limit` wait on an earlier chunk.
/// That chunk is always still in flight, so this ends once it lands.
async fn relieve_backlog<S>(
    merger: &mut OrderedMerger,
    in_flight: &mut S,
    progress: &ProgressBar,
    limit: usize,
) -> Result<(), EngineError>
where
    S: Stream<Item = (usize, Result<Aggregate, JoinError>)> + Unpin,
{
    if merger.pending() >= limit {
        debug!(
            "{} partials held behind chunk {}; waiting before dispatching more",
            merger.pending(),
            merger.next_seq()
        );
    }
    while merger.pending() >= limit {
        match in_flight.next().await {
            Some((seq, joined)) => absorb(merger, progress, seq, joined)?,
            None => break,
        }
    }
    Ok(())
}

fn progress_bar(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {pos} chunks merged [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

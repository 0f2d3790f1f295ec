//! Sequence-ordered merging of partial aggregates
//!
//! Partials may finish in any order. Folding them in chunk order keeps the
//! floating-point sums identical across runs and worker counts.
//!
//! The merger itself does not bound how many partials it holds back; the
//! scheduler stops dispatching while that count reaches its worker limit.

use super::EngineError;
use crate::query::Aggregate;
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Default)]
pub struct OrderedMerger {
    next_seq: usize,
    pending: BTreeMap<usize, Aggregate>,
    global: Aggregate,
    merged_chunks: usize,
}

impl OrderedMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the partial of chunk `seq`, folding every chunk that is now
    /// contiguous with what has already been merged. Returns how many chunks
    /// were folded by this call.
    pub fn accept(&mut self, seq: usize, partial: Aggregate) -> usize {
        if seq < self.next_seq || self.pending.contains_key(&seq) {
            trace!("Ignoring duplicate partial for chunk {}", seq);
            return 0;
        }
        self.pending.insert(seq, partial);

        let mut folded = 0;
        while let Some(next) = self.pending.remove(&self.next_seq) {
            self.global.merge(next);
            self.next_seq += 1;
            self.merged_chunks += 1;
            folded += 1;
        }
        if !self.pending.is_empty() {
            trace!(
                "Holding {} partials until chunk {} arrives",
                self.pending.len(),
                self.next_seq
            );
        }
        folded
    }

    pub fn merged_chunks(&self) -> usize {
        self.merged_chunks
    }

    /// The chunk the merger is waiting on
    pub fn next_seq(&self) -> usize {
        self.next_seq
    }

    /// Partials waiting for an earlier chunk
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// The global aggregate, provided no gap remains
    pub fn finish(self) -> Result<Aggregate, EngineError> {
        if !self.pending.is_empty() {
            return Err(EngineError::MissingChunk { seq: self.next_seq });
        }
        Ok(self.global)
    }
}

//! Fixed-size, order-preserving batching of input lines

use super::EngineError;
use crate::config::ConfigError;
use std::io;

/// Upper bound on the lines reserved up front for a chunk
const PREALLOCATE_LINES: usize = 4096;

/// A run of consecutive input lines, the unit of parallel work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position of this chunk in the input
    pub seq: usize,
    pub lines: Vec<String>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Lazily groups a line source into [`Chunk`]s of `chunk_size` lines
///
/// Every line lands in exactly one chunk, in order; only the last chunk may
/// be short. A read error is yielded once and ends the sequence.
#[derive(Debug)]
pub struct Batcher<I> {
    lines: I,
    chunk_size: usize,
    next_seq: usize,
    finished: bool,
}

impl<I> Batcher<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I, chunk_size: usize) -> Result<Self, EngineError> {
        if chunk_size == 0 {
            return Err(ConfigError::invalid("chunk_size", "must be at least 1").into());
        }
        Ok(Self {
            lines,
            chunk_size,
            next_seq: 0,
            finished: false,
        })
    }
}

impl<I> Iterator for Batcher<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut lines = Vec::with_capacity(self.chunk_size.min(PREALLOCATE_LINES));
        while lines.len() < self.chunk_size {
            match self.lines.next() {
                Some(Ok(line)) => lines.push(line),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    break;
                }
            }
        }

        if lines.is_empty() {
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        Some(Ok(Chunk { seq, lines }))
    }
}

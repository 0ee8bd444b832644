use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// The full partition of a document into page ranges. Ranges tile
/// `[0, page_count)` without gaps or overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPlan {
    pub page_count: usize,
    pub chunks: Vec<PageRange>,
}

/// A contiguous 0-based half-open page range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl ChunkPlan {
    /// A zero chunk size falls back to the default rather than erroring;
    /// callers at the boundary pass through whatever they were given.
    pub fn with_chunk_size(page_count: usize, chunk_size: usize) -> ChunkPlan {
        let step = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };

        let chunks = (0..page_count)
            .step_by(step)
            .map(|start| PageRange {
                start,
                end: (start + step).min(page_count),
            })
            .collect();

        ChunkPlan { page_count, chunks }
    }
}

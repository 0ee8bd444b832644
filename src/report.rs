use crate::probe::ProbeInput;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub input: ProbeInput,
    pub chunk_reports: Vec<ChunkReport>,
}

/// Per-chunk summary kept alongside the document result for auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkReport {
    pub chunk_index: usize,
    pub start_page: usize,
    pub end_page: usize,
    pub pages_processed: usize,
    pub suspicious_pages: usize,
    pub max_suspicion_score: f64,
}

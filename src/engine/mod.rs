pub mod json;
pub mod types;

use crate::chunk_plan::PageRange;
use anyhow::Result;
use std::path::Path;

pub use types::{ExtractOut, ExtractorDiag, PageText, ProbeOut};

/// The page-text collaborator. The orchestrator treats `extract_pages` as
/// an opaque call that may fail; any failure aborts the whole document scan.
///
/// Implementations must be `Sync`: one extractor instance serves all chunk
/// tasks concurrently.
pub trait Extractor: Sync {
    fn doctor(&self) -> Result<ExtractorDiag>;

    /// Priming call: page count only, used once to derive the chunk plan.
    fn probe(&self, input: &Path) -> Result<ProbeOut>;

    /// Supply raw page content for one page range.
    fn extract_pages(&self, input: &Path, range: &PageRange) -> Result<ExtractOut>;
}

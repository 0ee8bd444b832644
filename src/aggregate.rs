use crate::chunk::{ChunkResult, PageResult};
use crate::config::Aggregation;
use crate::util::round2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Document-level suspicion summary, recomputed fully on every merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub suspicious_pages: usize,
    pub average_suspicion_score: f64,
    pub max_suspicion_score: f64,
    pub all_suspicion_reasons: Vec<String>,
    pub overall_suspicious: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub total_pages: usize,
    pub processed_pages: usize,
    pub extracted_content: Vec<PageResult>,
    pub document_metadata: BTreeMap<String, String>,
    pub document_analysis: DocumentAnalysis,
}

/// Merge chunk results into one document result. Chunk arrival order must
/// not affect the output: pages are re-sorted by page number and the
/// analysis is a pure function of the merged pages.
pub fn merge(cfg: &Aggregation, chunks: Vec<ChunkResult>) -> DocumentResult {
    let mut total_pages = 0usize;
    let mut processed_pages = 0usize;
    let mut pages: Vec<PageResult> = Vec::new();
    let mut metadata: BTreeMap<String, String> = BTreeMap::new();

    for chunk in chunks {
        // Guard against a chunk misreporting the document size.
        total_pages = total_pages.max(chunk.total_pages);
        processed_pages += chunk.processed_pages;

        // Richest metadata fragment wins; first seen breaks ties.
        if chunk.document_metadata.len() > metadata.len() {
            metadata = chunk.document_metadata;
        }

        pages.extend(chunk.extracted_content);
    }

    pages.sort_by_key(|p| p.page_number);

    let suspicious_pages = pages.iter().filter(|p| p.suspicious).count();
    let total_score: f64 = pages.iter().map(|p| p.suspicion_score).sum();
    let max_suspicion_score = pages
        .iter()
        .map(|p| p.suspicion_score)
        .fold(0.0f64, f64::max);

    let all_suspicion_reasons: Vec<String> = pages
        .iter()
        .flat_map(|p| p.suspicion_reasons.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let (average_suspicion_score, overall_suspicious) = if processed_pages > 0 {
        let avg = round2(total_score / processed_pages as f64);
        let ratio = suspicious_pages as f64 / processed_pages as f64;
        let overall = ratio > cfg.suspicious_page_ratio
            || avg > cfg.average_score_threshold
            || max_suspicion_score > cfg.max_score_threshold;
        (avg, overall)
    } else {
        (0.0, false)
    };

    DocumentResult {
        total_pages,
        processed_pages,
        extracted_content: pages,
        document_metadata: metadata,
        document_analysis: DocumentAnalysis {
            suspicious_pages,
            average_suspicion_score,
            max_suspicion_score,
            all_suspicion_reasons,
            overall_suspicious,
        },
    }
}

use crate::config::Config;
use crate::detect::{DetectorSet, Finding};
use crate::engine::ExtractOut;
use crate::score;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

/// Full scan result for one page. Findings are stored sorted descending by
/// confidence; `suspicion_reasons` is populated only for suspicious pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub page_number: usize,
    pub text: String,
    pub tables: Vec<Value>,
    pub visual_elements: Vec<Value>,
    pub encoded_sections: Vec<Finding>,
    pub suspicious: bool,
    pub suspicion_score: f64,
    pub suspicion_reasons: Vec<String>,
    pub formatting_flags: Vec<String>,
    pub rotation: i64,
}

/// Scan results for one page range, never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    pub total_pages: usize,
    pub processed_pages: usize,
    pub extracted_content: Vec<PageResult>,
    pub document_metadata: BTreeMap<String, String>,
}

/// Run the detectors and scorer over every page in the extracted range.
///
/// Pure function of its inputs; chunk-level parallelism relies on that.
pub fn process_chunk(cfg: &Config, detectors: &DetectorSet, extract: ExtractOut) -> ChunkResult {
    let mut results = Vec::with_capacity(extract.pages.len());

    for page in extract.pages {
        let text = if cfg.extract.normalize_unicode {
            page.text.nfkc().collect::<String>()
        } else {
            page.text
        };

        let text_chars = text.chars().count();

        // A page below the minimum candidate length cannot contain any
        // candidate; short-circuit to an empty, non-suspicious result.
        let (findings, assessment) = if text_chars < cfg.detection.min_candidate_len {
            (Vec::new(), Default::default())
        } else {
            let mut findings = detectors.detect(&text);
            findings.sort_by(|a: &Finding, b: &Finding| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(Ordering::Equal)
            });
            let assessment = score::assess(&cfg.scoring, &findings, text_chars);
            (findings, assessment)
        };

        if assessment.suspicious {
            warn!(
                "page {}: score {}, reasons: {}",
                page.page_number,
                assessment.score,
                assessment.reasons.join(", ")
            );
        }

        let mut formatting_flags = page.formatting_flags;
        if page.rotation != 0 {
            let flag = format!("rotated_{}_degrees", page.rotation);
            if !formatting_flags.contains(&flag) {
                formatting_flags.push(flag);
            }
        }

        results.push(PageResult {
            page_number: page.page_number,
            text,
            tables: page.tables,
            visual_elements: page.visual_elements,
            encoded_sections: findings,
            suspicious: assessment.suspicious,
            suspicion_score: assessment.score,
            suspicion_reasons: assessment.reasons,
            formatting_flags,
            rotation: page.rotation,
        });
    }

    ChunkResult {
        total_pages: extract.total_pages,
        processed_pages: results.len(),
        extracted_content: results,
        document_metadata: extract.metadata,
    }
}

use crate::config::Scoring;
use crate::detect::{Finding, FindingKind};
use crate::util::round2;

/// Suspicion verdict for a single page's findings.
#[derive(Debug, Clone, Default)]
pub struct PageAssessment {
    pub suspicious: bool,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Combine a page's findings into a suspicion score. `text_chars` is the
/// character length of the raw page text the findings came from.
///
/// The verdict compares the unrounded score against the threshold; the
/// stored score is rounded to 2 decimals. Reasons are kept only for
/// suspicious pages.
pub fn assess(cfg: &Scoring, findings: &[Finding], text_chars: usize) -> PageAssessment {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // Findings per 1000 characters of page text.
    let pattern_density = findings.len() as f64 / (text_chars as f64 / 1000.0);
    if pattern_density > cfg.density_threshold {
        score += pattern_density;
        reasons.push(format!(
            "High pattern density: {pattern_density:.2} patterns per 1000 chars"
        ));
    }

    let high_confidence = findings
        .iter()
        .filter(|f| f.confidence > cfg.high_confidence_threshold)
        .count();
    if high_confidence >= cfg.high_confidence_min_count {
        score += high_confidence as f64 * cfg.high_confidence_weight;
        reasons.push(format!(
            "Multiple high-confidence patterns: {high_confidence}"
        ));
    }

    let high_entropy_blocks = findings
        .iter()
        .filter(|f| {
            f.kind == FindingKind::HighEntropy
                && f.entropy.unwrap_or(0.0) > cfg.block_entropy_alert_threshold
        })
        .count();
    if high_entropy_blocks > 0 {
        score += high_entropy_blocks as f64;
        reasons.push(format!("High entropy blocks found: {high_entropy_blocks}"));
    }

    // Base64 payloads are the common carrier for smuggled scripts and
    // executables, so repeated hits weigh extra.
    let base64_patterns = findings
        .iter()
        .filter(|f| matches!(f.kind, FindingKind::Base64 | FindingKind::Base64Binary))
        .count();
    if base64_patterns > cfg.base64_min_count {
        score += base64_patterns as f64 * cfg.base64_weight;
        reasons.push(format!("Multiple Base64 patterns: {base64_patterns}"));
    }

    let suspicious = score > cfg.suspicious_score_threshold;
    PageAssessment {
        suspicious,
        score: round2(score),
        reasons: if suspicious { reasons } else { Vec::new() },
    }
}

use covert_check::config::Scoring;
use covert_check::detect::{Finding, FindingKind};
use covert_check::score::assess;

fn mk(kind: FindingKind, confidence: f64, entropy: Option<f64>) -> Finding {
    Finding {
        kind,
        content: "candidate".into(),
        sample_decoded: None,
        block_index: None,
        entropy,
        confidence,
    }
}

#[test]
fn no_findings_means_no_suspicion() {
    let cfg = Scoring::default();
    let a = assess(&cfg, &[], 1000);
    assert!(!a.suspicious);
    assert_eq!(a.score, 0.0);
    assert!(a.reasons.is_empty());
}

#[test]
fn density_contributes_but_reasons_stay_empty_below_threshold() {
    let cfg = Scoring::default();
    let findings = vec![
        mk(FindingKind::Hexadecimal, 0.5, None),
        mk(FindingKind::Hexadecimal, 0.5, None),
    ];
    // 2 findings per 1000 chars: density 2.0, above the 0.5 bar.
    let a = assess(&cfg, &findings, 1000);
    assert_eq!(a.score, 2.0);
    assert!(!a.suspicious);
    // Reasons are only reported for suspicious pages.
    assert!(a.reasons.is_empty());
}

#[test]
fn dense_base64_page_is_suspicious_with_reasons() {
    let cfg = Scoring::default();
    let findings: Vec<Finding> = (0..4).map(|_| mk(FindingKind::Base64, 0.9, None)).collect();

    // density 8.0 + high-confidence 4*0.5 + base64 4*0.7 = 12.8
    let a = assess(&cfg, &findings, 500);
    assert!(a.suspicious);
    assert_eq!(a.score, 12.8);
    assert_eq!(a.reasons.len(), 3);
    assert!(a.reasons.iter().any(|r| r.contains("High pattern density")));
    assert!(a.reasons.iter().any(|r| r.contains("high-confidence")));
    assert!(a.reasons.iter().any(|r| r.contains("Base64")));
}

#[test]
fn high_entropy_blocks_add_one_point_each() {
    let cfg = Scoring::default();
    let findings = vec![
        mk(FindingKind::HighEntropy, 0.6, Some(7.6)),
        mk(FindingKind::HighEntropy, 0.6, Some(7.8)),
        // Below the 7.5 alert bar: reported but not scored.
        mk(FindingKind::HighEntropy, 0.6, Some(7.2)),
    ];
    let a = assess(&cfg, &findings, 100_000);
    assert_eq!(a.score, 2.0);
    assert!(!a.suspicious);
}

#[test]
fn two_base64_findings_do_not_trigger_the_base64_rule() {
    let cfg = Scoring::default();
    let findings = vec![
        mk(FindingKind::Base64, 0.9, None),
        mk(FindingKind::Base64Binary, 0.7, None),
    ];
    let a = assess(&cfg, &findings, 100_000);
    assert_eq!(a.score, 0.0);
}

#[test]
fn score_exactly_at_threshold_is_not_suspicious() {
    let cfg = Scoring::default();
    // 10 high-confidence non-base64 findings in a huge page: only the
    // high-confidence rule fires, 10 * 0.5 = 5.0 exactly.
    let findings: Vec<Finding> = (0..10)
        .map(|_| mk(FindingKind::Hexadecimal, 0.9, None))
        .collect();
    let a = assess(&cfg, &findings, 1_000_000);
    assert_eq!(a.score, 5.0);
    assert!(!a.suspicious);
}

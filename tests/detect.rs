use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use covert_check::config::Detection;
use covert_check::detect::{DetectorSet, FindingKind, block_confidence};

fn detectors() -> DetectorSet {
    DetectorSet::new(&Detection::default()).unwrap()
}

#[test]
fn readability_heuristic() {
    let det = detectors();
    assert!(det.is_readable_text("Hello, world"));
    assert!(det.is_readable_text("plain words with spaces"));
    assert!(!det.is_readable_text(""));
    // Letters but no punctuation/whitespace.
    assert!(!det.is_readable_text("abcdefgh"));
    // Punctuation but no letters.
    assert!(!det.is_readable_text(".,;:!?"));
    // Control characters push the printable ratio below the bar.
    assert!(!det.is_readable_text("a b\u{0}\u{1}\u{2}\u{3}\u{4}\u{5}\u{6}\u{7}"));
}

#[test]
fn base64_round_trip_reports_decoded_sample() {
    let det = detectors();
    let msg = "Hello, World! This is a secret message.";
    let encoded = BASE64.encode(msg);
    let text = format!("some words before {encoded} and words after.");

    let findings = det.detect_base64(&text);
    assert!(
        findings
            .iter()
            .any(|f| f.kind == FindingKind::Base64
                && f.sample_decoded.as_deref() == Some(msg)
                && f.confidence == 0.9),
        "findings: {findings:?}"
    );
}

#[test]
fn long_decoded_samples_are_ellipsized_at_fifty_chars() {
    let det = detectors();
    let msg = "This decoded payload is quite a bit longer than fifty characters in total.";
    let encoded = BASE64.encode(msg);

    let findings = det.detect_base64(&encoded);
    let sample = findings[0].sample_decoded.as_deref().unwrap();
    assert!(sample.ends_with("..."));
    assert_eq!(sample.chars().count(), 53);
    assert!(msg.starts_with(sample.trim_end_matches("...")));
}

#[test]
fn short_base64_candidates_are_ignored() {
    let det = detectors();
    // Below the 16-char candidate minimum.
    assert!(det.detect_base64("SGVsbG8h").is_empty());
}

#[test]
fn binary_base64_payloads_fire_when_threshold_allows() {
    let cfg = Detection {
        binary_entropy_threshold: 0.9,
        ..Detection::default()
    };
    let det = DetectorSet::new(&cfg).unwrap();

    // 18 bytes of 0xAA: 24 chars of base64, decodes to non-UTF-8.
    let encoded = BASE64.encode([0xAAu8; 18]);
    let findings = det.detect_base64(&encoded);
    assert_eq!(findings.len(), 1, "findings: {findings:?}");
    assert_eq!(findings[0].kind, FindingKind::Base64Binary);
    assert_eq!(findings[0].confidence, 0.7);
    assert!((findings[0].entropy.unwrap() - 1.0).abs() < 1e-9);
    assert!(findings[0].sample_decoded.is_none());

    // Alternating bits carry one bit per symbol, well under the default
    // 7.0 bar, so the stock detectors stay quiet on the same payload.
    assert!(detectors().detect_base64(&encoded).is_empty());
}

#[test]
fn trailing_bit_noise_still_decodes() {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let det = detectors();
    let msg = "covert payload here!";
    let mut encoded = BASE64.encode(msg).into_bytes();
    assert_eq!(encoded.last(), Some(&b'='));

    // Set a discarded low bit in the final data symbol. A lenient decoder
    // drops those bits and recovers the same bytes; a strict one rejects
    // the candidate outright.
    let last = encoded.len() - 2;
    let idx = ALPHABET.iter().position(|&c| c == encoded[last]).unwrap();
    encoded[last] = ALPHABET[idx | 1];
    let text = String::from_utf8(encoded).unwrap();

    let findings = det.detect_base64(&text);
    assert_eq!(findings.len(), 1, "findings: {findings:?}");
    assert_eq!(findings[0].kind, FindingKind::Base64);
    assert_eq!(findings[0].sample_decoded.as_deref(), Some(msg));
}

#[test]
fn hex_round_trip_reports_decoded_sample() {
    let det = detectors();
    let msg = "Hello, hex world!";
    let encoded = hex::encode(msg);
    let text = format!("prefix {encoded} suffix");

    let findings = det.detect_hex(&text);
    assert!(
        findings
            .iter()
            .any(|f| f.kind == FindingKind::Hexadecimal
                && f.sample_decoded.as_deref() == Some(msg)
                && f.confidence == 0.85),
        "findings: {findings:?}"
    );
}

#[test]
fn odd_length_hex_candidates_never_match() {
    let det = detectors();
    // 17 valid hex digits: rejected outright, not trimmed to 16.
    let findings = det.detect_hex("0123456789abcdef0");
    assert!(findings.is_empty(), "findings: {findings:?}");
}

#[test]
fn binary_hex_payloads_fire_when_threshold_allows() {
    let cfg = Detection {
        binary_entropy_threshold: 0.9,
        ..Detection::default()
    };
    let det = DetectorSet::new(&cfg).unwrap();

    let encoded = hex::encode([0xAAu8; 18]);
    let findings = det.detect_hex(&encoded);
    assert_eq!(findings.len(), 1, "findings: {findings:?}");
    assert_eq!(findings[0].kind, FindingKind::HexBinary);
    assert_eq!(findings[0].confidence, 0.6);
    assert!((findings[0].entropy.unwrap() - 1.0).abs() < 1e-9);
    assert!(findings[0].sample_decoded.is_none());

    assert!(detectors().detect_hex(&encoded).is_empty());
}

#[test]
fn url_encoding_decodes_readable_text() {
    let det = detectors();
    let findings = det.detect_url_encoding("%48%65%6C%6C%6F%2C%20%77%6F%72%6C%64%21");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::UrlEncoding);
    assert_eq!(findings[0].sample_decoded.as_deref(), Some("Hello, world!"));
    assert_eq!(findings[0].confidence, 0.8);
}

#[test]
fn url_encoding_discards_binary_payloads() {
    let det = detectors();
    // Decodes, but not to UTF-8; the percent detector has no binary branch.
    assert!(det.detect_url_encoding("%FF%FE%FD%FC").is_empty());
}

#[test]
fn high_entropy_block_fires_on_wide_alphabets() {
    let cfg = Detection {
        high_entropy_block_size: 256,
        ..Detection::default()
    };
    let det = DetectorSet::new(&cfg).unwrap();

    // 256 distinct characters: 8 bits of character entropy.
    let text: String = (0..256u32)
        .map(|i| char::from_u32(0x4E00 + i).unwrap())
        .collect();

    let findings = det.detect_high_entropy(&text);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::HighEntropy);
    assert_eq!(findings[0].block_index, Some(0));
    assert!(findings[0].entropy.unwrap() > 7.9);
    assert_eq!(findings[0].confidence, 0.95);
}

#[test]
fn high_entropy_skips_short_text() {
    let det = detectors();
    // Shorter than half the default block size of 100.
    let findings = det.detect_high_entropy("not much text here");
    assert!(findings.is_empty());
}

#[test]
fn block_confidence_scales_linearly_and_caps() {
    assert_eq!(block_confidence(7.0, 7.0, 0.95), 0.5);
    assert_eq!(block_confidence(7.5, 7.0, 0.95), 0.75);
    assert_eq!(block_confidence(8.0, 7.0, 0.95), 0.95);
}

#[test]
fn clean_prose_produces_no_findings() {
    let det = detectors();
    let text = "The quick brown fox jumps over the lazy dog. \
                Nothing in this sentence looks like an encoded run.";
    assert!(det.detect(text).is_empty());
}

#[test]
fn findings_serialize_kind_as_type() {
    let det = detectors();
    let msg = "Hello, World! This is a secret message.";
    let encoded = BASE64.encode(msg);
    let findings = det.detect_base64(&encoded);

    let v = serde_json::to_value(&findings[0]).unwrap();
    assert_eq!(v["type"], "base64");
    assert_eq!(v["confidence"], 0.9);
    assert!(v.get("entropy").is_none());
}

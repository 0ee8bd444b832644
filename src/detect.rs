use crate::config::Detection;
use crate::entropy::{bitstring_entropy, text_entropy};
use anyhow::{Context, Result};
use base64::engine::{GeneralPurpose, general_purpose::GeneralPurposeConfig};
use base64::{Engine as _, alphabet};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Standard-alphabet decoder that tolerates nonzero trailing bits in the
/// final symbol; such candidates still carry a decodable payload.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Punctuation/whitespace set natural-language text is expected to contain.
const COMMON_CHARS: &str = " .,;:?!-()[]{}\"'";

/// Decoded samples and block excerpts are cut to this many characters.
const SAMPLE_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Base64,
    Base64Binary,
    Hexadecimal,
    HexBinary,
    UrlEncoding,
    HighEntropy,
}

/// One detected candidate encoded/high-entropy substring. Immutable once
/// produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_decoded: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
    pub confidence: f64,
}

/// The four pattern detectors with their regexes compiled once at
/// construction. A `DetectorSet` is immutable and shared read-only across
/// concurrent chunk tasks.
pub struct DetectorSet {
    cfg: Detection,
    base64_re: Regex,
    hex_re: Regex,
    url_re: Regex,
}

impl DetectorSet {
    pub fn new(cfg: &Detection) -> Result<Self> {
        let min = cfg.min_candidate_len.max(1);
        let base64_re = Regex::new(&format!(r"[A-Za-z0-9+/]{{{min},}}={{0,3}}"))
            .context("compiling base64 pattern")?;
        let hex_re =
            Regex::new(&format!(r"[0-9A-Fa-f]{{{min},}}")).context("compiling hex pattern")?;
        let url_re =
            Regex::new(r"(?:%[0-9A-Fa-f]{2}){3,}").context("compiling url-encoding pattern")?;
        Ok(Self {
            cfg: cfg.clone(),
            base64_re,
            hex_re,
            url_re,
        })
    }

    /// Run every detector over the page text and concatenate the findings.
    /// Detector order does not matter; results are independent.
    pub fn detect(&self, text: &str) -> Vec<Finding> {
        let mut findings = self.detect_base64(text);
        findings.extend(self.detect_hex(text));
        findings.extend(self.detect_url_encoding(text));
        findings.extend(self.detect_high_entropy(text));
        findings
    }

    pub fn detect_base64(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        for m in self.base64_re.find_iter(text) {
            let encoded = m.as_str();
            if encoded.trim_end_matches('=').len() < self.cfg.min_candidate_len {
                continue;
            }

            // Pad to a multiple of 4; non-canonical candidates fail the
            // decode and are discarded without a finding.
            let rem = encoded.len() % 4;
            let padded = if rem == 0 {
                encoded.to_string()
            } else {
                format!("{}{}", encoded, "=".repeat(4 - rem))
            };

            let Ok(decoded) = BASE64.decode(&padded) else {
                continue;
            };

            match String::from_utf8(decoded) {
                Ok(decoded_text) => {
                    if self.is_readable_text(&decoded_text) {
                        findings.push(Finding {
                            kind: FindingKind::Base64,
                            content: encoded.to_string(),
                            sample_decoded: Some(excerpt(&decoded_text, SAMPLE_CHARS)),
                            block_index: None,
                            entropy: None,
                            confidence: self.cfg.base64_text_confidence,
                        });
                    }
                }
                Err(err) => {
                    let binary_entropy = bitstring_entropy(err.as_bytes());
                    if binary_entropy > self.cfg.binary_entropy_threshold {
                        findings.push(Finding {
                            kind: FindingKind::Base64Binary,
                            content: encoded.to_string(),
                            sample_decoded: None,
                            block_index: None,
                            entropy: Some(binary_entropy),
                            confidence: self.cfg.base64_binary_confidence,
                        });
                    }
                }
            }
        }

        findings
    }

    pub fn detect_hex(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        for m in self.hex_re.find_iter(text) {
            let encoded = m.as_str();
            // Hex requires paired nibbles; odd-length candidates are rejected
            // outright rather than trimmed.
            if encoded.len() % 2 != 0 {
                continue;
            }

            let Ok(decoded) = hex::decode(encoded) else {
                continue;
            };

            match String::from_utf8(decoded) {
                Ok(decoded_text) => {
                    if self.is_readable_text(&decoded_text) {
                        findings.push(Finding {
                            kind: FindingKind::Hexadecimal,
                            content: encoded.to_string(),
                            sample_decoded: Some(excerpt(&decoded_text, SAMPLE_CHARS)),
                            block_index: None,
                            entropy: None,
                            confidence: self.cfg.hex_text_confidence,
                        });
                    }
                }
                Err(err) => {
                    let binary_entropy = bitstring_entropy(err.as_bytes());
                    if binary_entropy > self.cfg.binary_entropy_threshold {
                        findings.push(Finding {
                            kind: FindingKind::HexBinary,
                            content: encoded.to_string(),
                            sample_decoded: None,
                            block_index: None,
                            entropy: Some(binary_entropy),
                            confidence: self.cfg.hex_binary_confidence,
                        });
                    }
                }
            }
        }

        findings
    }

    /// Only readable decodes are reported for percent-encoding; binary
    /// payloads are silently discarded.
    pub fn detect_url_encoding(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        for m in self.url_re.find_iter(text) {
            let encoded = m.as_str();
            let digits: String = encoded.chars().filter(|&c| c != '%').collect();

            let Ok(decoded) = hex::decode(&digits) else {
                continue;
            };
            let Ok(decoded_text) = String::from_utf8(decoded) else {
                continue;
            };

            if self.is_readable_text(&decoded_text) {
                findings.push(Finding {
                    kind: FindingKind::UrlEncoding,
                    content: encoded.to_string(),
                    sample_decoded: Some(excerpt(&decoded_text, SAMPLE_CHARS)),
                    block_index: None,
                    entropy: None,
                    confidence: self.cfg.url_confidence,
                });
            }
        }

        findings
    }

    pub fn detect_high_entropy(&self, text: &str) -> Vec<Finding> {
        let block_size = self.cfg.high_entropy_block_size.max(1);
        let chars: Vec<char> = text.chars().collect();

        // Too little text to form a meaningful block.
        if chars.len() < block_size / 2 {
            return Vec::new();
        }

        let mut findings = Vec::new();
        for (i, block) in chars.chunks(block_size).enumerate() {
            // The final block may be shorter; skip it below half size.
            if block.len() < block_size / 2 {
                continue;
            }

            let block_text: String = block.iter().collect();
            let entropy = text_entropy(&block_text);
            if entropy > self.cfg.block_entropy_threshold {
                findings.push(Finding {
                    kind: FindingKind::HighEntropy,
                    content: excerpt(&block_text, SAMPLE_CHARS),
                    sample_decoded: None,
                    block_index: Some(i),
                    entropy: Some(entropy),
                    confidence: block_confidence(
                        entropy,
                        self.cfg.block_entropy_threshold,
                        self.cfg.block_confidence_cap,
                    ),
                });
            }
        }

        findings
    }

    /// A decoded string is readable iff it has at least one letter, at least
    /// one common punctuation/whitespace character, and its printable ratio
    /// exceeds the configured minimum. Empty strings are never readable.
    pub fn is_readable_text(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let has_letters = text.chars().any(|c| c.is_alphabetic());
        let has_common_chars = text.chars().any(|c| COMMON_CHARS.contains(c));

        let total = text.chars().count();
        let printable = text.chars().filter(|c| !c.is_control()).count();
        let printable_ratio = printable as f64 / total as f64;

        has_letters && has_common_chars && printable_ratio > self.cfg.min_printable_ratio
    }
}

/// Confidence for a high-entropy block scales linearly with entropy above
/// the threshold, capped.
pub fn block_confidence(entropy: f64, threshold: f64, cap: f64) -> f64 {
    (0.5 + (entropy - threshold) / 2.0).min(cap)
}

/// Cut a string to at most `max` characters, marking truncation with an
/// ellipsis.
pub fn excerpt(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub detection: Detection,
    #[serde(default)]
    pub scoring: Scoring,
    #[serde(default)]
    pub chunking: Chunking,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub extract: Extract,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
    #[serde(default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub job_name: String,
    pub max_parallel_chunks: usize,
    pub resume: bool,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            job_name: "default".into(),
            max_parallel_chunks: 4,
            resume: true,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub out_dir: String,
    pub work_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            work_dir: ".covert-check-work".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_input_file_bytes: u64,
    pub max_input_pages: usize,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 2 * 1024 * 1024 * 1024,
            max_input_pages: 20000,
        }
    }
}

/// Tunables for the pattern detectors. The defaults are kept in lockstep
/// with the historical constants; changing them changes which payloads get
/// reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Minimum length of a Base64/Hex candidate run.
    pub min_candidate_len: usize,
    /// Character block size for the high-entropy scan.
    pub high_entropy_block_size: usize,
    /// Bit-string entropy a non-UTF8 decode must exceed to be reported.
    pub binary_entropy_threshold: f64,
    /// Character entropy a text block must exceed to be reported.
    pub block_entropy_threshold: f64,
    /// Printable-character ratio a decode must exceed to count as readable.
    pub min_printable_ratio: f64,
    pub base64_text_confidence: f64,
    pub base64_binary_confidence: f64,
    pub hex_text_confidence: f64,
    pub hex_binary_confidence: f64,
    pub url_confidence: f64,
    /// Upper bound for the entropy-scaled block confidence.
    pub block_confidence_cap: f64,
}
impl Default for Detection {
    fn default() -> Self {
        Self {
            min_candidate_len: 16,
            high_entropy_block_size: 100,
            binary_entropy_threshold: 7.0,
            block_entropy_threshold: 7.0,
            min_printable_ratio: 0.95,
            base64_text_confidence: 0.9,
            base64_binary_confidence: 0.7,
            hex_text_confidence: 0.85,
            hex_binary_confidence: 0.6,
            url_confidence: 0.8,
            block_confidence_cap: 0.95,
        }
    }
}

/// Page suspicion scoring weights. Empirically chosen in the original
/// deployment; preserved exactly so verdicts stay comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoring {
    /// Findings per 1000 chars above which density contributes to the score.
    pub density_threshold: f64,
    /// Confidence above which a finding counts as high-confidence.
    pub high_confidence_threshold: f64,
    /// Minimum high-confidence findings before they contribute.
    pub high_confidence_min_count: usize,
    pub high_confidence_weight: f64,
    /// Block entropy above which a high-entropy finding raises the score.
    pub block_entropy_alert_threshold: f64,
    /// Base64-kind findings beyond this count contribute.
    pub base64_min_count: usize,
    pub base64_weight: f64,
    /// Score above which a page is flagged suspicious.
    pub suspicious_score_threshold: f64,
}
impl Default for Scoring {
    fn default() -> Self {
        Self {
            density_threshold: 0.5,
            high_confidence_threshold: 0.8,
            high_confidence_min_count: 3,
            high_confidence_weight: 0.5,
            block_entropy_alert_threshold: 7.5,
            base64_min_count: 2,
            base64_weight: 0.7,
            suspicious_score_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunking {
    /// Pages per chunk. Zero falls back to the default (5).
    pub chunk_size: usize,
}
impl Default for Chunking {
    fn default() -> Self {
        Self { chunk_size: 5 }
    }
}

/// Document-level verdict thresholds. Any one condition suffices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    pub suspicious_page_ratio: f64,
    pub average_score_threshold: f64,
    pub max_score_threshold: f64,
}
impl Default for Aggregation {
    fn default() -> Self {
        Self {
            suspicious_page_ratio: 0.2,
            average_score_threshold: 3.0,
            max_score_threshold: 7.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extract {
    /// Backend for the page-text collaborator.
    pub backend: String,
    /// NFKC-normalize extracted text before detection.
    pub normalize_unicode: bool,
}
impl Default for Extract {
    fn default() -> Self {
        Self {
            backend: "json_pages".into(),
            normalize_unicode: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub write_result_json: bool,
    pub write_report_json: bool,
    pub write_index_json: bool,
    pub result_filename: String,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_result_json: true,
            write_report_json: true,
            write_index_json: true,
            result_filename: "result.json".into(),
            report_filename: "report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debug {
    pub dump_effective_config: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            dump_effective_config: true,
        }
    }
}

use crate::{config::Config, engine::Extractor};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub input: ProbeInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeInput {
    pub path: String,
    pub file_bytes: u64,
    pub page_count: usize,
}

/// Priming call: determine the page count once and enforce input limits
/// before any chunk is dispatched.
pub fn probe_document(cfg: &Config, extractor: &dyn Extractor, input: &Path) -> Result<ProbeResult> {
    let meta = std::fs::metadata(input).with_context(|| "stat input")?;
    let file_bytes = meta.len();
    if file_bytes > cfg.limits.max_input_file_bytes {
        anyhow::bail!("input exceeds max_input_file_bytes: {}", file_bytes);
    }

    let probe = extractor
        .probe(input)
        .with_context(|| "extractor probe failed")?;

    if probe.page_count > cfg.limits.max_input_pages {
        anyhow::bail!("input exceeds max_input_pages: {}", probe.page_count);
    }
    if probe.page_count == 0 {
        anyhow::bail!("input has zero pages");
    }

    Ok(ProbeResult {
        input: ProbeInput {
            path: input.display().to_string(),
            file_bytes,
            page_count: probe.page_count,
        },
    })
}

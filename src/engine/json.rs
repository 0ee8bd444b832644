use super::{ExtractOut, Extractor, ExtractorDiag, PageText, ProbeOut};
use crate::chunk_plan::PageRange;
use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Extraction backend that reads pre-extracted document content from a JSON
/// file produced by an upstream parsing stage. Each call re-reads the file,
/// matching the dispatch model where every chunk request carries the
/// document payload.
pub struct JsonExtractor;

#[derive(Debug, Deserialize)]
struct DocumentFile {
    #[serde(default)]
    document_metadata: BTreeMap<String, String>,
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    #[serde(default)]
    text: String,
    #[serde(default)]
    rotation: i64,
    #[serde(default)]
    formatting_flags: Vec<String>,
    #[serde(default)]
    tables: Vec<Value>,
    #[serde(default)]
    visual_elements: Vec<Value>,
}

impl JsonExtractor {
    pub fn new(cfg: &Config) -> Result<Self> {
        if cfg.extract.backend != "json_pages" {
            return Err(anyhow!(
                "unsupported extract.backend: {}",
                cfg.extract.backend
            ));
        }
        Ok(Self)
    }

    fn load(&self, input: &Path) -> Result<DocumentFile> {
        let raw = std::fs::read_to_string(input)
            .with_context(|| format!("reading document file: {}", input.display()))?;
        let doc: DocumentFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing document JSON: {}", input.display()))?;
        Ok(doc)
    }
}

impl Extractor for JsonExtractor {
    fn doctor(&self) -> Result<ExtractorDiag> {
        Ok(ExtractorDiag {
            backend: "json_pages".into(),
            ok: true,
            error: None,
        })
    }

    fn probe(&self, input: &Path) -> Result<ProbeOut> {
        let doc = self.load(input)?;
        Ok(ProbeOut {
            page_count: doc.pages.len(),
        })
    }

    fn extract_pages(&self, input: &Path, range: &PageRange) -> Result<ExtractOut> {
        let doc = self.load(input)?;
        let total_pages = doc.pages.len();

        let start = range.start.min(total_pages);
        let end = range.end.min(total_pages);
        debug!("extract pages [{start}, {end}) of {total_pages}");

        let pages = doc
            .pages
            .into_iter()
            .enumerate()
            .skip(start)
            .take(end.saturating_sub(start))
            .map(|(i, p)| PageText {
                page_number: i,
                text: p.text,
                rotation: p.rotation,
                formatting_flags: p.formatting_flags,
                tables: p.tables,
                visual_elements: p.visual_elements,
            })
            .collect();

        Ok(ExtractOut {
            total_pages,
            pages,
            metadata: doc.document_metadata,
        })
    }
}

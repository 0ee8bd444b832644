use crate::{
    aggregate::{self, DocumentResult},
    chunk::{self, ChunkResult},
    chunk_plan::ChunkPlan,
    config::Config,
    detect::DetectorSet,
    engine::Extractor,
    probe,
    report::{ChunkReport, JobReport},
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// The orchestrator: primes the page count, partitions it into page
/// ranges, dispatches each range to the chunk processor with bounded
/// parallelism, and merges the results into one document verdict.
pub struct Pipeline<E: Extractor> {
    cfg: Config,
    extractor: E,
    detectors: DetectorSet,
}

#[derive(Debug)]
pub struct JobOutput {
    pub result: DocumentResult,
    pub report: JobReport,
}

impl<E: Extractor> Pipeline<E> {
    pub fn new(cfg: &Config, extractor: E) -> Result<Self> {
        let detectors = DetectorSet::new(&cfg.detection)?;
        Ok(Self {
            cfg: cfg.clone(),
            extractor,
            detectors,
        })
    }

    /// Scan the whole document. `chunk_size` overrides the configured
    /// value when given; zero falls back to the default.
    ///
    /// Any chunk failure aborts the whole job with a single error. There
    /// is no partial document result.
    pub fn run_job(&self, input: &Path, chunk_size: Option<usize>) -> Result<JobOutput> {
        let probe_res = probe::probe_document(&self.cfg, &self.extractor, input)?;
        info!(
            "probe page_count={} file_bytes={}",
            probe_res.input.page_count, probe_res.input.file_bytes
        );

        let chunk_size = chunk_size.unwrap_or(self.cfg.chunking.chunk_size);
        let plan = ChunkPlan::with_chunk_size(probe_res.input.page_count, chunk_size);
        debug!(?plan, "chunk plan");

        let workers = self.cfg.global.max_parallel_chunks.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("building chunk worker pool")?;

        let chunk_results: Vec<ChunkResult> = pool.install(|| {
            plan.chunks
                .par_iter()
                .enumerate()
                .map(|(i, range)| {
                    info!("chunk {} pages [{}, {})", i, range.start, range.end);
                    let extract = self
                        .extractor
                        .extract_pages(input, range)
                        .with_context(|| format!("extract failed for chunk {i}"))?;

                    let expected = range
                        .end
                        .min(extract.total_pages)
                        .saturating_sub(range.start.min(extract.total_pages));
                    if extract.pages.len() != expected {
                        return Err(anyhow!(
                            "chunk {} returned {} pages, expected {}",
                            i,
                            extract.pages.len(),
                            expected
                        ));
                    }

                    Ok(chunk::process_chunk(&self.cfg, &self.detectors, extract))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let chunk_reports = plan
            .chunks
            .iter()
            .zip(&chunk_results)
            .enumerate()
            .map(|(i, (range, res))| ChunkReport {
                chunk_index: i,
                start_page: range.start,
                end_page: range.end,
                pages_processed: res.processed_pages,
                suspicious_pages: res
                    .extracted_content
                    .iter()
                    .filter(|p| p.suspicious)
                    .count(),
                max_suspicion_score: res
                    .extracted_content
                    .iter()
                    .map(|p| p.suspicion_score)
                    .fold(0.0f64, f64::max),
            })
            .collect();

        let result = aggregate::merge(&self.cfg.aggregation, chunk_results);

        if result.document_analysis.overall_suspicious {
            warn!("document flagged as suspicious:");
            warn!(
                "suspicious pages: {}",
                result.document_analysis.suspicious_pages
            );
            warn!(
                "average suspicion score: {}",
                result.document_analysis.average_suspicion_score
            );
            warn!(
                "max suspicion score: {}",
                result.document_analysis.max_suspicion_score
            );
            warn!(
                "reasons: {}",
                result.document_analysis.all_suspicion_reasons.join(", ")
            );
        }

        Ok(JobOutput {
            result,
            report: JobReport {
                input: probe_res.input,
                chunk_reports,
            },
        })
    }
}

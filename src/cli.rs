use crate::{
    config::Config,
    engine::{Extractor, json::JsonExtractor},
    pipeline::Pipeline,
    util::{ensure_dir, hash_file, now_rfc3339, sha256_hex},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "covert-check")]
#[command(about = "Suspicious-payload scanner for extracted document text")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./covert-check.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the extraction backend.
    Doctor {},
    /// Probe an input document: page count and input limits.
    Probe {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the chunk plan for an input document.
    Plan {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Scan a document for hidden encoded payloads.
    Scan {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        chunk_size: Option<usize>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;

    match &args.cmd {
        Command::Doctor {} => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            doctor(&cfg)
        }
        Command::Probe { input } => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            probe(&cfg, input)
        }
        Command::Plan { input, chunk_size } => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            plan(&cfg, input, *chunk_size)
        }
        Command::Scan {
            input,
            out_dir,
            chunk_size,
        } => scan(&args, &cfg, input, out_dir.as_deref(), *chunk_size),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("covert-check.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("covert-check.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config) -> Result<()> {
    let extractor = JsonExtractor::new(cfg)?;
    let diag = extractor.doctor()?;
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn probe(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(cfg, input)?;
    let extractor = JsonExtractor::new(cfg)?;
    let probe = crate::probe::probe_document(cfg, &extractor, input)?;
    println!("{}", serde_json::to_string_pretty(&probe)?);
    Ok(())
}

fn plan(cfg: &Config, input: &Path, chunk_size: Option<usize>) -> Result<()> {
    validate_input(cfg, input)?;
    let extractor = JsonExtractor::new(cfg)?;
    let probe = crate::probe::probe_document(cfg, &extractor, input)?;
    let chunk_size = chunk_size.unwrap_or(cfg.chunking.chunk_size);
    let plan =
        crate::chunk_plan::ChunkPlan::with_chunk_size(probe.input.page_count, chunk_size);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn scan(
    args: &Args,
    cfg: &Config,
    input: &Path,
    out_override: Option<&Path>,
    chunk_size: Option<usize>,
) -> Result<()> {
    validate_input(cfg, input)?;

    let cfg_hash = sha256_hex(cfg.normalized_for_hash().as_bytes());
    let input_hash =
        hash_file(input).with_context(|| format!("hashing input: {}", input.display()))?;
    let job_id = sha256_hex(format!("{}:{}", cfg_hash, input_hash).as_bytes());

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    let job_dir = out_root.join(&job_id);

    if job_dir.exists() && !cfg.global.resume {
        return Err(anyhow!(
            "job_dir already exists and resume=false: {}",
            job_dir.display()
        ));
    }

    ensure_dir(&job_dir)?;
    ensure_dir(&job_dir.join("final"))?;
    ensure_dir(&job_dir.join("logs"))?;

    let log_path = resolve_log_path(cfg, Some(&job_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    info!("job_id={job_id} out={}", job_dir.display());

    if cfg.debug.dump_effective_config {
        let raw = toml::to_string(cfg).unwrap_or_default();
        std::fs::write(job_dir.join("effective-config.toml"), raw)?;
    }

    ensure_dir(Path::new(&cfg.paths.work_dir))?;

    let extractor = JsonExtractor::new(cfg)?;
    let pipeline = Pipeline::new(cfg, extractor)?;

    let started = now_rfc3339();
    let out = pipeline.run_job(input, chunk_size)?;

    if cfg.output.write_result_json {
        std::fs::write(
            job_dir.join("final").join(&cfg.output.result_filename),
            serde_json::to_string_pretty(&out.result)?,
        )?;
    }

    if cfg.output.write_report_json {
        std::fs::write(
            job_dir.join("final").join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&out.report)?,
        )?;
    }

    if cfg.output.write_index_json {
        let index = serde_json::json!({
            "job_id": job_id,
            "started": started,
            "finished": now_rfc3339(),
            "result": format!("final/{}", cfg.output.result_filename),
            "report": format!("final/{}", cfg.output.report_filename),
            "overall_suspicious": out.result.document_analysis.overall_suspicious,
        });
        std::fs::write(
            job_dir.join("index.json"),
            serde_json::to_string_pretty(&index)?,
        )?;
    }

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "job_id": job_id,
                "job_dir": job_dir,
                "status": "ok",
                "overall_suspicious": out.result.document_analysis.overall_suspicious,
            }))?
        );
    }

    Ok(())
}

fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    if !input.exists() {
        return Err(anyhow!("input does not exist: {}", input.display()));
    }

    if let Some(ext) = input.extension().and_then(|s| s.to_str()) {
        if ext.to_ascii_lowercase() != "json" {
            return Err(anyhow!(
                "input is not an extracted-pages JSON file: {}",
                input.display()
            ));
        }
    } else if tracing::dispatcher::has_been_set() {
        warn!(
            "input has no extension; assuming extracted-pages JSON: {}",
            input.display()
        );
    } else {
        // Scan validates before its job directory (and log file) exists,
        // so there is no subscriber yet.
        eprintln!(
            "warning: input has no extension; assuming extracted-pages JSON: {}",
            input.display()
        );
    }

    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

fn resolve_log_path(cfg: &Config, job_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(job_dir) = job_dir {
        return Some(job_dir.join("logs").join("covert-check.log"));
    }

    Some(PathBuf::from(&cfg.paths.out_dir).join("covert-check.log"))
}

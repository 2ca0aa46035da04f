use crate::{
    backend::{HttpBackend, ReportsBackend},
    config::Config,
    notify::{Notice, Notifier},
    orchestrator::{DownloadRequest, GenerateRequest, Orchestrator, SummaryRequest},
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "gapsheet")]
#[command(about = "Compliance report workflow client (generation, summary polling, workbook export)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./gapsheet.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a report job and start its generation.
    Generate {
        #[arg(long)]
        tenant_id: String,
        #[arg(long)]
        company_id: String,
        #[arg(long)]
        evaluation_id: String,
    },
    /// Export a report's results as an XLSX workbook.
    Download {
        #[arg(long)]
        report_id: String,
        #[arg(long)]
        tenant_id: String,
        #[arg(long)]
        company_id: String,
        #[arg(long)]
        company_name: String,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Poll for the executive summary and save its payload once ready.
    Summary {
        #[arg(long)]
        report_id: String,
        #[arg(long)]
        tenant_id: String,
        #[arg(long)]
        company_id: String,
        #[arg(long)]
        evaluation_id: String,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print a report's metadata and row count.
    Status {
        #[arg(long)]
        report_id: String,
        #[arg(long)]
        tenant_id: String,
        #[arg(long)]
        company_id: String,
    },
}

pub async fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;
    let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg).as_deref())?;

    match &args.cmd {
        Command::Generate {
            tenant_id,
            company_id,
            evaluation_id,
        } => {
            let req = GenerateRequest {
                tenant_id: tenant_id.clone(),
                company_id: company_id.clone(),
                evaluation_id: evaluation_id.clone(),
            };
            let (orch, printer) = build_orchestrator(&cfg)?;
            orch.generate_excel_report(&req).await;
            finish(orch, printer).await
        }
        Command::Download {
            report_id,
            tenant_id,
            company_id,
            company_name,
            out_dir,
        } => {
            let req = DownloadRequest {
                report_id: report_id.clone(),
                tenant_id: tenant_id.clone(),
                company_id: company_id.clone(),
                company_name: company_name.clone(),
            };
            let out = out_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.export.out_dir));
            let (orch, printer) = build_orchestrator(&cfg)?;
            orch.download_excel_report(&req, &out).await;
            finish(orch, printer).await
        }
        Command::Summary {
            report_id,
            tenant_id,
            company_id,
            evaluation_id,
            out_dir,
        } => {
            let req = SummaryRequest {
                report_id: report_id.clone(),
                tenant_id: tenant_id.clone(),
                company_id: company_id.clone(),
                evaluation_id: evaluation_id.clone(),
            };
            let out = out_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.export.out_dir));
            let (orch, printer) = build_orchestrator(&cfg)?;
            run_summary(orch, printer, &req, &out).await
        }
        Command::Status {
            report_id,
            tenant_id,
            company_id,
        } => {
            let backend = HttpBackend::new(&cfg)?;
            status(&backend, report_id, tenant_id, company_id).await
        }
    }
}

fn build_orchestrator(cfg: &Config) -> Result<(Orchestrator<HttpBackend>, JoinHandle<bool>)> {
    let backend = HttpBackend::new(cfg)?;
    let (notifier, rx) = Notifier::channel(64);
    let printer = spawn_notice_printer(rx, cfg.logging.json);
    Ok((Orchestrator::new(cfg, backend, notifier), printer))
}

/// Renders notices as they arrive; resolves to true if any was destructive.
fn spawn_notice_printer(mut rx: mpsc::Receiver<Notice>, json: bool) -> JoinHandle<bool> {
    tokio::spawn(async move {
        let mut destructive = false;
        while let Some(notice) = rx.recv().await {
            destructive |= notice.is_destructive();
            if json {
                match serde_json::to_string(&notice) {
                    Ok(line) => println!("{line}"),
                    Err(_) => error!("{}: {}", notice.title, notice.body),
                }
            } else if notice.is_destructive() {
                error!("{}: {}", notice.title, notice.body);
            } else {
                info!("{}: {}", notice.title, notice.body);
            }
        }
        destructive
    })
}

/// Dropping the orchestrator closes the notice channel; the printer drains
/// what is buffered and reports whether anything destructive came through.
async fn finish<B: ReportsBackend>(
    orch: Orchestrator<B>,
    printer: JoinHandle<bool>,
) -> Result<()> {
    drop(orch);
    let destructive = printer
        .await
        .map_err(|e| anyhow!("notice printer task failed: {e}"))?;
    if destructive {
        return Err(anyhow!("operation reported a failure; see notices above"));
    }
    Ok(())
}

/// Run the executive-summary flow end to end: poll, save the payload when
/// one was stored, and always drain notices before surfacing a save
/// failure.
pub async fn run_summary<B: ReportsBackend>(
    orch: Orchestrator<B>,
    printer: JoinHandle<bool>,
    req: &SummaryRequest,
    out_dir: &Path,
) -> Result<()> {
    orch.generate_executive_summary(req).await;

    let written = match orch.tracking().executive_summary {
        Some(data) => write_summary_payload(out_dir, &req.report_id, &data),
        None => Ok(()),
    };

    let finished = finish(orch, printer).await;
    written?;
    finished
}

async fn status<B: ReportsBackend>(
    backend: &B,
    report_id: &str,
    tenant_id: &str,
    company_id: &str,
) -> Result<()> {
    let results = backend.fetch_results(report_id, tenant_id, company_id).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "report_id": results.report_id,
            "eval_id": results.eval_id,
            "report_type": results.report_type,
            "processing_status": results.processing_status,
            "created_at": results.created_at,
            "created_by": results.created_by,
            "result_rows": results.results.len(),
        }))?
    );
    Ok(())
}

fn write_summary_payload(out_dir: &Path, report_id: &str, data: &serde_json::Value) -> Result<()> {
    ensure_dir(out_dir)?;
    let doc = serde_json::json!({
        "report_id": report_id,
        "fetched": now_rfc3339(),
        "data": data,
    });
    let path = out_dir.join(format!("{report_id} executive-summary.json"));
    std::fs::write(&path, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("executive summary written to {}", path.display());
    Ok(())
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("gapsheet.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("gapsheet.example.toml"))
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
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
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

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(PathBuf::from(&cfg.export.out_dir).join("gapsheet.log"))
}

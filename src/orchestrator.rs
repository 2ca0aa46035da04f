use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::types::{CreateReportRequest, ResultRow, StartReportRequest};
use crate::backend::ReportsBackend;
use crate::config::Config;
use crate::notify::Notifier;
use crate::poll::{AttemptOutcome, NextStep, PollOutcome, PollPlan};
use crate::state::{JobTracking, Tracker};
use crate::util::{ensure_dir, natural_cmp};
use crate::workbook;

/// Report type sent on every create request.
const REPORT_TYPE: &str = "gap_analysis";

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub tenant_id: String,
    pub company_id: String,
    pub evaluation_id: String,
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub report_id: String,
    pub tenant_id: String,
    pub company_id: String,
    pub company_name: String,
}

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub report_id: String,
    pub tenant_id: String,
    pub company_id: String,
    pub evaluation_id: String,
}

/// Drives the report workflow end to end: create/start, results export,
/// and the executive summary poll. The boundary methods never return
/// errors; outcomes surface as notices and through [`JobTracking`].
pub struct Orchestrator<B: ReportsBackend> {
    cfg: Config,
    backend: B,
    tracker: Tracker,
    notifier: Notifier,
}

impl<B: ReportsBackend> Orchestrator<B> {
    pub fn new(cfg: &Config, backend: B, notifier: Notifier) -> Self {
        Self {
            cfg: cfg.clone(),
            backend,
            tracker: Tracker::new(),
            notifier,
        }
    }

    /// Watch job state as it changes.
    pub fn subscribe(&self) -> watch::Receiver<JobTracking> {
        self.tracker.subscribe()
    }

    /// Current job state snapshot.
    pub fn tracking(&self) -> JobTracking {
        self.tracker.snapshot()
    }

    /// Create a report job, then start its generation. Start is never
    /// attempted when create fails.
    pub async fn generate_excel_report(&self, req: &GenerateRequest) {
        self.tracker.update(|t| t.generating_report = true);
        self.run_generate(req).await;
        self.tracker.update(|t| t.generating_report = false);
    }

    async fn run_generate(&self, req: &GenerateRequest) {
        let create = CreateReportRequest {
            tenant_id: req.tenant_id.clone(),
            company_id: req.company_id.clone(),
            evaluation_id: req.evaluation_id.clone(),
            report_type: REPORT_TYPE.to_string(),
            created_by: self.cfg.identity.display_name.clone(),
        };

        let report_id = match self.backend.create_report(&create).await {
            Ok(resp) => resp.report_id,
            Err(err) => {
                warn!("create report failed: {err:#}");
                self.notifier
                    .destructive(
                        "Error creating report",
                        "The report could not be created. Please try again.",
                    )
                    .await;
                return;
            }
        };

        info!("report {report_id} created, requesting start");

        let start = StartReportRequest {
            tenant_id: req.tenant_id.clone(),
            company_id: req.company_id.clone(),
        };
        match self.backend.start_report(&report_id, &start).await {
            Ok(_) => {
                self.notifier
                    .info(
                        "Report generation started",
                        "You'll be notified when your report is ready.",
                    )
                    .await;
            }
            Err(err) => {
                warn!("start report {report_id} failed: {err:#}");
                self.notifier
                    .destructive(
                        "Error starting report generation",
                        "The report was created but generation could not be started.",
                    )
                    .await;
            }
        }
    }

    /// Fetch a report's rows, encode them as a workbook, and write
    /// `"{company_name} report.xlsx"` under `out_dir`. The downloading set
    /// is keyed by report id so distinct reports can run concurrently.
    pub async fn download_excel_report(&self, req: &DownloadRequest, out_dir: &Path) {
        self.tracker.update(|t| {
            t.downloading.insert(req.report_id.clone());
        });

        let outcome = self.run_download(req, out_dir).await;

        // Cleanup runs on every path, success or failure.
        self.tracker.update(|t| {
            t.downloading.remove(&req.report_id);
        });

        match outcome {
            Ok(path) => info!("report {} exported to {}", req.report_id, path.display()),
            Err(err) => {
                warn!("download of report {} failed: {err:#}", req.report_id);
                self.notifier
                    .destructive("Download failed", "Failed to download report. Please try again.")
                    .await;
            }
        }
    }

    async fn run_download(&self, req: &DownloadRequest, out_dir: &Path) -> Result<PathBuf> {
        let results = self
            .backend
            .fetch_results(&req.report_id, &req.tenant_id, &req.company_id)
            .await?;

        let mut rows = results.results;
        rows.sort_by(|a, b| natural_cmp(control_id(a), control_id(b)));

        let buffer = workbook::encode(&self.cfg, &rows)?;

        ensure_dir(out_dir)?;
        let path = out_dir.join(format!("{} report.xlsx", req.company_name));
        std::fs::write(&path, &buffer).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Poll the executive summary endpoint until it is ready or the attempt
    /// budget is spent. Attempts run strictly one at a time with a fixed
    /// delay between consecutive attempts and none after the last.
    pub async fn generate_executive_summary(&self, req: &SummaryRequest) {
        self.tracker.update(|t| {
            t.summarizing.insert(req.report_id.clone());
        });
        self.notifier
            .info(
                "Executive summary",
                "Generation started; the document will be saved automatically when ready.",
            )
            .await;

        let plan = PollPlan::from_config(&self.cfg);
        let outcome = self.run_summary_poll(req, &plan).await;

        self.tracker.update(|t| {
            t.summarizing.remove(&req.report_id);
        });

        match outcome {
            PollOutcome::Ready => {
                info!("executive summary for report {} is ready", req.report_id);
            }
            PollOutcome::Exhausted { failed_last } => {
                if failed_last {
                    self.tracker.update(|t| t.executive_summary = None);
                }
                self.notifier
                    .destructive(
                        "Timeout",
                        "Executive summary generation is taking longer than expected. Please try again later.",
                    )
                    .await;
            }
        }
    }

    async fn run_summary_poll(&self, req: &SummaryRequest, plan: &PollPlan) -> PollOutcome {
        let mut attempt = 1u32;
        loop {
            let observed = match self
                .backend
                .fetch_executive_summary(
                    &req.report_id,
                    &req.tenant_id,
                    &req.company_id,
                    &req.evaluation_id,
                )
                .await
            {
                Ok(status) if status.is_ready() => {
                    self.tracker.update(|t| t.executive_summary = status.data.clone());
                    AttemptOutcome::Ready
                }
                Ok(status) => {
                    debug!("summary attempt {attempt}: status={}", status.status);
                    AttemptOutcome::Pending
                }
                Err(err) => {
                    warn!("summary attempt {attempt} failed: {err:#}");
                    AttemptOutcome::Failed
                }
            };

            match plan.advance(attempt, observed) {
                NextStep::Finish(outcome) => return outcome,
                NextStep::Backoff(delay) => {
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn control_id(row: &ResultRow) -> &str {
    row.get("control_id").and_then(Value::as_str).unwrap_or_default()
}

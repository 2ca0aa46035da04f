pub mod http;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpBackend;
pub use types::{
    CreateReportRequest, CreateReportResponse, ReportResults, ResultRow, StartReportRequest,
    SummaryStatus,
};

/// The remote report service as the orchestrator consumes it. One method
/// per endpoint; no retries at this layer, callers own their retry budget.
#[async_trait]
pub trait ReportsBackend: Send + Sync {
    /// Register a new report job and return its id.
    async fn create_report(&self, req: &CreateReportRequest) -> Result<CreateReportResponse>;

    /// Kick off generation for a previously created report.
    async fn start_report(&self, report_id: &str, req: &StartReportRequest) -> Result<Value>;

    /// Fetch a report's metadata and result rows.
    async fn fetch_results(
        &self,
        report_id: &str,
        tenant_id: &str,
        company_id: &str,
    ) -> Result<ReportResults>;

    /// Fetch the executive summary status once.
    async fn fetch_executive_summary(
        &self,
        report_id: &str,
        tenant_id: &str,
        company_id: &str,
        evaluation_id: &str,
    ) -> Result<SummaryStatus>;
}

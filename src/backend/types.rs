use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of a report's tabular output: `control_id` plus a variable set
/// of columns. Key order is preserved from the wire; the exporter derives
/// the column layout from the first row's keys.
pub type ResultRow = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReportRequest {
    pub tenant_id: String,
    pub company_id: String,
    pub evaluation_id: String,
    pub report_type: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReportResponse {
    pub report_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartReportRequest {
    pub tenant_id: String,
    pub company_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResults {
    pub report_id: String,
    #[serde(default)]
    pub eval_id: String,
    #[serde(default)]
    pub report_type: String,
    #[serde(default)]
    pub processing_status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub results: Vec<ResultRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStatus {
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SummaryStatus {
    /// Anything other than "ready" counts as still generating.
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

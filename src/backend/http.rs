use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::types::{
    CreateReportRequest, CreateReportResponse, ReportResults, StartReportRequest, SummaryStatus,
};
use super::ReportsBackend;
use crate::config::Config;

/// JSON-over-HTTP implementation of [`ReportsBackend`].
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(cfg.backend.connect_timeout_seconds))
            .timeout(Duration::from_secs(cfg.backend.request_timeout_seconds))
            .use_rustls_tls()
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url: cfg.backend.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ReportsBackend for HttpBackend {
    async fn create_report(&self, req: &CreateReportRequest) -> Result<CreateReportResponse> {
        let url = self.url("/reports");
        debug!("POST {url}");
        let resp = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .context("create report rejected")?;
        resp.json().await.context("parsing create report response")
    }

    async fn start_report(&self, report_id: &str, req: &StartReportRequest) -> Result<Value> {
        let url = self.url(&format!("/reports/{report_id}/start"));
        debug!("POST {url}");
        let resp = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .context("start report rejected")?;
        resp.json().await.context("parsing start report response")
    }

    async fn fetch_results(
        &self,
        report_id: &str,
        tenant_id: &str,
        company_id: &str,
    ) -> Result<ReportResults> {
        let url = self.url(&format!("/reports/{report_id}/results"));
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .query(&[("tenant_id", tenant_id), ("company_id", company_id)])
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .context("report results rejected")?;
        resp.json().await.context("parsing report results")
    }

    async fn fetch_executive_summary(
        &self,
        report_id: &str,
        tenant_id: &str,
        company_id: &str,
        evaluation_id: &str,
    ) -> Result<SummaryStatus> {
        let url = self.url(&format!("/reports/{report_id}/executive-summary"));
        debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("tenant_id", tenant_id),
                ("company_id", company_id),
                ("evaluation_id", evaluation_id),
            ])
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .context("executive summary rejected")?;
        resp.json().await.context("parsing executive summary status")
    }
}

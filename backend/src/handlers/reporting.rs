//! Reporting handlers for stock and sales summaries

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{ReportFormat, DEFAULT_REPORT_AUTHOR};

use crate::error::AppResult;
use crate::services::reporting::{Report, ReportingService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: ReportFormat,
    pub generated_by: Option<String>,
}

impl ReportQuery {
    fn author(&self) -> &str {
        self.generated_by
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_REPORT_AUTHOR)
    }
}

/// Stock summary as JSON or CSV
pub async fn get_stock_summary(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let report = ReportingService::new(state.db)
        .stock_summary(query.author())
        .await?;
    render(report, query.format, "stock_summary.csv")
}

/// Sales summary as JSON or CSV
pub async fn get_sales_summary(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let report = ReportingService::new(state.db)
        .sales_summary(query.author())
        .await?;
    render(report, query.format, "sales_summary.csv")
}

fn render<T: Serialize>(report: Report<T>, format: ReportFormat, filename: &str) -> AppResult<Response> {
    match format {
        ReportFormat::Json => Ok(Json(report).into_response()),
        ReportFormat::Csv => {
            let csv = ReportingService::export_to_csv(&report.rows)?;
            let disposition = format!("attachment; filename=\"{}\"", filename);
            Ok((
                [
                    (header::CONTENT_TYPE, format.content_type().to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
    }
}

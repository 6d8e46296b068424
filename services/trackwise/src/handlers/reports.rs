use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use trackwise_auth_types::principal::Principal;

use crate::domain::report::ExportFormat;
use crate::error::ServiceError;
use crate::handlers::inventory::ProductResponse;
use crate::handlers::non_blank;
use crate::handlers::staff::StaffResponse;
use crate::state::AppState;
use crate::usecase::report::{
    ExportedReport, INVENTORY_REPORT_PREFIX, InventoryReportUseCase, STAFF_REPORT_PREFIX,
    StaffReportUseCase, export_table,
};

#[derive(Deserialize)]
pub struct ReportQuery {
    pub export: Option<String>,
}

impl ReportQuery {
    fn format(self) -> Result<Option<ExportFormat>, ServiceError> {
        non_blank(self.export)
            .map(|f| {
                f.parse::<ExportFormat>()
                    .map_err(|e| ServiceError::field("export", e.to_string()))
            })
            .transpose()
    }
}

fn attachment(report: ExportedReport) -> Response {
    (
        [
            (header::CONTENT_TYPE, report.content_type.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.filename),
            ),
        ],
        report.bytes,
    )
        .into_response()
}

// ── GET /reports/inventory ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct InventoryReportResponse {
    pub company: String,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub total_items: u64,
    pub low_stock_items: u64,
    pub out_of_stock_items: u64,
    pub total_value: Decimal,
    pub products: Vec<ProductResponse>,
}

pub async fn inventory_report(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ServiceError> {
    let format = query.format()?;
    let usecase = InventoryReportUseCase {
        products: state.product_repo(),
        companies: state.company_repo(),
        clock: state.clock(),
    };
    let report = usecase.execute(&principal).await?;

    if let Some(format) = format {
        let table = report.to_table(&state.currency_symbol);
        let exported = export_table(&table, INVENTORY_REPORT_PREFIX, format)?;
        tracing::info!(filename = %exported.filename, "inventory report exported");
        return Ok(attachment(exported));
    }

    Ok(Json(InventoryReportResponse {
        company: report.company.name,
        generated_at: report.generated_at,
        total_items: report.totals.total_products,
        low_stock_items: report.totals.low_stock_count,
        out_of_stock_items: report.totals.out_of_stock_count,
        total_value: report.totals.total_inventory_value,
        products: report.products.into_iter().map(ProductResponse::from).collect(),
    })
    .into_response())
}

// ── GET /reports/staff ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StaffReportResponse {
    pub company: String,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub on_leave: u64,
    pub members: Vec<StaffResponse>,
}

pub async fn staff_report(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ServiceError> {
    let format = query.format()?;
    let usecase = StaffReportUseCase {
        staff: state.staff_repo(),
        companies: state.company_repo(),
        clock: state.clock(),
    };
    let report = usecase.execute(&principal).await?;

    if let Some(format) = format {
        let table = report.to_table(&state.currency_symbol);
        let exported = export_table(&table, STAFF_REPORT_PREFIX, format)?;
        tracing::info!(filename = %exported.filename, "staff report exported");
        return Ok(attachment(exported));
    }

    Ok(Json(StaffReportResponse {
        company: report.company.name,
        generated_at: report.generated_at,
        total: report.counts.total,
        active: report.counts.active,
        inactive: report.counts.inactive,
        on_leave: report.counts.on_leave,
        members: report.members.into_iter().map(StaffResponse::from).collect(),
    })
    .into_response())
}

use chrono::{DateTime, Utc};

use trackwise_auth_types::principal::Principal;
use trackwise_core::clock::Clock;

use crate::domain::access::{owner_tenant, tenant};
use crate::domain::report::{
    Cell, ColumnKind, ExportFormat, ReportColumn, ReportTable, report_filename,
};
use crate::domain::repository::{CompanyRepository, ProductRepository, StaffRepository};
use crate::domain::types::{
    Company, InventoryTotals, Product, StaffCounts, StaffFilter, StaffMember,
};
use crate::error::ServiceError;
use crate::infra::export;

/// Rendered report ready to be served as an attachment.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render `table`; failures become a user-visible `ReportFailed`.
pub fn export_table(
    table: &ReportTable,
    prefix: &str,
    format: ExportFormat,
) -> Result<ExportedReport, ServiceError> {
    let bytes = export::render(table, format)
        .map_err(|e| ServiceError::ReportFailed(e.to_string()))?;
    Ok(ExportedReport {
        filename: report_filename(prefix, &table.company, table.generated_at, format),
        content_type: format.mime_type(),
        bytes,
    })
}

// ── Inventory report ─────────────────────────────────────────────────────────

pub const INVENTORY_REPORT_PREFIX: &str = "inventory_report";

#[derive(Debug, Clone)]
pub struct InventoryReport {
    pub company: Company,
    pub generated_at: DateTime<Utc>,
    pub products: Vec<Product>,
    pub totals: InventoryTotals,
}

impl InventoryReport {
    pub fn to_table(&self, currency: &str) -> ReportTable {
        const COLUMNS: [ReportColumn; 7] = [
            ReportColumn::new("Item Name", ColumnKind::Text),
            ReportColumn::new("Category", ColumnKind::Text),
            ReportColumn::new("Current Stock", ColumnKind::Integer),
            ReportColumn::new("Status", ColumnKind::Text),
            ReportColumn::new("Unit Price", ColumnKind::Money),
            ReportColumn::new("Unit", ColumnKind::Text),
            ReportColumn::new("Total Value", ColumnKind::Money),
        ];
        ReportTable {
            title: "Inventory Report".to_owned(),
            company: self.company.name.clone(),
            generated_at: self.generated_at,
            currency: currency.to_owned(),
            summary: vec![
                (
                    "Total Items".to_owned(),
                    Cell::Integer(self.totals.total_products as i64),
                ),
                (
                    "Low Stock Items".to_owned(),
                    Cell::Integer(self.totals.low_stock_count as i64),
                ),
                (
                    "Out of Stock Items".to_owned(),
                    Cell::Integer(self.totals.out_of_stock_count as i64),
                ),
                (
                    "Total Inventory Value".to_owned(),
                    Cell::Money(self.totals.total_inventory_value),
                ),
            ],
            columns: COLUMNS.to_vec(),
            rows: self
                .products
                .iter()
                .map(|p| {
                    vec![
                        Cell::from(p.item_name.as_str()),
                        Cell::from(p.category.label()),
                        Cell::Integer(i64::from(p.quantity)),
                        Cell::from(p.stock_status().label()),
                        Cell::Money(p.cost_price),
                        Cell::from(p.unit.label()),
                        Cell::Money(p.total_value()),
                    ]
                })
                .collect(),
        }
    }
}

pub struct InventoryReportUseCase<P: ProductRepository, Co: CompanyRepository, C: Clock> {
    pub products: P,
    pub companies: Co,
    pub clock: C,
}

impl<P: ProductRepository, Co: CompanyRepository, C: Clock> InventoryReportUseCase<P, Co, C> {
    pub async fn execute(&self, actor: &Principal) -> Result<InventoryReport, ServiceError> {
        let company_id = tenant(actor)?;
        let company = self
            .companies
            .find(company_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let products = self.products.all(company_id).await?;
        let totals = InventoryTotals::from_products(&products);
        Ok(InventoryReport {
            company,
            generated_at: self.clock.now(),
            products,
            totals,
        })
    }
}

// ── Staff report ─────────────────────────────────────────────────────────────

pub const STAFF_REPORT_PREFIX: &str = "staff_report";

#[derive(Debug, Clone)]
pub struct StaffReport {
    pub company: Company,
    pub generated_at: DateTime<Utc>,
    pub members: Vec<StaffMember>,
    pub counts: StaffCounts,
}

impl StaffReport {
    pub fn to_table(&self, currency: &str) -> ReportTable {
        const COLUMNS: [ReportColumn; 8] = [
            ReportColumn::new("Name", ColumnKind::Text),
            ReportColumn::new("Employee ID", ColumnKind::Text),
            ReportColumn::new("Position", ColumnKind::Text),
            ReportColumn::new("Department", ColumnKind::Text),
            ReportColumn::new("Status", ColumnKind::Text),
            ReportColumn::new("Hire Date", ColumnKind::Date),
            ReportColumn::new("Tenure (days)", ColumnKind::Integer),
            ReportColumn::new("Email", ColumnKind::Text),
        ];
        let today = self.generated_at.date_naive();
        ReportTable {
            title: "Staff Report".to_owned(),
            company: self.company.name.clone(),
            generated_at: self.generated_at,
            currency: currency.to_owned(),
            summary: vec![
                ("Total Staff".to_owned(), Cell::Integer(self.counts.total as i64)),
                ("Active".to_owned(), Cell::Integer(self.counts.active as i64)),
                ("Inactive".to_owned(), Cell::Integer(self.counts.inactive as i64)),
                ("On Leave".to_owned(), Cell::Integer(self.counts.on_leave as i64)),
            ],
            columns: COLUMNS.to_vec(),
            rows: self
                .members
                .iter()
                .map(|m| {
                    vec![
                        Cell::Text(m.full_name()),
                        Cell::from(m.details.employee_id.as_str()),
                        Cell::from(m.details.position.as_str()),
                        Cell::from(m.details.department.as_str()),
                        Cell::from(m.details.status.label()),
                        Cell::Date(m.details.hire_date),
                        Cell::Integer((today - m.details.hire_date).num_days()),
                        Cell::from(m.email.as_str()),
                    ]
                })
                .collect(),
        }
    }
}

pub struct StaffReportUseCase<S: StaffRepository, Co: CompanyRepository, C: Clock> {
    pub staff: S,
    pub companies: Co,
    pub clock: C,
}

impl<S: StaffRepository, Co: CompanyRepository, C: Clock> StaffReportUseCase<S, Co, C> {
    pub async fn execute(&self, actor: &Principal) -> Result<StaffReport, ServiceError> {
        let company_id = owner_tenant(actor)?;
        let company = self
            .companies
            .find(company_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let mut members = self.staff.list(company_id, &StaffFilter::default()).await?;
        members.sort_by(|a, b| a.full_name().cmp(&b.full_name()));
        let counts = StaffCounts::tally(members.iter().map(|m| m.details.status));
        Ok(StaffReport {
            company,
            generated_at: self.clock.now(),
            members,
            counts,
        })
    }
}

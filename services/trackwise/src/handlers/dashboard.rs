use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;

use trackwise_auth_types::principal::Principal;

use crate::domain::types::Product;
use crate::error::ServiceError;
use crate::handlers::inventory::ProductResponse;
use crate::state::AppState;
use crate::usecase::dashboard::DashboardUseCase;

fn products(items: Vec<Product>) -> Vec<ProductResponse> {
    items.into_iter().map(ProductResponse::from).collect()
}

// ── GET /dashboard ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DashboardResponse {
    pub total_products: u64,
    pub low_stock: u64,
    pub out_of_stock: u64,
    pub recent_products: Vec<ProductResponse>,
    pub recent_activity: Vec<ProductResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_staff: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_inventory_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_updates: Option<Vec<ProductResponse>>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<DashboardResponse>, ServiceError> {
    let usecase = DashboardUseCase {
        products: state.product_repo(),
        companies: state.company_repo(),
        clock: state.clock(),
    };
    let d = usecase.execute(&principal).await?;
    Ok(Json(DashboardResponse {
        total_products: d.total_products,
        low_stock: d.low_stock,
        out_of_stock: d.out_of_stock,
        recent_products: products(d.recent_products),
        recent_activity: products(d.recent_activity),
        total_staff: d.owner.as_ref().map(|o| o.total_staff),
        total_inventory_value: d.owner.map(|o| o.total_inventory_value),
        recent_updates: d.recent_updates.map(products),
    }))
}

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trackwise_auth_types::principal::Principal;
use trackwise_domain::pagination::{Page, PageRequest, Sort};
use trackwise_domain::product::{Category, StockStatus, Unit};

use crate::domain::types::{InventoryFilter, InventoryTotals, Product};
use crate::error::ServiceError;
use crate::handlers::{non_blank, parse_choice, parse_query};
use crate::state::AppState;
use crate::usecase::inventory::{
    AdjustStockUseCase, CreateProductUseCase, DeleteProductUseCase, GetProductUseCase,
    ListInventoryUseCase, ProductInput, StockAdjustment, UpdateProductUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub item_name: String,
    pub image_key: Option<String>,
    pub category: Category,
    pub category_label: &'static str,
    pub quantity: i32,
    pub unit_of_measure: Unit,
    pub cost_price: Decimal,
    pub total_value: Decimal,
    pub stock_status: StockStatus,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            total_value: p.total_value(),
            stock_status: p.stock_status(),
            category_label: p.category.label(),
            id: p.id,
            item_name: p.item_name,
            image_key: p.image_key,
            category: p.category,
            quantity: p.quantity,
            unit_of_measure: p.unit,
            cost_price: p.cost_price,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct TotalsResponse {
    pub total_products: u64,
    pub total_inventory_value: Decimal,
    pub low_stock_count: u64,
    pub out_of_stock_count: u64,
}

impl From<InventoryTotals> for TotalsResponse {
    fn from(t: InventoryTotals) -> Self {
        Self {
            total_products: t.total_products,
            total_inventory_value: t.total_inventory_value,
            low_stock_count: t.low_stock_count,
            out_of_stock_count: t.out_of_stock_count,
        }
    }
}

// ── GET /inventory ───────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct InventoryQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    /// `low` (cheapest first) or `high`.
    pub cost: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize)]
pub struct InventoryListResponse {
    #[serde(flatten)]
    pub page: Page<ProductResponse>,
    #[serde(flatten)]
    pub totals: TotalsResponse,
}

pub async fn list_inventory(
    State(state): State<AppState>,
    principal: Principal,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<InventoryListResponse>, ServiceError> {
    let query: InventoryQuery = parse_query(raw_query)?;
    let cost_order = match non_blank(query.cost).as_deref() {
        Some("low") => Some(Sort::Asc),
        Some("high") => Some(Sort::Desc),
        _ => None,
    };
    let filter = InventoryFilter {
        search: non_blank(query.search),
        category: parse_choice(query.category, "category")?,
        cost_order,
        page: PageRequest::new(query.page, query.per_page),
    };

    let usecase = ListInventoryUseCase {
        products: state.product_repo(),
    };
    let listing = usecase.execute(&principal, filter).await?;
    Ok(Json(InventoryListResponse {
        page: listing.page.map(ProductResponse::from),
        totals: listing.totals.into(),
    }))
}

// ── POST /inventory ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub item_name: String,
    pub image_key: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_of_measure: String,
    #[serde(default)]
    pub cost_price: Decimal,
}

impl From<ProductRequest> for ProductInput {
    fn from(r: ProductRequest) -> Self {
        Self {
            item_name: r.item_name,
            image_key: r.image_key,
            category: r.category,
            quantity: r.quantity,
            unit_of_measure: r.unit_of_measure,
            cost_price: r.cost_price,
        }
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ServiceError> {
    let usecase = CreateProductUseCase {
        products: state.product_repo(),
        clock: state.clock(),
    };
    let product = usecase.execute(&principal, body.into()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

// ── GET /inventory/{id} ──────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, ServiceError> {
    let usecase = GetProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase.execute(&principal, id).await?;
    Ok(Json(product.into()))
}

// ── PUT /inventory/{id} ──────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ServiceError> {
    let usecase = UpdateProductUseCase {
        products: state.product_repo(),
        clock: state.clock(),
    };
    let product = usecase.execute(&principal, id, body.into()).await?;
    Ok(Json(product.into()))
}

// ── DELETE /inventory/{id} ───────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    let usecase = DeleteProductUseCase {
        products: state.product_repo(),
    };
    usecase.execute(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /inventory/{id}/increase, POST /inventory/{id}/decrease ─────────────

#[derive(Serialize)]
pub struct StockResponse {
    pub success: bool,
    pub new_quantity: i32,
    pub total_value: Decimal,
    #[serde(flatten)]
    pub totals: TotalsResponse,
}

async fn adjust(
    state: AppState,
    principal: Principal,
    id: Uuid,
    adjustment: StockAdjustment,
) -> Result<Json<StockResponse>, ServiceError> {
    let usecase = AdjustStockUseCase {
        products: state.product_repo(),
        clock: state.clock(),
    };
    let change = usecase.execute(&principal, id, adjustment).await?;
    Ok(Json(StockResponse {
        success: true,
        new_quantity: change.product.quantity,
        total_value: change.product.total_value(),
        totals: change.totals.into(),
    }))
}

pub async fn increase_stock(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<StockResponse>, ServiceError> {
    adjust(state, principal, id, StockAdjustment::Increase).await
}

pub async fn decrease_stock(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<StockResponse>, ServiceError> {
    adjust(state, principal, id, StockAdjustment::Decrease).await
}

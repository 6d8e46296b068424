use rust_decimal::Decimal;
use uuid::Uuid;

use trackwise_auth_types::principal::Principal;
use trackwise_core::clock::Clock;
use trackwise_core::error::FieldErrors;
use trackwise_domain::money::round_cents;
use trackwise_domain::pagination::Page;
use trackwise_domain::product::{Category, Unit};

use crate::domain::access::{owner_tenant, tenant};
use crate::domain::repository::ProductRepository;
use crate::domain::types::{
    ITEM_NAME_MAX_LEN, InventoryFilter, InventoryTotals, Product, ProductDraft,
};
use crate::error::ServiceError;

/// Largest value a `NUMERIC(10, 2)` column holds.
fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Unvalidated product fields as submitted.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub item_name: String,
    pub image_key: Option<String>,
    pub category: String,
    pub quantity: i64,
    pub unit_of_measure: String,
    pub cost_price: Decimal,
}

impl ProductInput {
    pub fn validate(self) -> Result<ProductDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let item_name = self.item_name.trim().to_owned();
        if item_name.is_empty() {
            errors.add("item_name", "This field is required.");
        } else if item_name.chars().count() > ITEM_NAME_MAX_LEN {
            errors.add("item_name", "Ensure this value has at most 200 characters.");
        }

        let category = self.category.parse::<Category>().ok();
        if category.is_none() {
            errors.add("category", "Select a valid choice.");
        }
        let unit = self.unit_of_measure.parse::<Unit>().ok();
        if unit.is_none() {
            errors.add("unit_of_measure", "Select a valid choice.");
        }

        let quantity = i32::try_from(self.quantity).ok().filter(|q| *q >= 0);
        if quantity.is_none() {
            errors.add("quantity", "Quantity must be zero or greater.");
        }

        if self.cost_price.is_sign_negative() && !self.cost_price.is_zero() {
            errors.add("cost_price", "Cost price must be zero or greater.");
        } else if self.cost_price.normalize().scale() > 2 {
            errors.add("cost_price", "Ensure that there are no more than 2 decimal places.");
        } else if self.cost_price > max_price() {
            errors.add("cost_price", "Ensure that there are no more than 10 digits in total.");
        }

        match (category, unit, quantity) {
            (Some(category), Some(unit), Some(quantity)) if errors.is_empty() => Ok(ProductDraft {
                item_name,
                image_key: self.image_key.filter(|k| !k.trim().is_empty()),
                category,
                quantity,
                unit,
                cost_price: round_cents(self.cost_price),
            }),
            _ => Err(errors),
        }
    }
}

// ── ListInventory ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct InventoryListing {
    pub page: Page<Product>,
    pub totals: InventoryTotals,
}

pub struct ListInventoryUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> ListInventoryUseCase<P> {
    pub async fn execute(
        &self,
        actor: &Principal,
        filter: InventoryFilter,
    ) -> Result<InventoryListing, ServiceError> {
        let company_id = tenant(actor)?;
        let page = self.products.list(company_id, &filter).await?;
        let totals = self.products.totals(company_id, &filter).await?;
        Ok(InventoryListing { page, totals })
    }
}

// ── GetProduct ───────────────────────────────────────────────────────────────

pub struct GetProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> GetProductUseCase<P> {
    pub async fn execute(&self, actor: &Principal, id: Uuid) -> Result<Product, ServiceError> {
        let company_id = tenant(actor)?;
        self.products
            .find(company_id, id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

// ── CreateProduct ────────────────────────────────────────────────────────────

pub struct CreateProductUseCase<P: ProductRepository, C: Clock> {
    pub products: P,
    pub clock: C,
}

impl<P: ProductRepository, C: Clock> CreateProductUseCase<P, C> {
    pub async fn execute(
        &self,
        actor: &Principal,
        input: ProductInput,
    ) -> Result<Product, ServiceError> {
        let company_id = tenant(actor)?;
        let draft = input.validate()?;
        let now = self.clock.now();
        let product = Product {
            id: Uuid::now_v7(),
            company_id,
            item_name: draft.item_name,
            image_key: draft.image_key,
            category: draft.category,
            quantity: draft.quantity,
            unit: draft.unit,
            cost_price: draft.cost_price,
            created_at: now,
            updated_at: now,
        };
        self.products.create(&product).await?;
        tracing::info!(product_id = %product.id, company_id = %company_id, "product created");
        Ok(product)
    }
}

// ── UpdateProduct ────────────────────────────────────────────────────────────

pub struct UpdateProductUseCase<P: ProductRepository, C: Clock> {
    pub products: P,
    pub clock: C,
}

impl<P: ProductRepository, C: Clock> UpdateProductUseCase<P, C> {
    pub async fn execute(
        &self,
        actor: &Principal,
        id: Uuid,
        input: ProductInput,
    ) -> Result<Product, ServiceError> {
        let company_id = owner_tenant(actor)?;
        let draft = input.validate()?;
        self.products
            .update(company_id, id, &draft, self.clock.now())
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

// ── DeleteProduct ────────────────────────────────────────────────────────────

pub struct DeleteProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> DeleteProductUseCase<P> {
    pub async fn execute(&self, actor: &Principal, id: Uuid) -> Result<(), ServiceError> {
        let company_id = owner_tenant(actor)?;
        if !self.products.delete(company_id, id).await? {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(product_id = %id, company_id = %company_id, "product deleted");
        Ok(())
    }
}

// ── AdjustStock ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    Increase,
    Decrease,
}

impl StockAdjustment {
    fn delta(self) -> i32 {
        match self {
            Self::Increase => 1,
            Self::Decrease => -1,
        }
    }
}

/// Product after a stock change together with fresh company totals.
#[derive(Debug, Clone)]
pub struct StockChange {
    pub product: Product,
    pub totals: InventoryTotals,
}

pub struct AdjustStockUseCase<P: ProductRepository, C: Clock> {
    pub products: P,
    pub clock: C,
}

impl<P: ProductRepository, C: Clock> AdjustStockUseCase<P, C> {
    /// Decreasing a product already at zero leaves it unchanged.
    pub async fn execute(
        &self,
        actor: &Principal,
        id: Uuid,
        adjustment: StockAdjustment,
    ) -> Result<StockChange, ServiceError> {
        let company_id = tenant(actor)?;
        let product = self
            .products
            .adjust_quantity(company_id, id, adjustment.delta(), self.clock.now())
            .await?
            .ok_or(ServiceError::NotFound)?;
        let totals = self
            .products
            .totals(company_id, &InventoryFilter::default())
            .await?;
        Ok(StockChange { product, totals })
    }
}
